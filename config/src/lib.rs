//! Configuration and collection loading for collection matching.
//!
//! This crate wires the matching engine in `collection-match-core` to files:
//!
//! - [`MatchConfig`] — YAML configuration selecting registered collection
//!   types and the identifier policy used when comparing structures.
//! - [`ConfiguredTypeRegistry`] — a [`TypeRegistry`](collection_match_core::TypeRegistry)
//!   built from that configuration.
//! - [`CollectionStore`] — named collections loaded from a directory of JSON
//!   files or a single [`CollectionBundle`], with a fallback builder and
//!   [`InputBinding`]s that turn stored collections into a
//!   [`CollectionsToMatch`](collection_match_core::CollectionsToMatch).
//!
//! # Quick start
//!
//! ```no_run
//! use collection_match_config::{CollectionStore, InputBinding, MatchConfig};
//! use collection_match_core::MatchingCollections;
//!
//! let config = MatchConfig::load("matching.yml").unwrap();
//! let factory = config.type_factory();
//! let store = CollectionStore::from_bundle("collections.json").unwrap();
//!
//! let to_match = store
//!     .to_match(
//!         &[
//!             InputBinding::new("reads", "samples").over("paired"),
//!             InputBinding::new("reference", "references"),
//!         ],
//!         &factory,
//!     )
//!     .unwrap();
//! let matched =
//!     MatchingCollections::for_collections_with(&to_match, &factory, &config.match_options())
//!         .unwrap();
//! println!("{} jobs", matched.slices().unwrap().len());
//! ```

mod config;
mod error;
mod loader;
mod registry;

pub use config::{MatchConfig, MatchingConfig, RegistryConfig};
pub use error::{ConfigError, Result};
pub use loader::{CollectionBundle, CollectionStore, CollectionStoreBuilder, InputBinding, StoreSource};
pub use registry::ConfiguredTypeRegistry;
