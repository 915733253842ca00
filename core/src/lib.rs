//! Collection type algebra, structure extraction and map-over matching.
//!
//! Tools are often run over nested collections of datasets (`list`,
//! `paired`, `list:paired`, ...). When a step consumes several collections at
//! once, this crate decides whether they can be iterated element by element
//! in lock-step and computes the shared iteration shape:
//!
//! - [`CollectionTypeDescription`] — a parsed colon-joined collection type
//!   with suffix, projection and product operations, created through a
//!   caching [`CollectionTypeDescriptionFactory`] over a [`TypeRegistry`].
//! - [`get_structure`] — turns a [`DatasetCollection`] into a [`Structure`]
//!   tree of identified nodes and leaves, optionally truncated at a
//!   subcollection type.
//! - [`MatchingCollections::for_collections`] — matches the entries of a
//!   [`CollectionsToMatch`] and returns the unified structure plus an index
//!   binding every leaf back to each input, or a [`MatchError`].
//!
//! Nothing here performs I/O or mutates collections.
//!
//! # Example
//!
//! ```
//! use collection_match_core::*;
//!
//! let factory = CollectionTypeDescriptionFactory::default();
//! let list = |ids: &[&str]| {
//!     ids.iter().fold(DatasetCollection::new("list"), |c, id| {
//!         c.with_dataset(id, DatasetRef::new(*id))
//!     })
//! };
//! let two = list(&["data1", "data2"]);
//! let three = list(&["data1", "data2", "data3"]);
//!
//! let mut to_match = CollectionsToMatch::new();
//! to_match.add("input1", &two, None).add("input2", &two, None);
//! assert!(MatchingCollections::for_collections(&to_match, &factory).is_ok());
//!
//! to_match.add("input2", &three, None);
//! let err = MatchingCollections::for_collections(&to_match, &factory).unwrap_err();
//! assert!(matches!(err, MatchError::CollectionStructureMismatch { .. }));
//! ```

mod error;
mod factory;
mod matching;
mod model;
mod structure;
mod types;

pub use error::{ElementPath, MatchError, PathSegment, Result, StructureMismatch};
pub use factory::{CollectionTypeDescriptionFactory, DescriptionCache, SharedDescriptionCache};
pub use matching::{
    CollectionToMatch, CollectionsToMatch, ElementSlice, MatchOptions, MatchedCollection,
    MatchingCollections,
};
pub use model::{CollectionElement, DatasetCollection, DatasetRef, ElementObject};
pub use structure::{IdentifierPolicy, Structure, Tree, get_structure};
pub use types::{
    BUILTIN_COLLECTION_TYPES, BuiltinTypeRegistry, CollectionTypeDescription, TYPE_SEPARATOR,
    TypeRegistry,
};
