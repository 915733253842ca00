//! Cached construction of [`CollectionTypeDescription`] values.
//!
//! The cache is injected rather than global so that independent callers (and
//! tests) can hold isolated instances. [`SharedDescriptionCache`] supports
//! concurrent readers and concurrent insertion of the same key; the first
//! stored description wins and later inserts are no-ops.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::Result;
use crate::types::{BuiltinTypeRegistry, CollectionTypeDescription, TypeRegistry};

/// Lookup/insert service for parsed descriptions, keyed by type string.
pub trait DescriptionCache: Send + Sync {
    /// Returns the cached description for `collection_type`, if any.
    fn get(&self, collection_type: &str) -> Option<CollectionTypeDescription>;

    /// Stores `description` under its canonical string unless already present.
    fn insert(&self, description: CollectionTypeDescription);

    /// Number of cached descriptions.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe [`DescriptionCache`] backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct SharedDescriptionCache {
    entries: DashMap<String, CollectionTypeDescription>,
}

impl SharedDescriptionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DescriptionCache for SharedDescriptionCache {
    fn get(&self, collection_type: &str) -> Option<CollectionTypeDescription> {
        self.entries.get(collection_type).map(|entry| entry.value().clone())
    }

    fn insert(&self, description: CollectionTypeDescription) {
        self.entries
            .entry(description.collection_type().to_string())
            .or_insert(description);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Creates descriptions for type strings, validating tokens against a
/// [`TypeRegistry`] and memoizing results in a [`DescriptionCache`].
///
/// # Examples
///
/// ```
/// use collection_match_core::{CollectionTypeDescriptionFactory, DescriptionCache};
///
/// let factory = CollectionTypeDescriptionFactory::default();
/// let first = factory.for_collection_type("list:paired").unwrap();
/// let second = factory.for_collection_type("list:paired").unwrap();
/// assert_eq!(first, second);
/// assert_eq!(factory.cache().len(), 1);
///
/// assert!(factory.for_collection_type("list:tuple").is_err());
/// assert_eq!(factory.cache().len(), 1);
/// ```
#[derive(Clone)]
pub struct CollectionTypeDescriptionFactory {
    registry: Arc<dyn TypeRegistry>,
    cache: Arc<dyn DescriptionCache>,
}

impl CollectionTypeDescriptionFactory {
    /// Creates a factory over an explicit registry and cache.
    pub fn new(registry: Arc<dyn TypeRegistry>, cache: Arc<dyn DescriptionCache>) -> Self {
        Self { registry, cache }
    }

    /// Creates a factory over `registry` with a fresh [`SharedDescriptionCache`].
    pub fn with_registry(registry: impl TypeRegistry + 'static) -> Self {
        Self::new(Arc::new(registry), Arc::new(SharedDescriptionCache::new()))
    }

    /// Returns the description for `collection_type`, parsing it on a cache
    /// miss.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidTypeSyntax`](crate::MatchError::InvalidTypeSyntax)
    /// if the string does not parse. Failed parses are not cached.
    pub fn for_collection_type(&self, collection_type: &str) -> Result<CollectionTypeDescription> {
        if let Some(description) = self.cache.get(collection_type) {
            return Ok(description);
        }

        debug!(collection_type, "collection type description cache miss");
        let description = CollectionTypeDescription::parse(collection_type, self.registry.as_ref())?;
        self.cache.insert(description.clone());
        Ok(description)
    }

    /// Registry used to validate tokens.
    pub fn registry(&self) -> &dyn TypeRegistry {
        self.registry.as_ref()
    }

    /// Cache backing this factory.
    pub fn cache(&self) -> &dyn DescriptionCache {
        self.cache.as_ref()
    }
}

impl Default for CollectionTypeDescriptionFactory {
    fn default() -> Self {
        Self::with_registry(BuiltinTypeRegistry)
    }
}

impl std::fmt::Debug for CollectionTypeDescriptionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionTypeDescriptionFactory")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
