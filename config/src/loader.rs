//! Collection loading with builder pattern and fallback chains.
//!
//! Provides [`CollectionStore`] for named in-memory collections and
//! [`CollectionStoreBuilder`] for loading one from several sources with
//! automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use collection_match_config::CollectionStore;
//!
//! // One `<name>.json` file per collection
//! let store = CollectionStore::from_dir("fixtures/collections/").unwrap();
//!
//! // A single CollectionBundle JSON file
//! let store = CollectionStore::from_bundle("fixtures/bundle.json").unwrap();
//!
//! // First source that loads wins
//! let store = CollectionStore::builder()
//!     .from_dir("fixtures/collections/")
//!     .from_bundle("fixtures/bundle.json")
//!     .build()
//!     .unwrap();
//! ```

use std::path::{Path, PathBuf};

use collection_match_core::{CollectionTypeDescriptionFactory, CollectionsToMatch, DatasetCollection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Serializable set of named collections.
///
/// # Examples
///
/// ```
/// use collection_match_config::CollectionBundle;
///
/// let bundle: CollectionBundle = serde_json::from_str(r#"{
///     "version": "1.0",
///     "collections": {
///         "reads": {
///             "collection_type": "list",
///             "elements": [
///                 {"element_identifier": "a", "object": {"kind": "dataset", "id": "1"}}
///             ]
///         }
///     }
/// }"#).unwrap();
///
/// assert_eq!(bundle.collections["reads"].len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionBundle {
    /// Bundle format version.
    pub version: String,
    /// Collections keyed by name, in file order.
    #[serde(default)]
    pub collections: IndexMap<String, DatasetCollection>,
}

impl CollectionBundle {
    /// Creates an empty bundle with the given format version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            collections: IndexMap::new(),
        }
    }
}

/// Describes where a [`CollectionStore`] was loaded from.
#[derive(Debug, Clone)]
pub enum StoreSource {
    /// Built in memory.
    Memory,
    /// A directory of `<name>.json` collection files.
    Directory(PathBuf),
    /// A single [`CollectionBundle`] JSON file.
    Bundle(PathBuf),
    /// A fallback chain of sources.
    Multiple(Vec<StoreSource>),
}

/// How one tool input is bound to a stored collection.
///
/// # Examples
///
/// ```
/// use collection_match_config::InputBinding;
///
/// let binding = InputBinding::new("reads", "samples").over("paired");
/// assert_eq!(binding.subcollection_type.as_deref(), Some("paired"));
/// assert!(binding.linked);
/// assert!(!InputBinding::new("adapters", "adapters").unlinked().linked);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBinding {
    /// Tool input name.
    pub input: String,
    /// Name of the stored collection.
    pub collection: String,
    /// Subcollection type to map over, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcollection_type: Option<String>,
    #[serde(default = "default_linked")]
    pub linked: bool,
}

fn default_linked() -> bool {
    true
}

impl InputBinding {
    /// Binds `input` to the stored collection `collection`, linked and at full depth.
    pub fn new(input: &str, collection: &str) -> Self {
        Self {
            input: input.to_string(),
            collection: collection.to_string(),
            subcollection_type: None,
            linked: true,
        }
    }

    /// Maps over subcollections of `subcollection_type`.
    pub fn over(mut self, subcollection_type: &str) -> Self {
        self.subcollection_type = Some(subcollection_type.to_string());
        self
    }

    /// Crosses this input with the others instead of matching it.
    pub fn unlinked(mut self) -> Self {
        self.linked = false;
        self
    }
}

/// Named collections with lookup by name.
#[derive(Debug)]
pub struct CollectionStore {
    collections: IndexMap<String, DatasetCollection>,
    source: StoreSource,
}

impl CollectionStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self {
            collections: IndexMap::new(),
            source: StoreSource::Memory,
        }
    }

    /// Returns a new [`CollectionStoreBuilder`] for configuring a fallback
    /// chain.
    pub fn builder() -> CollectionStoreBuilder {
        CollectionStoreBuilder::new()
    }

    /// Loads every `*.json` file in `path` as a [`DatasetCollection`] named
    /// after the file stem. Files are read in name order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the directory or a file cannot be
    /// read, or [`ConfigError::JsonError`] if a file is not a valid
    /// collection.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(file_path);
            }
        }
        files.sort();

        let mut collections = IndexMap::new();
        for file_path in files {
            let Some(name) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let file = std::fs::File::open(&file_path)?;
            let reader = std::io::BufReader::new(file);
            let collection: DatasetCollection = serde_json::from_reader(reader)?;
            collections.insert(name.to_string(), collection);
        }

        debug!(path = %path.display(), collections = collections.len(), "loaded collection directory");
        Ok(Self {
            collections,
            source: StoreSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads a single [`CollectionBundle`] JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::JsonError`] if parsing fails.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let bundle: CollectionBundle = serde_json::from_reader(reader)?;

        debug!(
            path = %path.display(),
            version = %bundle.version,
            collections = bundle.collections.len(),
            "loaded collection bundle"
        );
        Ok(Self {
            collections: bundle.collections,
            source: StoreSource::Bundle(path.to_path_buf()),
        })
    }

    /// Returns the collection named `name`.
    pub fn get(&self, name: &str) -> Option<&DatasetCollection> {
        self.collections.get(name)
    }

    /// Inserts a collection, replacing any existing entry of the same name.
    pub fn insert(&mut self, name: impl Into<String>, collection: DatasetCollection) {
        self.collections.insert(name.into(), collection);
    }

    /// Returns `true` if a collection named `name` is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Returns the number of collections in the store.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Returns `true` if the store holds no collections.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Collection names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|s| s.as_str())
    }

    /// Where the collections were loaded from.
    pub fn source(&self) -> &StoreSource {
        &self.source
    }

    /// Builds a [`CollectionsToMatch`] from stored collections, in binding
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCollection`] if a binding names a
    /// missing collection, or [`ConfigError::Match`] if a subcollection type
    /// does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use collection_match_config::{CollectionStore, InputBinding};
    /// use collection_match_core::*;
    ///
    /// let mut store = CollectionStore::new();
    /// store.insert("left", DatasetCollection::new("list").with_dataset("a", DatasetRef::new("1")));
    /// store.insert("right", DatasetCollection::new("list").with_dataset("b", DatasetRef::new("2")));
    ///
    /// let factory = CollectionTypeDescriptionFactory::default();
    /// let to_match = store
    ///     .to_match(&[InputBinding::new("input1", "left"), InputBinding::new("input2", "right")], &factory)
    ///     .unwrap();
    ///
    /// let matched = MatchingCollections::for_collections(&to_match, &factory).unwrap();
    /// assert_eq!(matched.slices().unwrap().len(), 1);
    /// ```
    pub fn to_match(
        &self,
        bindings: &[InputBinding],
        type_factory: &CollectionTypeDescriptionFactory,
    ) -> Result<CollectionsToMatch<'_>> {
        let mut to_match = CollectionsToMatch::new();
        for binding in bindings {
            let collection = self
                .get(&binding.collection)
                .ok_or_else(|| ConfigError::UnknownCollection(binding.collection.clone()))?;
            let subcollection_type = binding
                .subcollection_type
                .as_deref()
                .map(|s| type_factory.for_collection_type(s))
                .transpose()?;
            if binding.linked {
                to_match.add(binding.input.as_str(), collection, subcollection_type);
            } else {
                to_match.add_unlinked(binding.input.as_str(), collection, subcollection_type);
            }
        }
        Ok(to_match)
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a [`CollectionStore`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`ConfigError::NoSourcesAvailable`] is returned.
pub struct CollectionStoreBuilder {
    sources: Vec<StoreSource>,
}

impl CollectionStoreBuilder {
    /// Creates a builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a directory of collection JSON files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(StoreSource::Directory(path.into()));
        self
    }

    /// Adds a [`CollectionBundle`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(StoreSource::Bundle(path.into()));
        self
    }

    /// Attempts to load collections from configured sources in order.
    pub fn build(self) -> Result<CollectionStore> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                StoreSource::Directory(path) => CollectionStore::from_dir(path),
                StoreSource::Bundle(path) => CollectionStore::from_bundle(path),
                StoreSource::Memory | StoreSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut store) => {
                    store.source = StoreSource::Multiple(all_sources);
                    return Ok(store);
                }
                Err(err) => debug!(?source, error = %err, "collection source failed, trying next"),
            }
        }

        Err(ConfigError::NoSourcesAvailable)
    }
}

impl Default for CollectionStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
