//! Matching several named collections into one shared iteration shape.
//!
//! A tool step that consumes several collections can only be mapped over them
//! element by element if they agree on effective type and shape.
//! [`MatchingCollections::for_collections`] performs that check and, on
//! success, returns the unified [`Structure`] together with an index that
//! resolves each leaf path back to the bound element of every input.
//!
//! # Example
//!
//! ```
//! use collection_match_core::*;
//!
//! let factory = CollectionTypeDescriptionFactory::default();
//! let pair = || {
//!     DatasetCollection::new("paired")
//!         .with_dataset("forward", DatasetRef::new("f"))
//!         .with_dataset("reverse", DatasetRef::new("r"))
//! };
//! let reads = DatasetCollection::new("list:paired")
//!     .with_collection("sample1", pair())
//!     .with_collection("sample2", pair());
//! let references = DatasetCollection::new("list")
//!     .with_dataset("ref1", DatasetRef::new("a"))
//!     .with_dataset("ref2", DatasetRef::new("b"));
//!
//! let mut to_match = CollectionsToMatch::new();
//! to_match.add("reads", &reads, Some(factory.for_collection_type("paired").unwrap()));
//! to_match.add("reference", &references, None);
//!
//! let matched = MatchingCollections::for_collections(&to_match, &factory).unwrap();
//! assert_eq!(matched.collection_type().collection_type(), "list");
//!
//! let slices = matched.slices().unwrap();
//! assert_eq!(slices.len(), 2);
//! // the "reads" input is bound to a whole pair per job
//! assert!(slices[0].bindings["reads"].as_collection().is_some());
//! assert_eq!(slices[1].bindings["reference"].as_dataset().unwrap().id, "b");
//! ```

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{ElementPath, MatchError, Result};
use crate::factory::CollectionTypeDescriptionFactory;
use crate::model::{DatasetCollection, ElementObject};
use crate::structure::{IdentifierPolicy, Structure, get_structure};
use crate::types::CollectionTypeDescription;

/// Options controlling how strictly structures are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Whether element identifiers must agree, or only cardinalities.
    pub identifier_policy: IdentifierPolicy,
}

impl MatchOptions {
    /// Sets how identifiers are compared between structures.
    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }
}

/// One named input to be matched.
#[derive(Debug, Clone)]
pub struct CollectionToMatch<'a> {
    /// Tool input parameter name.
    pub name: String,
    /// The concrete collection bound to the input.
    pub instance: &'a DatasetCollection,
    /// Suffix of the declared type to treat as an opaque unit.
    pub subcollection_type: Option<CollectionTypeDescription>,
    /// Linked inputs iterate in lock-step; unlinked inputs are crossed with
    /// the linked shape.
    pub linked: bool,
}

/// Ordered set of named inputs, keyed by name.
///
/// # Examples
///
/// ```
/// use collection_match_core::*;
///
/// let list = DatasetCollection::new("list").with_dataset("a", DatasetRef::new("1"));
/// let mut to_match = CollectionsToMatch::new();
/// to_match.add("input1", &list, None).add("input2", &list, None);
/// to_match.add("input1", &list, None);
///
/// assert_eq!(to_match.len(), 2);
/// assert_eq!(to_match.names().collect::<Vec<_>>(), vec!["input1", "input2"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectionsToMatch<'a> {
    entries: IndexMap<String, CollectionToMatch<'a>>,
}

impl<'a> CollectionsToMatch<'a> {
    /// Creates an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a linked input. Re-adding a name replaces the earlier entry in
    /// place.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        instance: &'a DatasetCollection,
        subcollection_type: Option<CollectionTypeDescription>,
    ) -> &mut Self {
        self.insert(name.into(), instance, subcollection_type, true)
    }

    /// Adds an input whose shape is multiplied into the result instead of
    /// being matched against the other inputs.
    pub fn add_unlinked(
        &mut self,
        name: impl Into<String>,
        instance: &'a DatasetCollection,
        subcollection_type: Option<CollectionTypeDescription>,
    ) -> &mut Self {
        self.insert(name.into(), instance, subcollection_type, false)
    }

    fn insert(
        &mut self,
        name: String,
        instance: &'a DatasetCollection,
        subcollection_type: Option<CollectionTypeDescription>,
        linked: bool,
    ) -> &mut Self {
        self.entries.insert(
            name.clone(),
            CollectionToMatch {
                name,
                instance,
                subcollection_type,
                linked,
            },
        );
        self
    }

    /// Returns `true` if at least one input was added.
    pub fn has_collections(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no input was added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the input registered under `name`.
    pub fn get(&self, name: &str) -> Option<&CollectionToMatch<'a>> {
        self.entries.get(name)
    }

    /// Input names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Inputs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionToMatch<'a>> {
        self.entries.values()
    }
}

/// Per-input record of a successful match.
#[derive(Debug, Clone)]
pub struct MatchedCollection<'a> {
    pub name: String,
    pub instance: &'a DatasetCollection,
    /// Declared type of the instance.
    pub collection_type: CollectionTypeDescription,
    /// Declared type with the subcollection suffix removed.
    pub effective_type: CollectionTypeDescription,
    pub subcollection_type: Option<CollectionTypeDescription>,
    pub linked: bool,
    /// This input's own structure.
    pub structure: Structure,
    /// First segment of a unified path that addresses this input.
    path_offset: usize,
}

impl<'a> MatchedCollection<'a> {
    /// Resolves the element of this input addressed by `path` in the unified
    /// structure. Positions are followed; identifiers are not consulted.
    fn resolve(&self, path: &ElementPath) -> Result<&'a ElementObject> {
        let unknown = || MatchError::UnknownPath { path: path.clone() };
        let indices: Vec<usize> = path
            .indices()
            .skip(self.path_offset)
            .take(self.effective_type.rank())
            .collect();

        let mut collection: &'a DatasetCollection = self.instance;
        for (depth, index) in indices.iter().enumerate() {
            let element = collection.elements.get(*index).ok_or_else(unknown)?;
            if depth + 1 == indices.len() {
                return Ok(&element.object);
            }
            collection = element.object.as_collection().ok_or_else(unknown)?;
        }
        Err(unknown())
    }
}

/// The elements bound to every input for one leaf of the unified structure.
#[derive(Debug, Clone)]
pub struct ElementSlice<'a> {
    pub path: ElementPath,
    /// Input name to bound dataset, or to a whole sub-collection for inputs
    /// matched with a subcollection type. Insertion order of the inputs.
    pub bindings: IndexMap<String, &'a ElementObject>,
}

/// Successful result of matching a [`CollectionsToMatch`].
#[derive(Debug, Clone)]
pub struct MatchingCollections<'a> {
    collection_type: CollectionTypeDescription,
    structure: Structure,
    linked_structure: Option<Structure>,
    entries: Vec<MatchedCollection<'a>>,
}

impl<'a> MatchingCollections<'a> {
    /// Matches `to_match` with default [`MatchOptions`].
    ///
    /// # Errors
    ///
    /// See [`for_collections_with`](Self::for_collections_with).
    pub fn for_collections(
        to_match: &CollectionsToMatch<'a>,
        type_factory: &CollectionTypeDescriptionFactory,
    ) -> Result<Self> {
        Self::for_collections_with(to_match, type_factory, &MatchOptions::default())
    }

    /// Validates that all linked inputs share an effective type and shape,
    /// then builds the unified structure.
    ///
    /// # Errors
    ///
    /// - [`MatchError::NoCollections`] if `to_match` is empty.
    /// - [`MatchError::InvalidTypeSyntax`] if a declared type does not parse.
    /// - [`MatchError::SubcollectionTypeMismatch`] if a subcollection type is
    ///   not a proper suffix of its input's declared type.
    /// - [`MatchError::CollectionTypeMismatch`] if two linked inputs have
    ///   different effective types.
    /// - [`MatchError::MalformedCollection`] if an instance contradicts its
    ///   declared type.
    /// - [`MatchError::CollectionStructureMismatch`] if two linked inputs
    ///   disagree in shape.
    pub fn for_collections_with(
        to_match: &CollectionsToMatch<'a>,
        type_factory: &CollectionTypeDescriptionFactory,
        options: &MatchOptions,
    ) -> Result<Self> {
        if !to_match.has_collections() {
            return Err(MatchError::NoCollections);
        }

        let mut prepared = Vec::with_capacity(to_match.len());
        for entry in to_match.iter() {
            let declared = type_factory.for_collection_type(&entry.instance.collection_type)?;
            let effective = declared
                .effective_collection_type(entry.subcollection_type.as_ref())
                .map_err(|_| MatchError::SubcollectionTypeMismatch {
                    name: entry.name.clone(),
                    collection_type: declared.collection_type().to_string(),
                    subcollection_type: entry
                        .subcollection_type
                        .as_ref()
                        .map(|s| s.collection_type().to_string())
                        .unwrap_or_default(),
                })?;
            debug!(
                input = %entry.name,
                declared = %declared,
                effective = %effective,
                linked = entry.linked,
                "computed effective collection type"
            );
            prepared.push((entry, declared, effective));
        }

        let mut reference: Option<(&str, &CollectionTypeDescription)> = None;
        for (entry, _, effective) in prepared.iter().filter(|(e, _, _)| e.linked) {
            let Some((name, expected)) = reference else {
                reference = Some((entry.name.as_str(), effective));
                continue;
            };
            if !expected.can_match_type(effective) {
                return Err(MatchError::CollectionTypeMismatch {
                    first: name.to_string(),
                    first_type: expected.collection_type().to_string(),
                    second: entry.name.clone(),
                    second_type: effective.collection_type().to_string(),
                });
            }
        }

        let mut entries = Vec::with_capacity(prepared.len());
        for (entry, declared, effective) in prepared {
            let structure = get_structure(entry.instance, &declared, entry.subcollection_type.as_ref())?;
            entries.push(MatchedCollection {
                name: entry.name.clone(),
                instance: entry.instance,
                collection_type: declared,
                effective_type: effective,
                subcollection_type: entry.subcollection_type.clone(),
                linked: entry.linked,
                structure,
                path_offset: 0,
            });
        }

        let mut linked = entries.iter().filter(|e| e.linked);
        let linked_reference = linked.next();
        if let Some(first) = linked_reference {
            for other in linked {
                if let Some((path, reason)) =
                    first.structure.first_mismatch(&other.structure, options.identifier_policy)
                {
                    debug!(
                        first = %first.name,
                        second = %other.name,
                        %path,
                        %reason,
                        "collection structures disagree"
                    );
                    return Err(MatchError::CollectionStructureMismatch {
                        first: first.name.clone(),
                        second: other.name.clone(),
                        path,
                        reason,
                    });
                }
            }
        }

        let linked_structure = linked_reference.map(|e| e.structure.clone());
        let mut collection_type = linked_reference.map(|e| e.effective_type.clone());
        let mut structure = linked_structure.clone();
        let mut offset = linked_reference.map_or(0, |e| e.effective_type.rank());

        for entry in entries.iter_mut().filter(|e| !e.linked) {
            entry.path_offset = offset;
            offset += entry.effective_type.rank();
            collection_type = Some(match collection_type {
                Some(outer) => outer.multiply(&entry.effective_type),
                None => entry.effective_type.clone(),
            });
            structure = Some(match structure {
                Some(outer) => outer.multiply(&entry.structure),
                None => entry.structure.clone(),
            });
        }

        let (Some(collection_type), Some(structure)) = (collection_type, structure) else {
            return Err(MatchError::NoCollections);
        };

        info!(
            collection_type = %collection_type,
            inputs = entries.len(),
            elements = structure.leaf_count(),
            "matched collections"
        );

        Ok(Self {
            collection_type,
            structure,
            linked_structure,
            entries,
        })
    }

    /// Unified effective type: the linked type, nested with every unlinked
    /// type in insertion order.
    pub fn collection_type(&self) -> &CollectionTypeDescription {
        &self.collection_type
    }

    /// Unified iteration shape.
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Shape shared by the linked inputs, before unlinked inputs are crossed
    /// in.
    pub fn linked_structure(&self) -> Option<&Structure> {
        self.linked_structure.as_ref()
    }

    /// Returns `true` if at least one input is iterated in lock-step.
    pub fn is_mapped_over(&self) -> bool {
        self.linked_structure.is_some()
    }

    /// Per-input match records in insertion order.
    pub fn entries(&self) -> &[MatchedCollection<'a>] {
        &self.entries
    }

    /// Match record for the input named `name`.
    pub fn entry(&self, name: &str) -> Option<&MatchedCollection<'a>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Binds every input for the leaf at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnknownPath`] unless `path` addresses a leaf of
    /// [`structure`](Self::structure).
    pub fn slice_at(&self, path: &ElementPath) -> Result<ElementSlice<'a>> {
        if !matches!(self.structure.get(path), Some(Structure::Leaf)) {
            return Err(MatchError::UnknownPath { path: path.clone() });
        }

        let mut bindings = IndexMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            bindings.insert(entry.name.clone(), entry.resolve(path)?);
        }
        Ok(ElementSlice {
            path: path.clone(),
            bindings,
        })
    }

    /// One slice per leaf of the unified structure, depth-first.
    ///
    /// # Errors
    ///
    /// Same as [`slice_at`](Self::slice_at).
    pub fn slices(&self) -> Result<Vec<ElementSlice<'a>>> {
        self.structure
            .leaf_paths()
            .iter()
            .map(|path| self.slice_at(path))
            .collect()
    }
}
