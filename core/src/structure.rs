//! Abstract shapes of concrete collections.
//!
//! [`get_structure`] walks a [`DatasetCollection`] alongside its type
//! description and produces a [`Structure`]: a regular tree of nodes and
//! leaves that only records identifiers and cardinalities. Structures are what
//! the matcher compares; the collections themselves are never modified.
//!
//! # Example
//!
//! ```
//! use collection_match_core::*;
//!
//! let factory = CollectionTypeDescriptionFactory::default();
//! let pair = DatasetCollection::new("paired")
//!     .with_dataset("left", DatasetRef::new("1"))
//!     .with_dataset("right", DatasetRef::new("2"));
//!
//! let paired = factory.for_collection_type("paired").unwrap();
//! let structure = get_structure(&pair, &paired, None).unwrap();
//!
//! assert_eq!(structure.children().len(), 2);
//! assert_eq!(structure.children()[0].0, "left");
//! assert!(structure.children()[0].1.is_leaf());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ElementPath, MatchError, Result, StructureMismatch};
use crate::model::DatasetCollection;
use crate::types::CollectionTypeDescription;

/// How element identifiers are treated when comparing structures.
///
/// # Examples
///
/// ```
/// use collection_match_core::IdentifierPolicy;
///
/// assert_eq!(IdentifierPolicy::default(), IdentifierPolicy::CountOnly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierPolicy {
    /// Only cardinalities must agree; elements pair up by position.
    #[default]
    CountOnly,
    /// Identifiers at each position must also be equal.
    RequireEqual,
}

/// One level of a [`Structure`]: the remaining effective type at this depth
/// and the identified children in iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    collection_type: CollectionTypeDescription,
    children: Vec<(String, Structure)>,
}

impl Tree {
    /// Type of this level with any subcollection suffix removed.
    pub fn collection_type(&self) -> &CollectionTypeDescription {
        &self.collection_type
    }

    /// `(identifier, substructure)` pairs in iteration order.
    pub fn children(&self) -> &[(String, Structure)] {
        &self.children
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` for a node without children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Shape of a collection: either an opaque leaf or a node with children.
///
/// A leaf stands for a dataset, or for a whole sub-collection when
/// extraction stopped at a subcollection type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    Leaf,
    Node(Tree),
}

impl Structure {
    /// Returns `true` for a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf)
    }

    /// The node, or `None` for a leaf.
    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Node(tree) => Some(tree),
            Self::Leaf => None,
        }
    }

    /// Children of a node; empty for a leaf.
    pub fn children(&self) -> &[(String, Structure)] {
        match self {
            Self::Node(tree) => tree.children(),
            Self::Leaf => &[],
        }
    }

    /// Type of a node; `None` for a leaf.
    pub fn collection_type(&self) -> Option<&CollectionTypeDescription> {
        self.as_tree().map(Tree::collection_type)
    }

    /// Number of leaves reachable from here.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf => 1,
            Self::Node(tree) => tree.children.iter().map(|(_, c)| c.leaf_count()).sum(),
        }
    }

    /// Substructure at `path`, following positions and ignoring identifiers.
    pub fn get(&self, path: &ElementPath) -> Option<&Structure> {
        let mut current = self;
        for index in path.indices() {
            current = &current.children().get(index)?.1;
        }
        Some(current)
    }

    /// Depth-first paths to every leaf, in iteration order.
    pub fn leaf_paths(&self) -> Vec<ElementPath> {
        let mut paths = Vec::new();
        collect_leaf_paths(self, &mut ElementPath::root(), &mut paths);
        paths
    }

    /// Returns `true` if [`first_mismatch`](Self::first_mismatch) finds
    /// nothing.
    pub fn can_match(&self, other: &Structure, policy: IdentifierPolicy) -> bool {
        self.first_mismatch(other, policy).is_none()
    }

    /// Compares two structures level by level and returns the path and reason
    /// of the first disagreement.
    ///
    /// Nodes agree when they have the same number of children (and, under
    /// [`IdentifierPolicy::RequireEqual`], the same identifiers) and their
    /// children agree pairwise by position. A leaf only agrees with a leaf.
    pub fn first_mismatch(
        &self,
        other: &Structure,
        policy: IdentifierPolicy,
    ) -> Option<(ElementPath, StructureMismatch)> {
        compare(self, other, policy, &mut ElementPath::root())
    }

    /// Cross product: every leaf is replaced by a copy of `other`, and node
    /// types are nested accordingly.
    ///
    /// # Examples
    ///
    /// ```
    /// use collection_match_core::*;
    ///
    /// let factory = CollectionTypeDescriptionFactory::default();
    /// let list = DatasetCollection::new("list")
    ///     .with_dataset("a", DatasetRef::new("1"))
    ///     .with_dataset("b", DatasetRef::new("2"));
    /// let pair = DatasetCollection::new("paired")
    ///     .with_dataset("forward", DatasetRef::new("3"))
    ///     .with_dataset("reverse", DatasetRef::new("4"));
    ///
    /// let outer = get_structure(&list, &factory.for_collection_type("list").unwrap(), None).unwrap();
    /// let inner = get_structure(&pair, &factory.for_collection_type("paired").unwrap(), None).unwrap();
    /// let product = outer.multiply(&inner);
    ///
    /// assert_eq!(product.collection_type().unwrap().collection_type(), "list:paired");
    /// assert_eq!(product.leaf_count(), 4);
    /// ```
    pub fn multiply(&self, other: &Structure) -> Structure {
        match self {
            Self::Leaf => other.clone(),
            Self::Node(tree) => {
                let collection_type = match other.collection_type() {
                    Some(inner) => tree.collection_type.multiply(inner),
                    None => tree.collection_type.clone(),
                };
                Self::Node(Tree {
                    collection_type,
                    children: tree
                        .children
                        .iter()
                        .map(|(identifier, child)| (identifier.clone(), child.multiply(other)))
                        .collect(),
                })
            }
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Node(tree) => {
                write!(f, "{}[", tree.collection_type)?;
                for (i, (identifier, child)) in tree.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{identifier}: {child}")?;
                }
                write!(f, "]")
            }
        }
    }
}

fn collect_leaf_paths(structure: &Structure, path: &mut ElementPath, out: &mut Vec<ElementPath>) {
    match structure {
        Structure::Leaf => out.push(path.clone()),
        Structure::Node(tree) => {
            for (index, (identifier, child)) in tree.children.iter().enumerate() {
                path.push(index, identifier.as_str());
                collect_leaf_paths(child, path, out);
                path.pop();
            }
        }
    }
}

fn compare(
    expected: &Structure,
    found: &Structure,
    policy: IdentifierPolicy,
    path: &mut ElementPath,
) -> Option<(ElementPath, StructureMismatch)> {
    match (expected, found) {
        (Structure::Leaf, Structure::Leaf) => None,
        (Structure::Node(a), Structure::Node(b)) => {
            if a.len() != b.len() {
                return Some((
                    path.clone(),
                    StructureMismatch::Cardinality {
                        expected: a.len(),
                        found: b.len(),
                    },
                ));
            }
            for (index, ((id_a, child_a), (id_b, child_b))) in
                a.children.iter().zip(b.children.iter()).enumerate()
            {
                path.push(index, id_a.as_str());
                if policy == IdentifierPolicy::RequireEqual && id_a != id_b {
                    return Some((
                        path.clone(),
                        StructureMismatch::Identifier {
                            expected: id_a.clone(),
                            found: id_b.clone(),
                        },
                    ));
                }
                if let Some(mismatch) = compare(child_a, child_b, policy, path) {
                    return Some(mismatch);
                }
                path.pop();
            }
            None
        }
        _ => Some((path.clone(), StructureMismatch::Kind)),
    }
}

/// Extracts the [`Structure`] of `instance` read as `description`.
///
/// Recursion descends `description.rank()` levels, but stops one level early
/// wherever the remaining type equals `subcollection_type`: those
/// sub-collections become leaves and are not inspected. Node types are the
/// remaining types with `subcollection_type` stripped.
///
/// # Errors
///
/// - [`MatchError::NotASubtype`] if `subcollection_type` is not a suffix of
///   `description`.
/// - [`MatchError::MalformedCollection`] if a dataset appears where the type
///   requires a nested collection, a nested collection appears where the type
///   requires a dataset, or a nested collection declares a different type than
///   the level it sits at.
///
/// # Examples
///
/// ```
/// use collection_match_core::*;
///
/// let factory = CollectionTypeDescriptionFactory::default();
/// let pair = || {
///     DatasetCollection::new("paired")
///         .with_dataset("forward", DatasetRef::new("f"))
///         .with_dataset("reverse", DatasetRef::new("r"))
/// };
/// let list = DatasetCollection::new("list:paired")
///     .with_collection("data1", pair())
///     .with_collection("data2", pair())
///     .with_collection("data3", pair());
///
/// let list_paired = factory.for_collection_type("list:paired").unwrap();
/// let paired = factory.for_collection_type("paired").unwrap();
/// let structure = get_structure(&list, &list_paired, Some(&paired)).unwrap();
///
/// assert_eq!(structure.collection_type().unwrap().collection_type(), "list");
/// assert_eq!(structure.children().len(), 3);
/// assert!(structure.children().iter().all(|(_, child)| child.is_leaf()));
/// ```
pub fn get_structure(
    instance: &DatasetCollection,
    description: &CollectionTypeDescription,
    subcollection_type: Option<&CollectionTypeDescription>,
) -> Result<Structure> {
    if let Some(subtype) = subcollection_type {
        if !subtype.is_suffix_of(description) {
            return Err(MatchError::NotASubtype {
                collection_type: description.collection_type().to_string(),
                subcollection_type: subtype.collection_type().to_string(),
            });
        }
    }
    build(instance, description, subcollection_type, &mut ElementPath::root())
}

fn build(
    instance: &DatasetCollection,
    remaining: &CollectionTypeDescription,
    subcollection_type: Option<&CollectionTypeDescription>,
    path: &mut ElementPath,
) -> Result<Structure> {
    if subcollection_type == Some(remaining) {
        return Ok(Structure::Leaf);
    }

    let collection_type = remaining.effective_collection_type(subcollection_type)?;
    let child_description = if remaining.has_subcollections() {
        Some(remaining.child_description()?)
    } else {
        None
    };

    let mut children = Vec::with_capacity(instance.len());
    for (index, element) in instance.elements.iter().enumerate() {
        let identifier = element.element_identifier.as_str();
        let child = match &child_description {
            None => {
                if let Some(collection) = element.object.as_collection() {
                    path.push(index, identifier);
                    return Err(MatchError::MalformedCollection {
                        collection_type: remaining.collection_type().to_string(),
                        path: path.clone(),
                        reason: format!(
                            "expected a dataset, found a nested '{}' collection",
                            collection.collection_type
                        ),
                    });
                }
                Structure::Leaf
            }
            Some(child_type) if subcollection_type == Some(child_type) => Structure::Leaf,
            Some(child_type) => {
                path.push(index, identifier);
                let collection = match element.object.as_collection() {
                    Some(collection) if collection.collection_type == child_type.collection_type() => {
                        collection
                    }
                    Some(collection) => {
                        return Err(MatchError::MalformedCollection {
                            collection_type: remaining.collection_type().to_string(),
                            path: path.clone(),
                            reason: format!(
                                "expected a nested '{child_type}' collection, found '{}'",
                                collection.collection_type
                            ),
                        });
                    }
                    None => {
                        return Err(MatchError::MalformedCollection {
                            collection_type: remaining.collection_type().to_string(),
                            path: path.clone(),
                            reason: format!("expected a nested '{child_type}' collection, found a dataset"),
                        });
                    }
                };
                let child = build(collection, child_type, subcollection_type, path)?;
                path.pop();
                child
            }
        };
        children.push((identifier.to_string(), child));
    }

    Ok(Structure::Node(Tree {
        collection_type,
        children,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CollectionTypeDescriptionFactory;
    use crate::model::DatasetRef;

    fn description(s: &str) -> CollectionTypeDescription {
        CollectionTypeDescriptionFactory::default()
            .for_collection_type(s)
            .unwrap()
    }

    fn pair() -> DatasetCollection {
        DatasetCollection::new("paired")
            .with_dataset("left", DatasetRef::new("l"))
            .with_dataset("right", DatasetRef::new("r"))
    }

    fn list(ids: &[&str]) -> DatasetCollection {
        ids.iter().fold(DatasetCollection::new("list"), |c, id| {
            c.with_dataset(id, DatasetRef::new(*id))
        })
    }

    fn list_of_pairs() -> DatasetCollection {
        DatasetCollection::new("list:paired")
            .with_collection("data1", pair())
            .with_collection("data2", pair())
            .with_collection("data3", pair())
    }

    #[test]
    fn test_get_structure_paired() {
        let structure = get_structure(&pair(), &description("paired"), None).unwrap();
        assert_eq!(structure.collection_type(), Some(&description("paired")));
        assert_eq!(structure.children().len(), 2);
        assert_eq!(structure.children()[0], ("left".to_string(), Structure::Leaf));
    }

    #[test]
    fn test_get_structure_list_paired_truncated_at_paired() {
        let structure = get_structure(
            &list_of_pairs(),
            &description("list:paired"),
            Some(&description("paired")),
        )
        .unwrap();

        assert_eq!(structure.collection_type(), Some(&description("list")));
        let children = structure.children();
        assert_eq!(children.len(), 3);
        for (child, expected) in children.iter().zip(["data1", "data2", "data3"]) {
            assert_eq!(child.0, expected);
            assert!(child.1.is_leaf());
        }
    }

    #[test]
    fn test_get_structure_full_depth() {
        let structure = get_structure(&list_of_pairs(), &description("list:paired"), None).unwrap();
        assert_eq!(structure.leaf_count(), 6);
        let inner = &structure.children()[1].1;
        assert_eq!(inner.collection_type(), Some(&description("paired")));
        assert_eq!(inner.children()[1].0, "right");
    }

    #[test]
    fn test_get_structure_of_empty_collection() {
        let structure = get_structure(&list(&[]), &description("list"), None).unwrap();
        assert!(!structure.is_leaf());
        assert!(structure.children().is_empty());
        assert!(structure.leaf_paths().is_empty());
    }

    #[test]
    fn test_get_structure_subcollection_equal_to_whole_type_is_leaf() {
        let structure = get_structure(&pair(), &description("paired"), Some(&description("paired"))).unwrap();
        assert!(structure.is_leaf());
    }

    #[test]
    fn test_get_structure_rejects_non_suffix_subcollection() {
        let err = get_structure(&list_of_pairs(), &description("list:paired"), Some(&description("list")))
            .unwrap_err();
        assert_eq!(
            err,
            MatchError::NotASubtype {
                collection_type: "list:paired".to_string(),
                subcollection_type: "list".to_string(),
            }
        );
    }

    #[test]
    fn test_get_structure_reports_dataset_where_collection_expected() {
        let bad = DatasetCollection::new("list:paired")
            .with_collection("data1", pair())
            .with_dataset("data2", DatasetRef::new("oops"));

        let err = get_structure(&bad, &description("list:paired"), None).unwrap_err();
        match err {
            MatchError::MalformedCollection { path, .. } => assert_eq!(path.to_string(), "data2"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_get_structure_reports_collection_where_dataset_expected() {
        let bad = list(&["a"]).with_collection("b", list(&["x"]));

        let err = get_structure(&bad, &description("list"), None).unwrap_err();
        match err {
            MatchError::MalformedCollection {
                collection_type,
                path,
                reason,
            } => {
                assert_eq!(collection_type, "list");
                assert_eq!(path.to_string(), "b");
                assert!(reason.contains("expected a dataset"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_get_structure_reports_nested_type_disagreement() {
        let bad = DatasetCollection::new("list:paired").with_collection("s1", list(&["1", "2", "3"]));

        let err = get_structure(&bad, &description("list:paired"), None).unwrap_err();
        match err {
            MatchError::MalformedCollection { path, reason, .. } => {
                assert_eq!(path.to_string(), "s1");
                assert!(reason.contains("'paired'") && reason.contains("'list'"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncated_leaves_are_not_inspected() {
        let odd = DatasetCollection::new("list:paired").with_dataset("data1", DatasetRef::new("x"));
        let structure = get_structure(&odd, &description("list:paired"), Some(&description("paired"))).unwrap();
        assert_eq!(structure.children().len(), 1);
    }

    #[test]
    fn test_first_mismatch_cardinality_and_kind() {
        let two = get_structure(&list(&["a", "b"]), &description("list"), None).unwrap();
        let three = get_structure(&list(&["a", "b", "c"]), &description("list"), None).unwrap();
        let (path, reason) = two.first_mismatch(&three, IdentifierPolicy::CountOnly).unwrap();
        assert!(path.is_root());
        assert_eq!(reason, StructureMismatch::Cardinality { expected: 2, found: 3 });

        let nested = get_structure(
            &DatasetCollection::new("list:paired")
                .with_collection("a", pair())
                .with_collection("b", pair()),
            &description("list:paired"),
            None,
        )
        .unwrap();
        let (path, reason) = two.first_mismatch(&nested, IdentifierPolicy::CountOnly).unwrap();
        assert_eq!(path.to_string(), "a");
        assert_eq!(reason, StructureMismatch::Kind);
    }

    #[test]
    fn test_identifier_policy() {
        let xy = get_structure(&list(&["x", "y"]), &description("list"), None).unwrap();
        let pq = get_structure(&list(&["p", "q"]), &description("list"), None).unwrap();

        assert!(xy.can_match(&pq, IdentifierPolicy::CountOnly));
        let (path, reason) = xy.first_mismatch(&pq, IdentifierPolicy::RequireEqual).unwrap();
        assert_eq!(path.to_string(), "x");
        assert_eq!(
            reason,
            StructureMismatch::Identifier {
                expected: "x".to_string(),
                found: "p".to_string(),
            }
        );
    }

    #[test]
    fn test_multiply_nests_types_at_every_level() {
        let outer = get_structure(
            &DatasetCollection::new("list:list").with_collection("a", list(&["1", "2"])),
            &description("list:list"),
            None,
        )
        .unwrap();
        let inner = get_structure(&pair(), &description("paired"), None).unwrap();
        let product = outer.multiply(&inner);

        assert_eq!(product.collection_type(), Some(&description("list:list:paired")));
        let level_two = &product.children()[0].1;
        assert_eq!(level_two.collection_type(), Some(&description("list:paired")));
        assert_eq!(product.leaf_count(), 4);
        assert_eq!(product.leaf_paths()[3].to_string(), "a/2/right");
    }

    #[test]
    fn test_get_follows_positions() {
        let structure = get_structure(&list_of_pairs(), &description("list:paired"), None).unwrap();
        let path = ElementPath::root().child(2, "data3").child(0, "left");
        assert_eq!(structure.get(&path), Some(&Structure::Leaf));
        assert!(structure.get(&ElementPath::root().child(5, "nope")).is_none());
    }

    #[test]
    fn test_display() {
        let structure = get_structure(&pair(), &description("paired"), None).unwrap();
        assert_eq!(structure.to_string(), "paired[left: leaf, right: leaf]");
    }
}
