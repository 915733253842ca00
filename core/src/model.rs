//! In-memory collection instances.
//!
//! These are the shapes the persistence layer hands to the matcher: a
//! declared type string plus ordered, identified elements. Datasets are
//! referenced by handle only; their content is never read here.

use serde::{Deserialize, Serialize};

/// Handle to a terminal dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Opaque dataset identifier.
    pub id: String,
    /// Datatype extension (e.g. `fastqsanger`), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl DatasetRef {
    /// Creates a reference to dataset `id` with no extension.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extension: None,
        }
    }

    /// Adds a datatype extension.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }
}

/// What a collection element holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementObject {
    /// A terminal dataset.
    Dataset(DatasetRef),
    /// A nested collection.
    Collection(DatasetCollection),
}

impl ElementObject {
    /// Returns the nested collection, if this element is one.
    pub fn as_collection(&self) -> Option<&DatasetCollection> {
        match self {
            Self::Collection(collection) => Some(collection),
            Self::Dataset(_) => None,
        }
    }

    /// Returns the dataset handle, if this element is one.
    pub fn as_dataset(&self) -> Option<&DatasetRef> {
        match self {
            Self::Dataset(dataset) => Some(dataset),
            Self::Collection(_) => None,
        }
    }
}

/// One identified element of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionElement {
    /// Name of the element, unique within its parent.
    pub element_identifier: String,
    /// The dataset or nested collection.
    pub object: ElementObject,
}

/// A concrete, possibly nested, dataset collection.
///
/// # Examples
///
/// ```
/// use collection_match_core::{DatasetCollection, DatasetRef};
///
/// let pair = DatasetCollection::new("paired")
///     .with_dataset("forward", DatasetRef::new("1"))
///     .with_dataset("reverse", DatasetRef::new("2"));
///
/// let list = DatasetCollection::new("list:paired").with_collection("sample1", pair);
///
/// assert_eq!(list.len(), 1);
/// assert_eq!(list.identifiers().collect::<Vec<_>>(), vec!["sample1"]);
/// assert!(list.elements[0].object.as_collection().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCollection {
    /// Declared colon-joined collection type.
    pub collection_type: String,
    /// Elements in iteration order.
    #[serde(default)]
    pub elements: Vec<CollectionElement>,
}

impl DatasetCollection {
    /// Creates an empty collection of the given declared type.
    pub fn new(collection_type: impl Into<String>) -> Self {
        Self {
            collection_type: collection_type.into(),
            elements: Vec::new(),
        }
    }

    /// Appends a dataset element.
    pub fn with_dataset(mut self, identifier: &str, dataset: DatasetRef) -> Self {
        self.elements.push(CollectionElement {
            element_identifier: identifier.to_string(),
            object: ElementObject::Dataset(dataset),
        });
        self
    }

    /// Appends a nested collection element.
    pub fn with_collection(mut self, identifier: &str, collection: DatasetCollection) -> Self {
        self.elements.push(CollectionElement {
            element_identifier: identifier.to_string(),
            object: ElementObject::Collection(collection),
        });
        self
    }

    /// Number of immediate elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the collection has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Immediate element identifiers in iteration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.element_identifier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape_is_tagged() {
        let pair = DatasetCollection::new("paired")
            .with_dataset("forward", DatasetRef::new("1").with_extension("fastqsanger"))
            .with_dataset("reverse", DatasetRef::new("2"));

        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value["collection_type"], "paired");
        assert_eq!(value["elements"][0]["object"]["kind"], "dataset");
        assert_eq!(value["elements"][0]["object"]["extension"], "fastqsanger");
        assert!(value["elements"][1]["object"].get("extension").is_none());

        let back: DatasetCollection = serde_json::from_value(value).unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn test_missing_elements_deserialize_as_empty() {
        let collection: DatasetCollection =
            serde_json::from_str(r#"{"collection_type": "list"}"#).unwrap();
        assert!(collection.is_empty());
    }
}
