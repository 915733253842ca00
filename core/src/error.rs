//! Error types for collection type parsing, structure extraction and matching.
//!
//! Every failure here is a validation failure: the inputs were read-only
//! in-memory descriptions, so the same inputs always produce the same error.
//! Variants carry the entry names, type strings and element paths needed to
//! build a user-facing message.

use std::fmt;

use thiserror::Error;

/// One step of an [`ElementPath`]: the position of a child within its parent
/// and the element identifier found there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Zero-based position among the parent's children.
    pub index: usize,
    /// Element identifier at that position.
    pub identifier: String,
}

/// Path from the root of a [`Structure`](crate::Structure) to one of its
/// nodes or leaves.
///
/// Displays as identifiers joined by `/`. A `/` or `\` inside an identifier
/// is escaped with a backslash.
///
/// # Examples
///
/// ```
/// use collection_match_core::ElementPath;
///
/// let path = ElementPath::root().child(0, "data1").child(1, "reverse");
/// assert_eq!(path.depth(), 2);
/// assert_eq!(path.to_string(), "data1/reverse");
/// assert_eq!(ElementPath::root().to_string(), "<root>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementPath {
    segments: Vec<PathSegment>,
}

impl ElementPath {
    /// Returns the empty path addressing the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by one segment.
    pub fn child(&self, index: usize, identifier: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(index, identifier);
        path
    }

    /// Appends a segment in place.
    pub fn push(&mut self, index: usize, identifier: impl Into<String>) {
        self.segments.push(PathSegment {
            index,
            identifier: identifier.into(),
        });
    }

    /// Removes the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments from the root downwards.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Positional indices from the root downwards.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().map(|s| s.index)
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            for c in segment.identifier.chars() {
                if c == '/' || c == '\\' {
                    write!(f, "\\")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Why two structures disagree at a given path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureMismatch {
    /// Both sides are nodes but hold a different number of children.
    #[error("expected {expected} elements, found {found}")]
    Cardinality { expected: usize, found: usize },
    /// One side is a leaf and the other a node.
    #[error("cannot match a leaf against a nested collection")]
    Kind,
    /// Identifier equality was required and the identifiers differ.
    #[error("expected element identifier '{expected}', found '{found}'")]
    Identifier { expected: String, found: String },
}

/// Errors raised while parsing collection types, extracting structures or
/// matching collections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The type string is empty, has an empty token, or names a token the
    /// registry does not know.
    #[error("invalid collection type '{collection_type}': {reason}")]
    InvalidTypeSyntax {
        collection_type: String,
        reason: String,
    },

    /// A child description was requested for a single-token type.
    #[error("collection type '{collection_type}' has no subcollections")]
    NoSubcollections { collection_type: String },

    /// `subcollection_type` is not a proper suffix of `collection_type`.
    #[error("'{subcollection_type}' is not a subcollection type of '{collection_type}'")]
    NotASubtype {
        collection_type: String,
        subcollection_type: String,
    },

    /// The subcollection type requested for a named input does not fit the
    /// input's declared type.
    #[error(
        "input '{name}' of type '{collection_type}' cannot be mapped over subcollections of type '{subcollection_type}'"
    )]
    SubcollectionTypeMismatch {
        name: String,
        collection_type: String,
        subcollection_type: String,
    },

    /// Two linked inputs have different effective collection types.
    #[error(
        "cannot match collection types: input '{first}' is '{first_type}' but input '{second}' is '{second_type}'"
    )]
    CollectionTypeMismatch {
        first: String,
        first_type: String,
        second: String,
        second_type: String,
    },

    /// Two linked inputs agree on type but not on shape.
    #[error("cannot match collections '{first}' and '{second}' at {path}: {reason}")]
    CollectionStructureMismatch {
        first: String,
        second: String,
        path: ElementPath,
        reason: StructureMismatch,
    },

    /// A collection instance's elements contradict its declared type.
    #[error("malformed collection of type '{collection_type}' at {path}: {reason}")]
    MalformedCollection {
        collection_type: String,
        path: ElementPath,
        reason: String,
    },

    /// Matching was requested without any inputs.
    #[error("no collections to match")]
    NoCollections,

    /// A slice was requested for a path the matched structure does not have.
    #[error("no element at {path}")]
    UnknownPath { path: ElementPath },
}

/// Convenience alias for results with [`MatchError`].
pub type Result<T> = std::result::Result<T, MatchError>;
