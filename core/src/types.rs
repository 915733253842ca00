//! Collection type descriptions and the registry of primitive type tokens.
//!
//! A collection type is a colon-joined sequence of primitive tokens, outermost
//! first: `list:paired` is a list whose elements are pairs. The
//! [`CollectionTypeDescription`] holds the parsed token sequence and provides
//! the small algebra the structure extractor and matcher are built on.

use std::fmt;
use std::sync::Arc;

use crate::error::{MatchError, Result};

/// Primitive collection types known to every deployment.
pub const BUILTIN_COLLECTION_TYPES: &[&str] = &["list", "paired", "record", "paired_or_unpaired"];

/// Separator between tokens of a collection type string.
pub const TYPE_SEPARATOR: char = ':';

/// Source of valid primitive collection-type tokens.
///
/// Every registered token denotes one collection level, so how deep a type
/// decomposes is given by its token count alone.
pub trait TypeRegistry: Send + Sync {
    /// Returns `true` if `token` names a registered collection type.
    fn is_known(&self, token: &str) -> bool;
}

/// Registry containing exactly [`BUILTIN_COLLECTION_TYPES`].
///
/// # Examples
///
/// ```
/// use collection_match_core::{BuiltinTypeRegistry, TypeRegistry};
///
/// let registry = BuiltinTypeRegistry;
/// assert!(registry.is_known("list"));
/// assert!(registry.is_known("paired"));
/// assert!(!registry.is_known("tuple"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypeRegistry;

impl TypeRegistry for BuiltinTypeRegistry {
    fn is_known(&self, token: &str) -> bool {
        BUILTIN_COLLECTION_TYPES.contains(&token)
    }
}

/// Parsed, immutable collection type such as `list:paired`.
///
/// Token storage is shared, so clones are cheap. Equality is token-sequence
/// equality.
///
/// # Examples
///
/// ```
/// use collection_match_core::{BuiltinTypeRegistry, CollectionTypeDescription};
///
/// let list_paired = CollectionTypeDescription::parse("list:paired", &BuiltinTypeRegistry).unwrap();
/// let paired = CollectionTypeDescription::parse("paired", &BuiltinTypeRegistry).unwrap();
///
/// assert_eq!(list_paired.rank(), 2);
/// assert!(paired.is_suffix_of(&list_paired));
/// assert_eq!(list_paired.strip_suffix(&paired).unwrap().to_string(), "list");
/// assert_eq!(list_paired.child_description().unwrap(), paired);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionTypeDescription {
    collection_type: Arc<str>,
    tokens: Arc<[String]>,
}

impl CollectionTypeDescription {
    /// Parses a colon-joined type string, validating each token against
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidTypeSyntax`] if the string is empty,
    /// contains an empty token, or contains a token unknown to `registry`.
    pub fn parse(collection_type: &str, registry: &dyn TypeRegistry) -> Result<Self> {
        let invalid = |reason: String| MatchError::InvalidTypeSyntax {
            collection_type: collection_type.to_string(),
            reason,
        };

        if collection_type.is_empty() {
            return Err(invalid("collection type cannot be empty".to_string()));
        }

        let mut tokens = Vec::new();
        for token in collection_type.split(TYPE_SEPARATOR) {
            if token.is_empty() {
                return Err(invalid("empty type token".to_string()));
            }
            if !registry.is_known(token) {
                return Err(invalid(format!("unknown type token '{token}'")));
            }
            tokens.push(token.to_string());
        }

        Ok(Self::from_tokens(tokens))
    }

    fn from_tokens(tokens: Vec<String>) -> Self {
        debug_assert!(!tokens.is_empty());
        let joined = tokens.join(TYPE_SEPARATOR.to_string().as_str());
        Self {
            collection_type: Arc::from(joined),
            tokens: Arc::from(tokens),
        }
    }

    /// Canonical type string.
    pub fn collection_type(&self) -> &str {
        &self.collection_type
    }

    /// Primitive tokens, outermost first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of nesting levels.
    pub fn rank(&self) -> usize {
        self.tokens.len()
    }

    /// Outermost token.
    pub fn root_token(&self) -> &str {
        &self.tokens[0]
    }

    /// Returns `true` if elements of this type are themselves collections.
    pub fn has_subcollections(&self) -> bool {
        self.rank() > 1
    }

    /// Type of this collection's elements (`list:paired` → `paired`).
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NoSubcollections`] for single-token types.
    pub fn child_description(&self) -> Result<Self> {
        if !self.has_subcollections() {
            return Err(MatchError::NoSubcollections {
                collection_type: self.collection_type().to_string(),
            });
        }
        Ok(Self::from_tokens(self.tokens[1..].to_vec()))
    }

    /// Returns `true` if `other` ends with this type's tokens. A type is a
    /// suffix of itself.
    pub fn is_suffix_of(&self, other: &Self) -> bool {
        other.tokens.ends_with(&self.tokens)
    }

    /// Returns `true` if `other` is a proper suffix of this type, i.e. this
    /// collection can be mapped over subcollections of type `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use collection_match_core::{BuiltinTypeRegistry, CollectionTypeDescription};
    ///
    /// let parse = |s| CollectionTypeDescription::parse(s, &BuiltinTypeRegistry).unwrap();
    /// assert!(parse("list:list:paired").has_subcollections_of_type(&parse("list:paired")));
    /// assert!(!parse("list:paired").has_subcollections_of_type(&parse("list:paired")));
    /// assert!(!parse("list:paired").has_subcollections_of_type(&parse("list")));
    /// ```
    pub fn has_subcollections_of_type(&self, other: &Self) -> bool {
        other.rank() < self.rank() && other.is_suffix_of(self)
    }

    /// Inverse of [`has_subcollections_of_type`](Self::has_subcollections_of_type).
    pub fn is_subcollection_of_type(&self, other: &Self) -> bool {
        other.has_subcollections_of_type(self)
    }

    /// Returns `true` if both types have the same token sequence.
    pub fn can_match_type(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }

    /// Removes `subtype` from the end of this type (`list:paired` minus
    /// `paired` → `list`).
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NotASubtype`] unless `subtype` is a proper
    /// suffix; stripping the whole type would leave no tokens.
    pub fn strip_suffix(&self, subtype: &Self) -> Result<Self> {
        if !self.has_subcollections_of_type(subtype) {
            return Err(MatchError::NotASubtype {
                collection_type: self.collection_type().to_string(),
                subcollection_type: subtype.collection_type().to_string(),
            });
        }
        let keep = self.rank() - subtype.rank();
        Ok(Self::from_tokens(self.tokens[..keep].to_vec()))
    }

    /// Type used for compatibility checks when mapping over subcollections of
    /// type `subcollection_type` (or the whole type when `None`).
    ///
    /// # Errors
    ///
    /// Same as [`strip_suffix`](Self::strip_suffix).
    pub fn effective_collection_type(&self, subcollection_type: Option<&Self>) -> Result<Self> {
        match subcollection_type {
            Some(subtype) => self.strip_suffix(subtype),
            None => Ok(self.clone()),
        }
    }

    /// Nests `other` inside this type (`list` × `paired` → `list:paired`).
    pub fn multiply(&self, other: &Self) -> Self {
        let tokens = self.tokens.iter().chain(other.tokens.iter()).cloned().collect();
        Self::from_tokens(tokens)
    }
}

impl fmt::Display for CollectionTypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> CollectionTypeDescription {
        CollectionTypeDescription::parse(s, &BuiltinTypeRegistry).unwrap()
    }

    #[test]
    fn test_parse_round_trips_canonical_string() {
        let description = parse("list:list:paired");
        assert_eq!(description.tokens(), ["list", "list", "paired"]);
        assert_eq!(description.tokens().join(":"), "list:list:paired");
        assert_eq!(description.collection_type(), "list:list:paired");
        assert_eq!(description.root_token(), "list");
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown_tokens() {
        for bad in ["", "list::paired", ":list", "list:", "list:tuple"] {
            let err = CollectionTypeDescription::parse(bad, &BuiltinTypeRegistry).unwrap_err();
            assert!(
                matches!(err, MatchError::InvalidTypeSyntax { ref collection_type, .. } if collection_type == bad),
                "unexpected error for {bad:?}: {err:?}"
            );
        }
    }

    #[test]
    fn test_child_description_of_single_token_fails() {
        let err = parse("paired").child_description().unwrap_err();
        assert_eq!(
            err,
            MatchError::NoSubcollections {
                collection_type: "paired".to_string()
            }
        );
        assert_eq!(parse("list:list:paired").child_description().unwrap(), parse("list:paired"));
    }

    #[test]
    fn test_suffix_relations() {
        let list_paired = parse("list:paired");
        assert!(parse("paired").is_suffix_of(&list_paired));
        assert!(list_paired.is_suffix_of(&list_paired));
        assert!(!parse("list").is_suffix_of(&list_paired));
        assert!(parse("paired").is_subcollection_of_type(&list_paired));
        assert!(!list_paired.is_subcollection_of_type(&list_paired));
    }

    #[test]
    fn test_strip_suffix_requires_proper_suffix() {
        let list_paired = parse("list:paired");
        assert_eq!(list_paired.strip_suffix(&parse("paired")).unwrap(), parse("list"));

        for subtype in ["list", "list:paired", "list:list:paired"] {
            let err = list_paired.strip_suffix(&parse(subtype)).unwrap_err();
            assert_eq!(
                err,
                MatchError::NotASubtype {
                    collection_type: "list:paired".to_string(),
                    subcollection_type: subtype.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_multiply_concatenates_tokens() {
        let product = parse("list").multiply(&parse("list:paired"));
        assert_eq!(product, parse("list:list:paired"));
        assert_eq!(product.to_string(), "list:list:paired");
    }

    #[test]
    fn test_effective_collection_type() {
        let nested = parse("list:list");
        assert_eq!(nested.effective_collection_type(None).unwrap(), nested);
        assert_eq!(
            nested.effective_collection_type(Some(&parse("list"))).unwrap(),
            parse("list")
        );
    }
}
