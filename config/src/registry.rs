//! Type registry assembled from configuration.

use std::collections::BTreeSet;

use collection_match_core::{BUILTIN_COLLECTION_TYPES, TypeRegistry};

/// [`TypeRegistry`] holding the built-in tokens (optionally) plus any extra
/// tokens a deployment registers.
///
/// # Examples
///
/// ```
/// use collection_match_config::ConfiguredTypeRegistry;
/// use collection_match_core::TypeRegistry;
///
/// let registry = ConfiguredTypeRegistry::new(true, ["sample_sheet"]);
/// assert!(registry.is_known("list"));
/// assert!(registry.is_known("sample_sheet"));
///
/// let bare = ConfiguredTypeRegistry::new(false, ["sample_sheet"]);
/// assert!(!bare.is_known("list"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfiguredTypeRegistry {
    types: BTreeSet<String>,
}

impl ConfiguredTypeRegistry {
    /// Creates a registry of `extra_types`, plus the built-in types when `include_builtin` is set.
    pub fn new<I, S>(include_builtin: bool, extra_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut types: BTreeSet<String> = extra_types.into_iter().map(Into::into).collect();
        if include_builtin {
            types.extend(BUILTIN_COLLECTION_TYPES.iter().map(|t| t.to_string()));
        }
        Self { types }
    }

    /// Registered tokens in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Number of registered type tokens.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type token is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeRegistry for ConfiguredTypeRegistry {
    fn is_known(&self, token: &str) -> bool {
        self.types.contains(token)
    }
}
