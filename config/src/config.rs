//! Matching configuration loaded from YAML.
//!
//! Controls which collection-type tokens are registered and how strictly
//! structures are compared.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! registry:
//!   include_builtin: true
//!   extra_types:
//!     - sample_sheet
//! matching:
//!   identifier_policy: require_equal
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use collection_match_core::{
    CollectionTypeDescriptionFactory, IdentifierPolicy, MatchOptions, TYPE_SEPARATOR,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::registry::ConfiguredTypeRegistry;

fn default_true() -> bool {
    true
}

/// Which collection-type tokens are valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Register the built-in tokens (`list`, `paired`, ...).
    #[serde(default = "default_true")]
    pub include_builtin: bool,
    /// Additional deployment-specific tokens.
    #[serde(default)]
    pub extra_types: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            extra_types: Vec::new(),
        }
    }
}

/// Structure comparison settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub identifier_policy: IdentifierPolicy,
}

/// Top-level matching configuration.
///
/// # Examples
///
/// ```
/// use collection_match_config::MatchConfig;
/// use collection_match_core::IdentifierPolicy;
///
/// let config = MatchConfig::from_yaml_str(r#"
/// version: "1.0"
/// registry:
///   extra_types: [sample_sheet]
/// matching:
///   identifier_policy: require_equal
/// "#).unwrap();
///
/// assert_eq!(config.match_options().identifier_policy, IdentifierPolicy::RequireEqual);
/// let factory = config.type_factory();
/// assert!(factory.for_collection_type("list:sample_sheet").is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Configuration format version (e.g. `"1.0"`).
    pub version: String,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            registry: RegistryConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// [`YamlError`](ConfigError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](ConfigError::InvalidConfig) if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded match configuration");
        Ok(config)
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus I/O.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be
    /// written, or [`YamlError`](ConfigError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks the version and every extra type token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](ConfigError::InvalidConfig) for an empty
    /// version, or an extra token that is blank or contains the type
    /// separator.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "version cannot be empty".to_string(),
            ));
        }
        for token in &self.registry.extra_types {
            if token.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "extra type token cannot be empty".to_string(),
                ));
            }
            if token.contains(TYPE_SEPARATOR) {
                return Err(ConfigError::InvalidConfig(format!(
                    "extra type token '{token}' must not contain '{TYPE_SEPARATOR}'"
                )));
            }
        }
        Ok(())
    }

    /// Builds the registry described by this configuration.
    pub fn registry(&self) -> ConfiguredTypeRegistry {
        ConfiguredTypeRegistry::new(
            self.registry.include_builtin,
            self.registry.extra_types.iter().cloned(),
        )
    }

    /// Matching options described by this configuration.
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions::default().with_identifier_policy(self.matching.identifier_policy)
    }

    /// Factory over [`registry`](Self::registry) with a fresh cache.
    pub fn type_factory(&self) -> CollectionTypeDescriptionFactory {
        CollectionTypeDescriptionFactory::with_registry(self.registry())
    }
}
