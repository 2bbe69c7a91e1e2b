//! Compiler configuration.
//!
//! Configuration is optional; [`CompilerConfig::default`] reproduces the
//! behaviour expected by the builder API. Files are TOML:
//!
//! ```toml
//! entity_var = "n"
//! default_limit = 100
//!
//! [array_fields]
//! known = ["tags", "aliases"]
//! infer_plurals = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field names treated as multi-valued without any registration.
pub const DEFAULT_ARRAY_FIELDS: &[&str] = &["participants", "keywords", "tags", "sources"];

/// Rules used to decide whether an unregistered field holds a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayFieldRules {
    /// Field names always treated as collections.
    pub known: Vec<String>,
    /// Treat names ending in `s` (but not `ss`) as collections.
    ///
    /// Known to misfire on scalar names such as `status`; register the field
    /// explicitly or disable this when that matters.
    pub infer_plurals: bool,
}

impl Default for ArrayFieldRules {
    fn default() -> Self {
        Self {
            known: DEFAULT_ARRAY_FIELDS.iter().map(|s| (*s).to_owned()).collect(),
            infer_plurals: true,
        }
    }
}

impl ArrayFieldRules {
    /// Rules that only honour the known-name list.
    pub fn strict() -> Self {
        Self {
            infer_plurals: false,
            ..Self::default()
        }
    }

    /// Applies the rules to a field name.
    pub fn matches(&self, name: &str) -> bool {
        if self.known.iter().any(|known| known == name) {
            return true;
        }
        self.infer_plurals && name.ends_with('s') && !name.ends_with("ss")
    }
}

/// Settings shared by the adapter and query builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Variable bound to the queried entity in emitted text.
    pub entity_var: String,
    /// Collection-detection rules for unregistered fields.
    pub array_fields: ArrayFieldRules,
    /// Limit applied to `find` when the caller sets none.
    pub default_limit: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            entity_var: "e".to_owned(),
            array_fields: ArrayFieldRules::default(),
            default_limit: None,
        }
    }
}

impl CompilerConfig {
    /// Configuration that disables the plural-name heuristic.
    pub fn strict() -> Self {
        Self {
            array_fields: ArrayFieldRules::strict(),
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: CompilerConfig =
            toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that the entity variable is a plain identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.entity_var) {
            return Err(ConfigError::InvalidEntityVar {
                value: self.entity_var.clone(),
            });
        }
        Ok(())
    }
}

/// Returns `true` when `ident` can be emitted unquoted as a variable, label,
/// or property name.
pub fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// The entity variable is not a plain identifier.
    #[error("entity_var '{value}' must be a plain identifier")]
    InvalidEntityVar {
        /// Rejected value.
        value: String,
    },
    /// The global subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
