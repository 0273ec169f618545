//! Storage configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RelmapError, RelmapResult};

/// Default per-function argument limit of the embedded engine.
pub const DEFAULT_MAX_FUNCTION_ARGS: usize = 127;

/// Storage configuration.
///
/// # Example
///
/// ```rust
/// use relmap_common::config::StorageConfig;
///
/// let config = StorageConfig::default();
/// assert_eq!(config.filename, ":memory:");
/// assert!(config.strict_bindings);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage location label (`:memory:` for in-memory storage).
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Largest fixed arity accepted when registering a function.
    #[serde(default = "default_max_function_args")]
    pub max_function_args: usize,

    /// Reject registries that bind the same lookup key twice.
    ///
    /// When disabled, duplicates are logged and lookups resolve to the
    /// first binding in declaration order.
    #[serde(default = "default_strict_bindings")]
    pub strict_bindings: bool,

    /// Emit a trace event for every callback invocation.
    #[serde(default)]
    pub trace_invocations: bool,
}

fn default_filename() -> String {
    ":memory:".to_string()
}

fn default_max_function_args() -> usize {
    DEFAULT_MAX_FUNCTION_ARGS
}

fn default_strict_bindings() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            max_function_args: default_max_function_args(),
            strict_bindings: default_strict_bindings(),
            trace_invocations: false,
        }
    }
}

impl StorageConfig {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn from_file(path: &Path) -> RelmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> RelmapResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem operation fails.
    pub fn save(&self, path: &Path) -> RelmapResult<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> RelmapResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first offending field.
    pub fn validate(&self) -> RelmapResult<()> {
        if self.max_function_args == 0 {
            return Err(RelmapError::InvalidConfig {
                message: "max_function_args must be at least 1".to_string(),
            });
        }
        if self.filename.is_empty() {
            return Err(RelmapError::InvalidConfig {
                message: "filename must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Returns true if the storage lives only in memory.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.filename == ":memory:"
    }

    /// Creates a builder for configuration.
    #[must_use]
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::new()
    }
}

/// Builder for storage configuration.
#[derive(Debug, Default)]
pub struct StorageConfigBuilder {
    config: StorageConfig,
}

impl StorageConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage location label.
    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.config.filename = filename.into();
        self
    }

    /// Sets the per-function argument limit.
    #[must_use]
    pub fn max_function_args(mut self, max: usize) -> Self {
        self.config.max_function_args = max;
        self
    }

    /// Enables or disables duplicate-binding rejection.
    #[must_use]
    pub fn strict_bindings(mut self, strict: bool) -> Self {
        self.config.strict_bindings = strict;
        self
    }

    /// Enables or disables per-invocation tracing.
    #[must_use]
    pub fn trace_invocations(mut self, enabled: bool) -> Self {
        self.config.trace_invocations = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> StorageConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.filename, ":memory:");
        assert_eq!(config.max_function_args, 127);
        assert!(config.strict_bindings);
        assert!(!config.trace_invocations);
        assert!(config.is_in_memory());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = StorageConfig::builder()
            .filename("custom_function.sqlite")
            .max_function_args(8)
            .strict_bindings(false)
            .trace_invocations(true)
            .build();

        assert_eq!(config.filename, "custom_function.sqlite");
        assert_eq!(config.max_function_args, 8);
        assert!(!config.strict_bindings);
        assert!(config.trace_invocations);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StorageConfig::from_toml_str("trace_invocations = true\n").unwrap();
        assert!(config.trace_invocations);
        assert_eq!(config.max_function_args, 127);
        assert_eq!(config.filename, ":memory:");
    }

    #[test]
    fn test_validation() {
        let err = StorageConfig::from_toml_str("max_function_args = 0\n").unwrap_err();
        assert!(matches!(err, RelmapError::InvalidConfig { .. }));

        let err = StorageConfig::from_toml_str("max_function_args = \"many\"\n").unwrap_err();
        assert!(matches!(err, RelmapError::ConfigParse { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("relmap.toml");

        let config = StorageConfig::builder()
            .filename("app.db")
            .strict_bindings(false)
            .build();
        config.save(&path).unwrap();

        let loaded = StorageConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = StorageConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RelmapError::Io { .. }));
    }
}
