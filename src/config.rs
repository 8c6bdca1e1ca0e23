//! Engine configuration
//!
//! Defaults can be overridden from the environment or loaded from YAML:
//!
//! ```yaml
//! max_depth: 16
//! file_url_prefix: "/attachment/"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataSetError, DataSetResult};

/// Default nesting limit for traversals over list references
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default URL prefix for file attachments
pub const DEFAULT_FILE_URL_PREFIX: &str = "/attachment/";

/// Configuration shared by the traversal and its exporters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of nested data set lists a traversal may enter
    pub max_depth: usize,
    /// Prefix of the `url` in FILE `valueRef` objects; the parameter id is appended
    pub file_url_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            file_url_prefix: DEFAULT_FILE_URL_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `DATASET_MAX_DEPTH` and `DATASET_FILE_URL_PREFIX`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_depth: std::env::var("DATASET_MAX_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_depth),
            file_url_prefix: std::env::var("DATASET_FILE_URL_PREFIX")
                .unwrap_or(defaults.file_url_prefix),
        }
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> DataSetResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> DataSetResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_file_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_url_prefix = prefix.into();
        self
    }

    fn validate(&self) -> DataSetResult<()> {
        if self.max_depth == 0 {
            return Err(DataSetError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
