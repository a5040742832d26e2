//! Evaluation parameters, loadable from TOML.
//!
//! ```toml
//! [selection]
//! edges_threshold = 6
//! n_smallest = 5
//! order = "earliest"
//!
//! [recall]
//! k = 10
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::metrics::DEFAULT_K;
use crate::select::SelectionConfig;

/// Parameters for the recall metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Cap on each node's ground-truth count.
    pub k: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

/// All evaluation parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub selection: SelectionConfig,
    pub recall: RecallConfig,
}

impl EvalConfig {
    /// Parse from a TOML string. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Reject parameters that make every evaluation degenerate.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.selection.n_smallest == 0 {
            return Err(ConfigError::Invalid {
                message: "selection.n_smallest must be at least 1".into(),
            });
        }
        if self.recall.k == 0 {
            return Err(ConfigError::Invalid {
                message: "recall.k must be at least 1".into(),
            });
        }
        Ok(())
    }
}
