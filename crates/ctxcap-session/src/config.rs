use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// How a stop request turns the buffer into a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopOptions {
    /// Merge the captured documents and report conflicts.
    pub merge: bool,
    /// Match keys case-sensitively while merging.
    pub case_sensitive: bool,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            merge: true,
            case_sensitive: false,
        }
    }
}

impl StopOptions {
    /// Report the raw documents only.
    pub fn raw() -> Self {
        Self {
            merge: false,
            ..Default::default()
        }
    }
}

/// Configuration for a capture session and the components driving it.
///
/// ```toml
/// autostart = false
///
/// [stop]
/// merge = true
/// case_sensitive = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Begin capturing as soon as the session owner is created.
    pub autostart: bool,
    /// Options used when a stop request does not carry its own.
    pub stop: StopOptions,
}

impl CaptureConfig {
    /// Parse configuration from TOML text. Missing fields take defaults.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
