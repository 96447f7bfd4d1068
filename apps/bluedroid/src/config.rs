//! # App Configuration
//!
//! JSON configuration for the binary: the core controller settings plus the
//! service trigger backend. Every field is optional.
//!
//! ```json
//! {
//!   "controller": { "lines": { "reset_line": true }, "timing": { "poll_attempts": 30 } },
//!   "services": { "kind": "systemd" }
//! }
//! ```

use bluedroid_core::{BluedroidError, ControllerConfig};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Radio(#[from] BluedroidError),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid address byte {0:?}: expected one hex byte")]
    InvalidByte(String),
}

// =============================================================================
// SERVICE BACKEND
// =============================================================================

fn default_setprop() -> String {
    "setprop".to_string()
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

/// How start/stop triggers reach the init system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ServiceBackend {
    /// Android-style init: `setprop ctl.start <service>`.
    Property {
        #[serde(default = "default_setprop")]
        program: String,
    },
    /// systemd: `systemctl start <unit>`.
    Systemd {
        #[serde(default = "default_systemctl")]
        program: String,
    },
}

impl Default for ServiceBackend {
    fn default() -> Self {
        Self::Property {
            program: default_setprop(),
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub services: ServiceBackend,
}

/// Load the configuration file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
