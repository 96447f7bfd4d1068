//! # Config Module
//!
//! Construction-time settings for the power sequencer and lifecycle controller.
//!
//! Every field has a default matching the ODROID BCM4329 board layout, so an
//! empty JSON object deserializes into a working configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Directory exposed by the platform driver holding the control lines.
pub const DEFAULT_SYSFS_DIR: &str = "/sys/devices/platform/odroid-sysfs";

/// Service that uploads firmware and attaches the UART to the HCI layer.
pub const DEFAULT_ATTACH_SERVICE: &str = "hciattach";

/// Service running the Bluetooth protocol stack.
pub const DEFAULT_STACK_SERVICE: &str = "bluetoothd";

fn default_enable_path() -> PathBuf {
    PathBuf::from(DEFAULT_SYSFS_DIR).join("bt_enable")
}

fn default_wake_path() -> PathBuf {
    PathBuf::from(DEFAULT_SYSFS_DIR).join("bt_wake")
}

fn default_reset_path() -> PathBuf {
    PathBuf::from(DEFAULT_SYSFS_DIR).join("bt_nrst")
}

fn default_attach_service() -> String {
    DEFAULT_ATTACH_SERVICE.to_string()
}

fn default_stack_service() -> String {
    DEFAULT_STACK_SERVICE.to_string()
}

// =============================================================================
// CONTROL LINES
// =============================================================================

/// Paths of the power control lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLines {
    #[serde(default = "default_enable_path")]
    pub enable_path: PathBuf,
    #[serde(default = "default_wake_path")]
    pub wake_path: PathBuf,
    #[serde(default = "default_reset_path")]
    pub reset_path: PathBuf,
    /// Whether the board wires the reset line (BCM4329 module variant).
    #[serde(default)]
    pub reset_line: bool,
}

impl Default for ControlLines {
    fn default() -> Self {
        Self {
            enable_path: default_enable_path(),
            wake_path: default_wake_path(),
            reset_path: default_reset_path(),
            reset_line: false,
        }
    }
}

impl ControlLines {
    /// Place all three lines under one directory, keeping the standard names.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>, reset_line: bool) -> Self {
        let dir = dir.into();
        Self {
            enable_path: dir.join("bt_enable"),
            wake_path: dir.join("bt_wake"),
            reset_path: dir.join("bt_nrst"),
            reset_line,
        }
    }
}

// =============================================================================
// TIMING
// =============================================================================

/// Fixed waits used as an informal rendezvous with hardware and services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Wait before every control line open.
    pub settle_ms: u64,
    /// Wait after triggering the attach service.
    pub attach_settle_ms: u64,
    /// Wait between failed interface bring-up attempts.
    pub poll_interval_ms: u64,
    /// Number of interface bring-up attempts.
    pub poll_attempts: u32,
    /// Wait after stopping the stack service.
    pub stop_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            attach_settle_ms: 1000,
            poll_interval_ms: 1000,
            poll_attempts: 20,
            stop_settle_ms: 500,
        }
    }
}

impl Timing {
    /// Zero delays with the default poll budget.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            settle_ms: 0,
            attach_settle_ms: 0,
            poll_interval_ms: 0,
            stop_settle_ms: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[must_use]
    pub fn attach_settle(&self) -> Duration {
        Duration::from_millis(self.attach_settle_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn stop_settle(&self) -> Duration {
        Duration::from_millis(self.stop_settle_ms)
    }
}

// =============================================================================
// CONTROLLER CONFIG
// =============================================================================

/// Everything the lifecycle controller needs at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub lines: ControlLines,
    /// HCI device index (`hci0` -> 0).
    #[serde(default)]
    pub dev_id: u16,
    #[serde(default = "default_attach_service")]
    pub attach_service: String,
    #[serde(default = "default_stack_service")]
    pub stack_service: String,
    #[serde(default)]
    pub timing: Timing,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            lines: ControlLines::default(),
            dev_id: 0,
            attach_service: default_attach_service(),
            stack_service: default_stack_service(),
            timing: Timing::default(),
        }
    }
}
