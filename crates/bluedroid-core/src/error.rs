//! # Error Module
//!
//! One error type for every failure the sequencing logic can report.
//!
//! Low-level control line failures (`Io`, `ShortWrite`, `UnknownStatus`) are
//! wrapped by the power sequencer into `PowerSequence` / `PowerQuery`, which
//! the lifecycle controller in turn wraps into `PowerOn` / `PowerOff`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, BluedroidError>;

/// Errors from control lines, the power sequencer and the lifecycle controller.
#[derive(Debug, Error)]
pub enum BluedroidError {
    /// A control line could not be opened or written.
    #[error("control line {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A control line accepted fewer bytes than the status record needs.
    #[error("control line {}: short write ({written} of {expected} bytes)", path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    /// A control line could not be opened for reading or returned nothing.
    #[error("control line {}: status unknown", path.display())]
    UnknownStatus { path: PathBuf },

    /// Setting power failed part way; attempted lines were forced off.
    #[error("power sequence failed on {line} line: {source}")]
    PowerSequence {
        line: &'static str,
        #[source]
        source: Box<BluedroidError>,
    },

    /// Querying power failed part way; examined lines were forced off.
    #[error("power query failed on {line} line: {source}")]
    PowerQuery {
        line: &'static str,
        #[source]
        source: Box<BluedroidError>,
    },

    /// The start trigger for an external service failed.
    #[error("failed to start {service}: {source}")]
    ServiceStart {
        service: String,
        #[source]
        source: io::Error,
    },

    /// The stop trigger for an external service failed.
    #[error("failed to stop {service}: {source}")]
    ServiceStop {
        service: String,
        #[source]
        source: io::Error,
    },

    /// The HCI device never came up within the poll budget.
    #[error("timed out waiting for HCI device after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// Powering the radio on failed.
    #[error("power on failed: {0}")]
    PowerOn(#[source] Box<BluedroidError>),

    /// Powering the radio off failed.
    #[error("power off failed: {0}")]
    PowerOff(#[source] Box<BluedroidError>),

    /// The kernel HCI handle could not be opened.
    #[error("failed to open HCI socket: {0}")]
    DeviceOpen(#[source] io::Error),

    /// Strict address parsing rejected the input.
    #[error("invalid bluetooth address {input:?}")]
    InvalidAddress { input: String },
}

impl BluedroidError {
    /// Wrap a control line I/O failure.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
