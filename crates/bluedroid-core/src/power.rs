//! # Power Sequencer
//!
//! Drives the radio's control lines as one unit.
//!
//! Lines are always visited in the same order: reset (only when the board
//! wires it), enable, wake. Power is "on" only when every line reads on.
//! Any failure part way through forces the lines already touched back to
//! off before the error is returned; errors during that unwind are logged
//! and dropped.

use crate::config::ControlLines;
use crate::error::{BluedroidError, Result};
use crate::status::{ControlFs, Delay, ModuleStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The physical signal a control line drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    Reset,
    Enable,
    Wake,
}

impl Line {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Enable => "enable",
            Self::Wake => "wake",
        }
    }
}

/// Sets and checks power across all configured control lines.
#[derive(Debug)]
pub struct PowerSequencer<F, D> {
    status: ModuleStatus<F, D>,
    lines: Vec<(Line, PathBuf)>,
}

impl<F: ControlFs, D: Delay> PowerSequencer<F, D> {
    pub fn new(status: ModuleStatus<F, D>, config: &ControlLines) -> Self {
        let mut lines = Vec::with_capacity(3);
        if config.reset_line {
            lines.push((Line::Reset, config.reset_path.clone()));
        }
        lines.push((Line::Enable, config.enable_path.clone()));
        lines.push((Line::Wake, config.wake_path.clone()));
        Self { status, lines }
    }

    /// Write `on` to every line in order.
    ///
    /// On the first failure the attempted lines (including the failing one)
    /// are forced off in reverse order and `PowerSequence` is returned.
    pub fn set_power(&mut self, on: bool) -> Result<bool> {
        for (idx, (line, path)) in self.lines.iter().enumerate() {
            if let Err(e) = self.status.write_status(path, on) {
                warn!(line = line.name(), on, "power sequence failed, forcing lines off");
                force_off(&mut self.status, &self.lines[..=idx]);
                return Err(BluedroidError::PowerSequence {
                    line: line.name(),
                    source: Box::new(e),
                });
            }
        }

        info!(on, "bluetooth power set");
        Ok(on)
    }

    /// Read every line in order.
    ///
    /// Returns `true` only when all lines are on. A mixed or all-off reading
    /// forces every line off and returns `false`. An unknown reading forces
    /// off the lines read before it and fails with `PowerQuery`.
    pub fn check_power(&mut self) -> Result<bool> {
        let mut all_on = true;
        for (idx, (line, path)) in self.lines.iter().enumerate() {
            match self.status.read_status(path) {
                Ok(on) => all_on &= on,
                Err(e) => {
                    warn!(line = line.name(), "power query failed, forcing lines off");
                    force_off(&mut self.status, &self.lines[..idx]);
                    return Err(BluedroidError::PowerQuery {
                        line: line.name(),
                        source: Box::new(e),
                    });
                }
            }
        }

        if !all_on {
            info!("bluetooth power not fully on, forcing lines off");
            force_off(&mut self.status, &self.lines);
        }
        Ok(all_on)
    }

    /// Configured lines in sequencing order.
    pub fn lines(&self) -> impl Iterator<Item = (Line, &Path)> {
        self.lines.iter().map(|(l, p)| (*l, p.as_path()))
    }

    pub fn status(&self) -> &ModuleStatus<F, D> {
        &self.status
    }
}

/// Best-effort: write off to `lines` in reverse order, ignoring failures.
fn force_off<F: ControlFs, D: Delay>(status: &mut ModuleStatus<F, D>, lines: &[(Line, PathBuf)]) {
    for (line, path) in lines.iter().rev() {
        if let Err(e) = status.write_status(path, false) {
            warn!(line = line.name(), error = %e, "failed to force line off");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
