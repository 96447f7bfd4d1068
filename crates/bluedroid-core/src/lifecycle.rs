//! # Lifecycle Controller
//!
//! Brings the radio from Disabled to Enabled and back.
//!
//! ```text
//!   Disabled ──enable──► Enabling ──HCI up──► Enabled
//!      ▲                    │                    │
//!      └──── power off ◄────┘ (failure)          │
//!      └─────────────────── disable ◄────────────┘
//! ```
//!
//! Enabling powers the lines, starts the attach service, then polls the HCI
//! device until it accepts `HCIDEVUP` (bounded attempts) and finally starts
//! the protocol stack. Every HCI handle is scoped to a single call and is
//! closed when it drops, on success and error paths alike.

use crate::config::{ControllerConfig, Timing};
use crate::error::{BluedroidError, Result};
use crate::hci::{DevUp, DeviceInfo, HciHandle, HciSocket, ServiceControl};
use crate::power::PowerSequencer;
use crate::status::{ControlFs, Delay, ModuleStatus};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Snapshot of the radio state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioStatus {
    /// All control lines read on.
    pub powered: bool,
    /// Power is on and the kernel reports the interface up.
    pub enabled: bool,
    /// Kernel device info, when power is on and the query succeeded.
    pub device: Option<DeviceInfo>,
}

/// Orchestrates power, services and the HCI interface.
#[derive(Debug)]
pub struct BluetoothController<F, D, H, S> {
    power: PowerSequencer<F, D>,
    hci: H,
    services: S,
    delay: D,
    dev_id: u16,
    attach_service: String,
    stack_service: String,
    timing: Timing,
}

impl<F, D, H, S> BluetoothController<F, D, H, S>
where
    F: ControlFs,
    D: Delay + Clone,
    H: HciSocket,
    S: ServiceControl,
{
    pub fn new(fs: F, delay: D, hci: H, services: S, config: &ControllerConfig) -> Self {
        let status = ModuleStatus::new(fs, delay.clone(), config.timing.settle());
        Self {
            power: PowerSequencer::new(status, &config.lines),
            hci,
            services,
            delay,
            dev_id: config.dev_id,
            attach_service: config.attach_service.clone(),
            stack_service: config.stack_service.clone(),
            timing: config.timing,
        }
    }

    /// Power up, attach firmware, bring the interface up and start the stack.
    pub fn enable(&mut self) -> Result<()> {
        debug!("enable");

        self.power
            .set_power(true)
            .map_err(|e| BluedroidError::PowerOn(Box::new(e)))?;

        info!(service = %self.attach_service, "starting service");
        if let Err(e) = self.services.start(&self.attach_service) {
            error!(service = %self.attach_service, error = %e, "failed to start service");
            self.power_off_quietly();
            return Err(BluedroidError::ServiceStart {
                service: self.attach_service.clone(),
                source: e,
            });
        }
        self.delay.sleep(self.timing.attach_settle());

        // held until return so the handle closes on every path below
        let Some(_handle) = self.bring_up()? else {
            error!(
                attempts = self.timing.poll_attempts,
                "timeout waiting for HCI device to come up"
            );
            if let Err(e) = self.services.stop(&self.attach_service) {
                error!(service = %self.attach_service, error = %e, "error stopping service");
            }
            self.power_off_quietly();
            return Err(BluedroidError::Timeout {
                attempts: self.timing.poll_attempts,
            });
        };

        info!(service = %self.stack_service, "starting service");
        if let Err(e) = self.services.start(&self.stack_service) {
            error!(service = %self.stack_service, error = %e, "failed to start service");
            self.power_off_quietly();
            return Err(BluedroidError::ServiceStart {
                service: self.stack_service.clone(),
                source: e,
            });
        }

        Ok(())
    }

    /// Stop the stack, take the interface down, stop attach and cut power.
    pub fn disable(&mut self) -> Result<()> {
        debug!("disable");

        info!(service = %self.stack_service, "stopping service");
        self.services.stop(&self.stack_service).map_err(|e| {
            error!(service = %self.stack_service, error = %e, "error stopping service");
            BluedroidError::ServiceStop {
                service: self.stack_service.clone(),
                source: e,
            }
        })?;
        self.delay.sleep(self.timing.stop_settle());

        let mut handle = self.open_handle()?;
        if let Err(e) = handle.dev_down(self.dev_id) {
            debug!(dev_id = self.dev_id, error = %e, "HCIDEVDOWN failed");
        }

        info!(service = %self.attach_service, "stopping service");
        self.services.stop(&self.attach_service).map_err(|e| {
            error!(service = %self.attach_service, error = %e, "error stopping service");
            BluedroidError::ServiceStop {
                service: self.attach_service.clone(),
                source: e,
            }
        })?;

        self.power
            .set_power(false)
            .map_err(|e| BluedroidError::PowerOff(Box::new(e)))?;

        Ok(())
    }

    /// Power is on and the kernel reports the interface up.
    pub fn is_enabled(&mut self) -> Result<bool> {
        debug!("is_enabled");
        Ok(self.status()?.enabled)
    }

    /// Power state plus kernel device info, gated on power like `is_enabled`.
    pub fn status(&mut self) -> Result<RadioStatus> {
        let powered = match self.power.check_power() {
            Ok(on) => on,
            Err(e) => {
                warn!(error = %e, "power check failed, reporting disabled");
                false
            }
        };
        if !powered {
            return Ok(RadioStatus {
                powered,
                enabled: false,
                device: None,
            });
        }

        let mut handle = self.open_handle()?;
        let device = match handle.dev_info(self.dev_id) {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(dev_id = self.dev_id, error = %e, "HCIGETDEVINFO failed");
                None
            }
        };

        Ok(RadioStatus {
            powered,
            enabled: device.as_ref().is_some_and(DeviceInfo::is_up),
            device,
        })
    }

    pub fn power(&self) -> &PowerSequencer<F, D> {
        &self.power
    }

    pub fn hci(&self) -> &H {
        &self.hci
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Poll `HCIDEVUP` until it succeeds. `None` when the budget runs out.
    fn bring_up(&mut self) -> Result<Option<H::Handle>> {
        for attempt in 1..=self.timing.poll_attempts {
            let mut handle = self.open_handle()?;
            match handle.dev_up(self.dev_id) {
                Ok(DevUp::Up) => {
                    info!(attempt, dev_id = self.dev_id, "HCI device up");
                    return Ok(Some(handle));
                }
                Ok(DevUp::AlreadyUp) => {
                    warn!(dev_id = self.dev_id, "HCI device already up, unexpectedly");
                    return Ok(Some(handle));
                }
                Err(e) => {
                    debug!(attempt, dev_id = self.dev_id, error = %e, "HCI device not up yet");
                }
            }
            drop(handle);
            self.delay.sleep(self.timing.poll_interval());
        }
        Ok(None)
    }

    fn open_handle(&mut self) -> Result<H::Handle> {
        self.hci.open().map_err(|e| {
            error!(error = %e, "failed to create bluetooth hci socket");
            BluedroidError::DeviceOpen(e)
        })
    }

    fn power_off_quietly(&mut self) {
        if let Err(e) = self.power.set_power(false) {
            warn!(error = %e, "failed to power off during unwind");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
