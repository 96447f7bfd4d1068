//! # Bluedroid Core
//!
//! Power and lifecycle sequencing for a UART-attached Bluetooth radio.
//!
//! The platform driver exposes the radio's power signals as control line
//! pseudo-files (`bt_enable`, `bt_wake`, optionally `bt_nrst`). Bringing the
//! radio up means driving those lines, starting the firmware attach service,
//! waiting for the kernel HCI device to accept `HCIDEVUP` and then starting
//! the protocol stack service.
//!
//! ## Layers
//!
//! - [`status`] - one control line, one read or write, fixed settling delay
//! - [`power`] - all control lines as one unit, with rollback to off
//! - [`lifecycle`] - enable / disable / is_enabled over power, services and HCI
//! - [`address`] - bdaddr <-> `XX:XX:XX:XX:XX:XX`
//!
//! All I/O goes through the traits in [`status`] and [`hci`]; this crate
//! never touches a file, socket or process itself.

pub mod address;
pub mod config;
pub mod error;
pub mod hci;
pub mod lifecycle;
pub mod power;
pub mod status;

#[cfg(test)]
mod testing;

pub use address::{format_address, parse_address, BdAddr};
pub use config::{ControlLines, ControllerConfig, Timing};
pub use error::{BluedroidError, Result};
pub use hci::{DevUp, DeviceInfo, HciHandle, HciSocket, ServiceControl, HCI_UP};
pub use lifecycle::{BluetoothController, RadioStatus};
pub use power::{Line, PowerSequencer};
pub use status::{ControlFs, Delay, ModuleStatus, ThreadDelay};
