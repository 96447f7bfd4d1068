//! # Platform Module
//!
//! Real implementations of the core's I/O seams for embedded Linux.
//!
//! - [`sysfs`] - control lines as plain files
//! - [`hci`] - raw `AF_BLUETOOTH` socket and HCI ioctls
//! - [`services`] - service start/stop through an external command

pub mod hci;
pub mod services;
pub mod sysfs;

pub use hci::{LinuxHci, LinuxHciHandle};
pub use services::CommandServices;
pub use sysfs::SysfsControl;
