//! # HCI Seam
//!
//! Traits over the kernel's Bluetooth management interface and the service
//! trigger mechanism. Implementations live in the application crate.

use crate::address::BdAddr;
use serde::{Deserialize, Serialize};
use std::io;

/// Bit index of the "interface up" flag in `hci_dev_info.flags`.
pub const HCI_UP: u32 = 0;

/// Outcome of a successful bring-up request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevUp {
    /// The interface went up.
    Up,
    /// The kernel reported `EALREADY`: the interface was already up.
    AlreadyUp,
}

/// Kernel device information relevant to the up/down state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub address: BdAddr,
    pub flags: u32,
}

impl DeviceInfo {
    /// Whether the `HCI_UP` bit is set.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.flags & (1 << (HCI_UP & 31)) != 0
    }
}

/// An open handle on the HCI management interface.
///
/// Dropping the handle closes it.
pub trait HciHandle {
    fn dev_up(&mut self, dev_id: u16) -> io::Result<DevUp>;
    fn dev_down(&mut self, dev_id: u16) -> io::Result<()>;
    fn dev_info(&mut self, dev_id: u16) -> io::Result<DeviceInfo>;
}

/// Opens HCI handles.
pub trait HciSocket {
    type Handle: HciHandle;

    fn open(&mut self) -> io::Result<Self::Handle>;
}

/// Start/stop triggers for external services.
///
/// Triggers are fire-and-forget: success means the request was accepted,
/// not that the service reached its target state.
pub trait ServiceControl {
    fn start(&mut self, service: &str) -> io::Result<()>;
    fn stop(&mut self, service: &str) -> io::Result<()>;
}
