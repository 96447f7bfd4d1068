//! Raw HCI management socket.
//!
//! Opens `socket(AF_BLUETOOTH, SOCK_RAW, BTPROTO_HCI)` and drives the device
//! with the `HCIDEVUP`, `HCIDEVDOWN` and `HCIGETDEVINFO` ioctls from
//! `<bluetooth/hci.h>`. The descriptor is an [`OwnedFd`], so it is closed
//! whenever the handle drops.

use bluedroid_core::{BdAddr, DevUp, DeviceInfo, HciHandle, HciSocket};
use libc::{c_int, c_ulong};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tracing::trace;

const BTPROTO_HCI: c_int = 1;

// _IOW('H', 201, int), _IOW('H', 202, int), _IOR('H', 211, int)
const HCIDEVUP: c_ulong = 0x4004_48c9;
const HCIDEVDOWN: c_ulong = 0x4004_48ca;
const HCIGETDEVINFO: c_ulong = 0x8004_48d3;

/// `struct hci_dev_info`
#[repr(C)]
#[allow(dead_code)]
struct RawDevInfo {
    dev_id: u16,
    name: [u8; 8],
    bdaddr: [u8; 6],
    flags: u32,
    dev_type: u8,
    features: [u8; 8],
    pkt_type: u32,
    link_policy: u32,
    link_mode: u32,
    acl_mtu: u16,
    acl_pkts: u16,
    sco_mtu: u16,
    sco_pkts: u16,
    stat: [u32; 10],
}

/// Factory for raw HCI sockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHci;

impl HciSocket for LinuxHci {
    type Handle = LinuxHciHandle;

    fn open(&mut self) -> io::Result<LinuxHciHandle> {
        // SAFETY: plain socket(2); the return value is checked before use.
        let fd = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                BTPROTO_HCI,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        trace!(fd, "hci socket opened");
        // SAFETY: `fd` was just returned by socket(2) and is owned by nothing else.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(LinuxHciHandle { fd })
    }
}

/// An open HCI socket.
#[derive(Debug)]
pub struct LinuxHciHandle {
    fd: OwnedFd,
}

impl LinuxHciHandle {
    fn ioctl_dev(&self, request: c_ulong, dev_id: u16) -> io::Result<()> {
        // SAFETY: these requests take the device id by value.
        let rc = unsafe { libc::ioctl(self.fd.as_raw_fd(), request as _, c_ulong::from(dev_id)) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}

impl HciHandle for LinuxHciHandle {
    fn dev_up(&mut self, dev_id: u16) -> io::Result<DevUp> {
        match self.ioctl_dev(HCIDEVUP, dev_id) {
            Ok(()) => Ok(DevUp::Up),
            Err(e) if e.raw_os_error() == Some(libc::EALREADY) => Ok(DevUp::AlreadyUp),
            Err(e) => Err(e),
        }
    }

    fn dev_down(&mut self, dev_id: u16) -> io::Result<()> {
        self.ioctl_dev(HCIDEVDOWN, dev_id)
    }

    fn dev_info(&mut self, dev_id: u16) -> io::Result<DeviceInfo> {
        // SAFETY: RawDevInfo is plain old data; all-zero is a valid value.
        let mut raw: RawDevInfo = unsafe { std::mem::zeroed() };
        raw.dev_id = dev_id;

        // SAFETY: HCIGETDEVINFO fills a `struct hci_dev_info`, which RawDevInfo mirrors.
        let rc = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                HCIGETDEVINFO as _,
                std::ptr::addr_of_mut!(raw),
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(device_info(&raw))
    }
}

fn device_info(raw: &RawDevInfo) -> DeviceInfo {
    let name_len = raw.name.iter().position(|b| *b == 0).unwrap_or(raw.name.len());
    DeviceInfo {
        name: String::from_utf8_lossy(&raw.name[..name_len]).into_owned(),
        address: BdAddr(raw.bdaddr),
        flags: raw.flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_info_layout_matches_kernel() {
        // sizeof(struct hci_dev_info) on Linux
        assert_eq!(std::mem::size_of::<RawDevInfo>(), 92);
        assert_eq!(std::mem::offset_of!(RawDevInfo, flags), 16);
        assert_eq!(std::mem::offset_of!(RawDevInfo, pkt_type), 32);
    }

    #[test]
    fn converts_name_address_and_flags() {
        // SAFETY: plain old data.
        let mut raw: RawDevInfo = unsafe { std::mem::zeroed() };
        raw.name[..4].copy_from_slice(b"hci0");
        raw.bdaddr = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
        raw.flags = 0b101;

        let info = device_info(&raw);
        assert_eq!(info.name, "hci0");
        assert_eq!(info.address.to_string(), "55:44:33:22:11:00");
        assert!(info.is_up());
    }
}
