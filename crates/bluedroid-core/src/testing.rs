//! In-memory fakes for the I/O seams.

use crate::address::BdAddr;
use crate::hci::{DevUp, DeviceInfo, HciHandle, HciSocket, ServiceControl};
use crate::status::{ControlFs, Delay};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

// =============================================================================
// CONTROL LINES
// =============================================================================

/// Control lines held in memory, with per-path fault injection.
#[derive(Debug, Default)]
pub struct MemoryLines {
    files: BTreeMap<PathBuf, Vec<u8>>,
    failing_writes: BTreeSet<PathBuf>,
    failing_reads: BTreeSet<PathBuf>,
    short_writes: BTreeSet<PathBuf>,
    writes: Vec<(PathBuf, Vec<u8>)>,
}

impl MemoryLines {
    /// Lines that exist and read `"0\n"`.
    pub fn with_lines<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut lines = Self::default();
        for path in paths {
            lines.set_raw(path.as_ref(), b"0\n");
        }
        lines
    }

    pub fn set_raw(&mut self, path: &Path, data: &[u8]) {
        self.files.insert(path.to_path_buf(), data.to_vec());
    }

    pub fn set(&mut self, path: &Path, on: bool) {
        self.set_raw(path, if on { b"1\n" } else { b"0\n" });
    }

    pub fn fail_writes(&mut self, path: &Path) {
        self.failing_writes.insert(path.to_path_buf());
    }

    pub fn fail_reads(&mut self, path: &Path) {
        self.failing_reads.insert(path.to_path_buf());
    }

    pub fn short_write(&mut self, path: &Path) {
        self.short_writes.insert(path.to_path_buf());
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }

    pub fn is_on(&self, path: &Path) -> bool {
        self.files.get(path).is_some_and(|d| d.first() == Some(&b'1'))
    }

    /// Every write that reached a line, in order, including rejected ones.
    pub fn writes(&self) -> &[(PathBuf, Vec<u8>)] {
        &self.writes
    }
}

impl ControlFs for MemoryLines {
    fn write_line(&mut self, path: &Path, data: &[u8]) -> io::Result<usize> {
        self.writes.push((path.to_path_buf(), data.to_vec()));
        if self.failing_writes.contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let Some(file) = self.files.get_mut(path) else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };
        let accepted = if self.short_writes.contains(path) {
            data.len().min(1)
        } else {
            data.len()
        };
        *file = data[..accepted].to_vec();
        Ok(accepted)
    }

    fn read_line(&mut self, path: &Path, buf: &mut [u8]) -> io::Result<usize> {
        if self.failing_reads.contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let file = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        let n = file.len().min(buf.len());
        buf[..n].copy_from_slice(&file[..n]);
        Ok(n)
    }
}

// =============================================================================
// DELAY
// =============================================================================

/// Records requested sleeps instead of sleeping.
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    sleeps: Vec<Duration>,
}

impl RecordingDelay {
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Delay for RecordingDelay {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

// =============================================================================
// HCI
// =============================================================================

/// Shared bookkeeping between [`FakeHci`] and its handles.
#[derive(Debug, Default)]
pub struct HciState {
    pub fail_open: bool,
    pub opened: usize,
    pub closed: usize,
    pub up_attempts: usize,
    pub down_calls: usize,
    /// Outcomes for successive bring-up attempts; `None` fails with EIO.
    pub up_script: VecDeque<Option<DevUp>>,
    /// Outcome once the script runs out.
    pub up_fallback: Option<DevUp>,
    /// `None` makes device info queries fail.
    pub info: Option<DeviceInfo>,
}

/// Scripted HCI socket.
#[derive(Debug, Clone, Default)]
pub struct FakeHci {
    state: Rc<RefCell<HciState>>,
}

impl FakeHci {
    /// Interface comes up on the first attempt and reports up afterwards.
    pub fn healthy() -> Self {
        let hci = Self::default();
        {
            let mut state = hci.state.borrow_mut();
            state.up_fallback = Some(DevUp::Up);
            state.info = Some(device_info(true));
        }
        hci
    }

    /// Interface never comes up.
    pub fn never_up() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, HciState> {
        self.state.borrow()
    }

    pub fn configure(&self, f: impl FnOnce(&mut HciState)) {
        f(&mut self.state.borrow_mut());
    }
}

pub fn device_info(up: bool) -> DeviceInfo {
    DeviceInfo {
        name: "hci0".to_string(),
        address: BdAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
        flags: if up { 0b101 } else { 0b100 },
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    state: Rc<RefCell<HciState>>,
}

impl HciSocket for FakeHci {
    type Handle = FakeHandle;

    fn open(&mut self) -> io::Result<FakeHandle> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return Err(io::Error::from(io::ErrorKind::AddrNotAvailable));
        }
        state.opened += 1;
        Ok(FakeHandle {
            state: Rc::clone(&self.state),
        })
    }
}

impl HciHandle for FakeHandle {
    fn dev_up(&mut self, _dev_id: u16) -> io::Result<DevUp> {
        let mut state = self.state.borrow_mut();
        state.up_attempts += 1;
        let outcome = match state.up_script.pop_front() {
            Some(scripted) => scripted,
            None => state.up_fallback,
        };
        outcome.ok_or_else(|| io::Error::other("EIO"))
    }

    fn dev_down(&mut self, _dev_id: u16) -> io::Result<()> {
        self.state.borrow_mut().down_calls += 1;
        Ok(())
    }

    fn dev_info(&mut self, _dev_id: u16) -> io::Result<DeviceInfo> {
        self.state
            .borrow()
            .info
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.state.borrow_mut().closed += 1;
    }
}

// =============================================================================
// SERVICES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Stop,
}

/// Records service triggers, failing the ones it is told to.
#[derive(Debug, Default)]
pub struct RecordingServices {
    pub calls: Vec<(Trigger, String)>,
    pub fail_start: BTreeSet<String>,
    pub fail_stop: BTreeSet<String>,
}

impl RecordingServices {
    pub fn failing_start(service: &str) -> Self {
        let mut services = Self::default();
        services.fail_start.insert(service.to_string());
        services
    }

    pub fn failing_stop(service: &str) -> Self {
        let mut services = Self::default();
        services.fail_stop.insert(service.to_string());
        services
    }

    pub fn calls(&self) -> Vec<(Trigger, &str)> {
        self.calls.iter().map(|(t, s)| (*t, s.as_str())).collect()
    }
}

impl ServiceControl for RecordingServices {
    fn start(&mut self, service: &str) -> io::Result<()> {
        self.calls.push((Trigger::Start, service.to_string()));
        if self.fail_start.contains(service) {
            return Err(io::Error::other("property_set failed"));
        }
        Ok(())
    }

    fn stop(&mut self, service: &str) -> io::Result<()> {
        self.calls.push((Trigger::Stop, service.to_string()));
        if self.fail_stop.contains(service) {
            return Err(io::Error::other("property_set failed"));
        }
        Ok(())
    }
}
