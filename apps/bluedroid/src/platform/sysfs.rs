//! Control lines backed by the platform driver's sysfs attributes.

use bluedroid_core::ControlFs;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

/// One open, one `read(2)` or `write(2)`, one close per call.
///
/// Writes never create or truncate: a sysfs attribute either exists or the
/// driver is not loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsControl;

impl ControlFs for SysfsControl {
    fn write_line(&mut self, path: &Path, data: &[u8]) -> io::Result<usize> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        file.write(data)
    }

    fn read_line(&mut self, path: &Path, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = File::open(path)?;
        file.read(buf)
    }
}
