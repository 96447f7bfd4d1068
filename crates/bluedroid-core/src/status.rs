//! # Module Status Accessor
//!
//! Single-attempt read/write of one control line.
//!
//! A control line is a pseudo-file holding `"1\n"` (on) or `"0\n"` (off).
//! Both operations wait a fixed settling interval before opening the line.
//! Reads have three outcomes: on, off, or unknown (open failed or nothing
//! read), and unknown is reported as [`BluedroidError::UnknownStatus`].

use crate::error::{BluedroidError, Result};
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Size of the buffer used for one status read.
pub const STATUS_BUF_LEN: usize = 10;

// =============================================================================
// SEAMS
// =============================================================================

/// Raw access to control line files.
///
/// Each call opens the line, performs exactly one read or write and closes it.
pub trait ControlFs {
    /// Write `data` in a single call. Returns the number of bytes accepted.
    fn write_line(&mut self, path: &Path, data: &[u8]) -> io::Result<usize>;

    /// Read once into `buf`. Returns the number of bytes read.
    fn read_line(&mut self, path: &Path, buf: &mut [u8]) -> io::Result<usize>;
}

/// Blocking wait, swapped out in tests.
pub trait Delay {
    fn sleep(&mut self, duration: Duration);
}

/// [`Delay`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

// =============================================================================
// MODULE STATUS
// =============================================================================

/// Reads and writes control line status with a settling delay.
#[derive(Debug)]
pub struct ModuleStatus<F, D> {
    fs: F,
    delay: D,
    settle: Duration,
}

impl<F: ControlFs, D: Delay> ModuleStatus<F, D> {
    pub fn new(fs: F, delay: D, settle: Duration) -> Self {
        Self { fs, delay, settle }
    }

    /// Write the status record for `on` to the line.
    ///
    /// Returns the written state when the whole record was accepted.
    pub fn write_status(&mut self, path: &Path, on: bool) -> Result<bool> {
        self.delay.sleep(self.settle);

        let record: &[u8] = if on { b"1\n" } else { b"0\n" };
        let written = self.fs.write_line(path, record).map_err(|e| {
            error!(path = %path.display(), error = %e, "cannot access control line");
            BluedroidError::io(path, e)
        })?;

        if written != record.len() {
            error!(path = %path.display(), on, written, "control line write failed");
            return Err(BluedroidError::ShortWrite {
                path: path.to_path_buf(),
                written,
                expected: record.len(),
            });
        }

        info!(path = %path.display(), on, "control line written");
        Ok(on)
    }

    /// Read the line's status. A leading `'1'` is on, any other content is off.
    pub fn read_status(&mut self, path: &Path) -> Result<bool> {
        self.delay.sleep(self.settle);

        let mut buf = [0u8; STATUS_BUF_LEN];
        let read = match self.fs.read_line(path, &mut buf) {
            Ok(n) => n,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot access control line");
                return Err(BluedroidError::UnknownStatus {
                    path: path.to_path_buf(),
                });
            }
        };

        if read == 0 {
            info!(path = %path.display(), "control line status unknown");
            return Err(BluedroidError::UnknownStatus {
                path: path.to_path_buf(),
            });
        }

        let on = buf[0] == b'1';
        info!(path = %path.display(), status = u8::from(on), "control line read");
        Ok(on)
    }

    /// Borrow the underlying control line access.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Borrow the settling delay.
    pub fn delay(&self) -> &D {
        &self.delay
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{MemoryLines, RecordingDelay};
    use std::path::PathBuf;

    fn accessor(lines: MemoryLines) -> ModuleStatus<MemoryLines, RecordingDelay> {
        ModuleStatus::new(lines, RecordingDelay::default(), Duration::from_millis(500))
    }

    #[test]
    fn write_then_read_reports_on() {
        let path = PathBuf::from("bt_enable");
        let mut status = accessor(MemoryLines::with_lines(&[&path]));

        assert!(status.write_status(&path, true).unwrap());
        assert_eq!(status.fs().contents(&path), Some(b"1\n".to_vec()));
        assert!(status.read_status(&path).unwrap());
    }

    #[test]
    fn write_off_stores_zero_record() {
        let path = PathBuf::from("bt_wake");
        let mut status = accessor(MemoryLines::with_lines(&[&path]));

        assert!(!status.write_status(&path, false).unwrap());
        assert_eq!(status.fs().contents(&path), Some(b"0\n".to_vec()));
        assert!(!status.read_status(&path).unwrap());
    }

    #[test]
    fn every_access_waits_settle_interval() {
        let path = PathBuf::from("bt_enable");
        let mut status = accessor(MemoryLines::with_lines(&[&path]));

        status.write_status(&path, true).unwrap();
        status.read_status(&path).unwrap();

        assert_eq!(
            status.delay().sleeps(),
            &[Duration::from_millis(500), Duration::from_millis(500)]
        );
    }

    #[test]
    fn missing_line_write_is_io_error() {
        let mut status = accessor(MemoryLines::default());
        let err = status.write_status(Path::new("nope"), true).unwrap_err();
        assert!(matches!(err, BluedroidError::Io { .. }));
    }

    #[test]
    fn short_write_is_rejected() {
        let path = PathBuf::from("bt_enable");
        let mut lines = MemoryLines::with_lines(&[&path]);
        lines.short_write(&path);
        let mut status = accessor(lines);

        let err = status.write_status(&path, true).unwrap_err();
        assert!(matches!(
            err,
            BluedroidError::ShortWrite {
                written: 1,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn missing_line_read_is_unknown_not_off() {
        let mut status = accessor(MemoryLines::default());
        let err = status.read_status(Path::new("nope")).unwrap_err();
        assert!(matches!(err, BluedroidError::UnknownStatus { .. }));
    }

    #[test]
    fn empty_line_read_is_unknown() {
        let path = PathBuf::from("bt_wake");
        let mut lines = MemoryLines::default();
        lines.set_raw(&path, b"");
        let mut status = accessor(lines);

        assert!(matches!(
            status.read_status(&path),
            Err(BluedroidError::UnknownStatus { .. })
        ));
    }

    #[test]
    fn anything_but_leading_one_reads_off() {
        let path = PathBuf::from("bt_wake");
        let mut lines = MemoryLines::default();
        lines.set_raw(&path, b"2\n");
        let mut status = accessor(lines);

        assert!(!status.read_status(&path).unwrap());
    }

    #[test]
    fn only_first_byte_matters() {
        let path = PathBuf::from("bt_wake");
        let mut lines = MemoryLines::default();
        lines.set_raw(&path, b"10");
        let mut status = accessor(lines);

        assert!(status.read_status(&path).unwrap());
    }
}
