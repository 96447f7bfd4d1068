//! # Address Codec
//!
//! Conversion between the 6-byte Bluetooth device address and its colon-hex
//! text form.
//!
//! The bytes are stored little-endian (as on the HCI wire) and printed
//! most-significant first, so `[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]` reads
//! `55:44:33:22:11:00`.
//!
//! [`parse_address`] is deliberately lenient and never fails: it scans hex
//! numbers the way `strtoul` does and skips exactly one delimiter after each,
//! without checking the delimiter or the total length. Malformed input gives
//! partially garbage bytes. This is a known hardening gap kept for
//! compatibility; callers that need validation use [`BdAddr::from_str`].

use crate::error::BluedroidError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A Bluetooth device address in wire (little-endian) byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    /// `00:00:00:00:00:00`
    pub const ANY: Self = Self([0; 6]);

    #[must_use]
    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }
}

/// Format wire-order bytes as `XX:XX:XX:XX:XX:XX`, last byte first.
#[must_use]
pub fn format_address(bytes: [u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        bytes[5], bytes[4], bytes[3], bytes[2], bytes[1], bytes[0]
    )
}

/// Parse a colon-hex string into wire-order bytes without validation.
#[must_use]
pub fn parse_address(s: &str) -> [u8; 6] {
    let input = s.as_bytes();
    let mut out = [0u8; 6];
    let mut pos = 0;

    for slot in out.iter_mut().rev() {
        let (value, end) = scan_hex(input, pos);
        *slot = value;
        // one delimiter, whatever it is
        pos = (end + 1).min(input.len());
    }

    out
}

/// `strtoul(.., 16)` truncated to a byte. Returns the value and the index
/// just past the number, or `start` when no digits were found.
fn scan_hex(input: &[u8], start: usize) -> (u8, usize) {
    let mut i = start;
    while i < input.len() && input[i].is_ascii_whitespace() {
        i += 1;
    }

    let mut negative = false;
    if i < input.len() && (input[i] == b'+' || input[i] == b'-') {
        negative = input[i] == b'-';
        i += 1;
    }

    if input.get(i) == Some(&b'0')
        && matches!(input.get(i + 1), Some(b'x' | b'X'))
        && input.get(i + 2).is_some_and(u8::is_ascii_hexdigit)
    {
        i += 2;
    }

    let digits_start = i;
    let mut value: u64 = 0;
    let mut overflow = false;
    while let Some(digit) = input.get(i).and_then(|c| (*c as char).to_digit(16)) {
        match value.checked_mul(16).and_then(|v| v.checked_add(u64::from(digit))) {
            Some(v) => value = v,
            None => overflow = true,
        }
        i += 1;
    }

    if i == digits_start {
        return (0, start);
    }

    let value = if overflow {
        u64::MAX
    } else if negative {
        value.wrapping_neg()
    } else {
        value
    };
    (value as u8, i)
}

// =============================================================================
// TRAIT IMPLS
// =============================================================================

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_address(self.0))
    }
}

impl From<[u8; 6]> for BdAddr {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

/// Strict parsing: exactly six two-digit hex pairs separated by `:`.
impl FromStr for BdAddr {
    type Err = BluedroidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BluedroidError::InvalidAddress {
            input: s.to_string(),
        };

        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for slot in bytes.iter_mut().rev() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(bytes))
    }
}

impl Serialize for BdAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BdAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================
