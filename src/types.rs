//! Shared types used across the firmware
//!
//! Domain types for the contactless front end and the fixed-width
//! hexadecimal text conversions used on the terminal wire.

use core::fmt;

use heapless::{String, Vec};

use crate::config::{TERMINAL_BUFFER_SIZE, UID_SIZE_MAX};

/// Bounded text buffer used for terminal responses
pub type TextBuffer = String<TERMINAL_BUFFER_SIZE>;

/// Over-the-air protocol family of the active mode
///
/// Governs UID conventions and antenna-load behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TagFamily {
    /// No over-the-air protocol (baseline, reader, sniffer)
    #[default]
    None,
    /// Proximity cards (ISO 14443A)
    ProximityCard,
    /// Vicinity cards (ISO 15693)
    VicinityCard,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TagFamily {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::None => defmt::write!(f, "NONE"),
            Self::ProximityCard => defmt::write!(f, "14443A"),
            Self::VicinityCard => defmt::write!(f, "15693"),
        }
    }
}

/// Card UID with mode-dependent length
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Uid {
    bytes: Vec<u8, UID_SIZE_MAX>,
}

impl Uid {
    /// Create an all-zero UID of the given length
    ///
    /// Lengths beyond the supported maximum are clamped.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        let mut bytes = Vec::new();
        for _ in 0..len.min(UID_SIZE_MAX) {
            let _ = bytes.push(0);
        }
        Self { bytes }
    }

    /// Create a UID from a byte slice, `None` if it does not fit
    #[must_use]
    pub fn from_bytes(slice: &[u8]) -> Option<Self> {
        let bytes = Vec::from_slice(slice).ok()?;
        Some(Self { bytes })
    }

    /// Parse a hexadecimal string that must decode to exactly `len` bytes
    #[must_use]
    pub fn from_hex(text: &str, len: usize) -> Option<Self> {
        let mut buf = [0u8; UID_SIZE_MAX];
        let decoded = parse_hex(text, &mut buf)?;
        if decoded != len {
            return None;
        }
        Self::from_bytes(&buf[..decoded])
    }

    /// UID bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// UID length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check for the zero-length UID
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Replace the first byte, used for family prefix enforcement
    pub fn set_prefix(&mut self, byte: u8) {
        if let Some(first) = self.bytes.first_mut() {
            *first = byte;
        }
    }

    /// Append the UID as upper-case hex to a text buffer
    pub fn write_hex(&self, out: &mut TextBuffer) {
        append_hex(out, &self.bytes);
    }
}

/// Answer-to-request value (two bytes, big-endian on the wire)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Atqa(u16);

impl Atqa {
    /// Create from a raw value
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Parse from exactly four hex digits, big-endian byte order
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let mut buf = [0u8; 2];
        if parse_hex(text, &mut buf)? != 2 {
            return None;
        }
        Some(Self((u16::from(buf[0]) << 8) | u16::from(buf[1])))
    }

    /// Raw value
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Append as four upper-case hex digits, big-endian byte order
    pub fn write_hex(self, out: &mut TextBuffer) {
        append_hex(out, &[(self.0 >> 8) as u8, self.0 as u8]);
    }
}

/// Select-acknowledge value (one byte)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sak(u8);

impl Sak {
    /// Create from a raw value
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Parse from exactly two hex digits
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let mut buf = [0u8; 1];
        if parse_hex(text, &mut buf)? != 1 {
            return None;
        }
        Some(Self(buf[0]))
    }

    /// Raw value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Append as two upper-case hex digits
    pub fn write_hex(self, out: &mut TextBuffer) {
        append_hex(out, &[self.0]);
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid(")?;
        for b in self.bytes.iter() {
            write!(f, "{b:02X}")?;
        }
        write!(f, ")")
    }
}

/// Decode a hexadecimal string into `out`
///
/// The digit count must be even and the decoded bytes must fit.
/// Both upper and lower case are accepted. Returns the byte count.
#[must_use]
pub fn parse_hex(text: &str, out: &mut [u8]) -> Option<usize> {
    let digits = text.as_bytes();
    if digits.is_empty() || digits.len() % 2 != 0 || digits.len() / 2 > out.len() {
        return None;
    }

    for (i, pair) in digits.chunks_exact(2).enumerate() {
        out[i] = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }

    Some(digits.len() / 2)
}

/// Append bytes as upper-case hex, truncating at the buffer bound
pub fn append_hex(out: &mut TextBuffer, bytes: &[u8]) {
    for b in bytes {
        if core::fmt::write(out, format_args!("{b:02X}")).is_err() {
            break;
        }
    }
}

const fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
