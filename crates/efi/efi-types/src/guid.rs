//! Vendor GUIDs and their text codec.
//!
//! GUIDs travel to the runtime driver as a 16-byte structure laid out as
//! `{a: u32, b: u16, c: u16, d: u16, e: [u8; 6]}`. The text form is
//! `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` with every group written most
//! significant digit first, optionally wrapped in a single pair of braces.
//!
//! The fourth group is the odd one out: on the wire it is a pair of bytes in
//! text order, not a little-endian `u16`. [`EfiGuid::d`] therefore holds the
//! group's value byte-swapped, so that its in-memory bytes are what the driver
//! expects. [`EfiGuid::parse`] applies the swap and the formatters undo it.

use core::fmt;
use core::str::FromStr;

use crate::error::FormatError;

/// Length of the canonical text form without braces.
pub const GUID_TEXT_LEN: usize = 36;

/// Byte offsets of the four hyphens in the canonical text form.
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// A vendor GUID in the runtime driver's layout.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EfiGuid {
    /// First group, 32 bits.
    pub a: u32,
    /// Second group, 16 bits.
    pub b: u16,
    /// Third group, 16 bits.
    pub c: u16,
    /// Fourth group, byte-swapped relative to the text form.
    pub d: u16,
    /// Last group, six bytes in text order.
    pub e: [u8; 6],
}

#[expect(
    clippy::unreadable_literal,
    reason = "GUID bytes are inherently opaque"
)]
impl EfiGuid {
    /// The all-zero GUID.
    pub const NULL: Self = Self::new(0, 0, 0, 0, [0; 6]);

    /// `EFI_GLOBAL_VARIABLE`, the namespace of architecturally defined variables
    /// such as `BootOrder` and `Timeout`.
    pub const GLOBAL_VARIABLE: Self = Self::from_text_fields(
        0x8be4df61,
        0x93ca,
        0x11d2,
        0xaa0d,
        [0x00, 0xe0, 0x98, 0x03, 0x2b, 0x8c],
    );

    /// Creates a GUID from raw wire fields. `d` must already be byte-swapped.
    #[must_use]
    pub const fn new(a: u32, b: u16, c: u16, d: u16, e: [u8; 6]) -> Self {
        Self { a, b, c, d, e }
    }

    /// Creates a GUID from the five group values as they read in text.
    #[must_use]
    pub const fn from_text_fields(a: u32, b: u16, c: u16, d: u16, e: [u8; 6]) -> Self {
        Self::new(a, b, c, d.swap_bytes(), e)
    }

    /// Value of the fourth group as it reads in text.
    #[must_use]
    pub const fn d_text(&self) -> u16 {
        self.d.swap_bytes()
    }

    /// Parses the canonical text form, with or without one pair of braces.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidGuid`] if the length, the hyphen positions or
    /// any digit is wrong.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "each group holds exactly as many digits as its field"
    )]
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let bytes = text.as_bytes();
        let inner = match bytes {
            [b'{', inner @ .., b'}'] => inner,
            _ => bytes,
        };
        if inner.len() != GUID_TEXT_LEN {
            return Err(FormatError::InvalidGuid);
        }

        for (i, &byte) in inner.iter().enumerate() {
            let valid = if HYPHENS.contains(&i) {
                byte == b'-'
            } else {
                byte.is_ascii_hexdigit()
            };
            if !valid {
                return Err(FormatError::InvalidGuid);
            }
        }

        let mut e = [0u8; 6];
        for (i, byte) in e.iter_mut().enumerate() {
            let start = 24 + 2 * i;
            *byte = hex_value(&inner[start..start + 2]) as u8;
        }

        Ok(Self::from_text_fields(
            hex_value(&inner[0..8]) as u32,
            hex_value(&inner[9..13]) as u16,
            hex_value(&inner[14..18]) as u16,
            hex_value(&inner[19..23]) as u16,
            e,
        ))
    }

    /// Returns the 16 bytes exactly as they are laid out in memory.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.a.to_ne_bytes());
        out[4..6].copy_from_slice(&self.b.to_ne_bytes());
        out[6..8].copy_from_slice(&self.c.to_ne_bytes());
        out[8..10].copy_from_slice(&self.d.to_ne_bytes());
        out[10..16].copy_from_slice(&self.e);
        out
    }
}

/// Folds a run of already-validated ASCII hex digits into a number.
///
/// Callers pass at most eight digits, so the result always fits the target field.
fn hex_value(digits: &[u8]) -> u64 {
    digits.iter().fold(0, |acc, &digit| {
        let nibble = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            _ => 0,
        };
        (acc << 4) | u64::from(nibble)
    })
}

impl FromStr for EfiGuid {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for EfiGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EfiGuid({self})")
    }
}

impl fmt::Display for EfiGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.a,
            self.b,
            self.c,
            self.d_text(),
            self.e[0],
            self.e[1],
            self.e[2],
            self.e[3],
            self.e[4],
            self.e[5],
        )
    }
}

impl fmt::UpperHex for EfiGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:04X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.a,
            self.b,
            self.c,
            self.d_text(),
            self.e[0],
            self.e[1],
            self.e[2],
            self.e[3],
            self.e[4],
            self.e[5],
        )
    }
}

// ── Compile-time layout assertions ──────────────────────────────────

const _: () = assert!(core::mem::size_of::<EfiGuid>() == 16);
