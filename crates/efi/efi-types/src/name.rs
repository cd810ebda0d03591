//! Variable name codec.
//!
//! Names cross the device boundary as null-terminated UCS-2. The codec here is
//! intentionally narrow: each input byte becomes one code unit and each code unit
//! is truncated back to its low byte on the way out. This is what the runtime
//! driver and the firmware variable names in practice expect, and it is not a
//! UTF-16 transcoder.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::NameError;

/// Size in bytes of one UCS-2 code unit.
pub const UNIT_SIZE: usize = core::mem::size_of::<u16>();

/// Encodes `name` as a freshly allocated null-terminated UCS-2 buffer.
#[must_use]
pub fn encode_name(name: &str) -> Vec<u16> {
    let mut wire = Vec::with_capacity(name.len() + 1);
    wire.extend(name.bytes().map(u16::from));
    wire.push(0);
    wire
}

/// Encodes `name` into `buf`, writing the terminator at index `name.len()`.
///
/// Returns the number of bytes written, terminator included.
///
/// # Errors
///
/// Returns [`NameError::BufferTooSmall`] if `buf` holds fewer than
/// `name.len() + 1` code units. Nothing is written in that case.
pub fn encode_name_into(name: &str, buf: &mut [u16]) -> Result<usize, NameError> {
    let len = name.len();
    if buf.len() < len + 1 {
        return Err(NameError::BufferTooSmall {
            required: (len + 1) * UNIT_SIZE,
            capacity: buf.len() * UNIT_SIZE,
        });
    }
    for (unit, byte) in buf.iter_mut().zip(name.bytes()) {
        *unit = u16::from(byte);
    }
    buf[len] = 0;
    Ok((len + 1) * UNIT_SIZE)
}

/// Decodes a name the driver reported as `byte_len` bytes long, terminator included.
///
/// The result holds `byte_len / 2 - 1` characters, each the low byte of its code
/// unit read as Latin-1. A `byte_len` larger than `buf` is clamped to the buffer.
#[must_use]
pub fn decode_name(buf: &[u16], byte_len: usize) -> String {
    let units = (byte_len / UNIT_SIZE).min(buf.len()).saturating_sub(1);
    buf[..units]
        .iter()
        .map(|&unit| char::from(unit.to_le_bytes()[0]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_terminator() {
        assert_eq!(encode_name("Boot"), vec![0x42, 0x6f, 0x6f, 0x74, 0]);
        assert_eq!(encode_name(""), vec![0]);
    }

    #[test]
    fn encode_into_checks_capacity() {
        let mut buf = [0xffff_u16; 4];
        assert_eq!(
            encode_name_into("Test", &mut buf),
            Err(NameError::BufferTooSmall {
                required: 10,
                capacity: 8
            })
        );
        assert_eq!(buf, [0xffff; 4]);

        let mut buf = [0xffff_u16; 8];
        assert_eq!(encode_name_into("Test", &mut buf), Ok(10));
        assert_eq!(&buf[..5], &[0x54, 0x65, 0x73, 0x74, 0]);
        assert_eq!(buf[5], 0xffff);
    }

    #[test]
    fn ascii_names_round_trip() {
        let names = ["", "A", "Timeout", "BootOrder", "Boot0001", "db", "SecureBoot"];
        for name in names {
            for spare in [0, 1, 17] {
                let mut buf = vec![0u16; name.len() + 1 + spare];
                let written = encode_name_into(name, &mut buf).unwrap();
                assert_eq!(decode_name(&buf, written), name);
            }
        }
    }

    #[test]
    fn decode_truncates_to_low_byte() {
        assert_eq!(decode_name(&[0x0141, 0x0042, 0], 6), "AB");
        assert_eq!(decode_name(&[0x00e9, 0], 4), "\u{e9}");
    }

    #[test]
    fn decode_clamps_bad_lengths() {
        let buf = [0x61, 0x62, 0];
        assert_eq!(decode_name(&buf, 0), "");
        assert_eq!(decode_name(&buf, 1), "");
        assert_eq!(decode_name(&buf, 2), "");
        assert_eq!(decode_name(&buf, 4096), "ab");
        assert_eq!(decode_name(&[], 8), "");
    }
}
