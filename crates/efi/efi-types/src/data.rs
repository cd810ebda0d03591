//! Hex byte-list parsing for variable and reset payloads.
//!
//! Payloads are written as two-digit hex tokens separated by spaces and/or
//! commas, e.g. `"01 02 10 12 33"` or `"de,ad,be,ef"`. Runs of separators are
//! treated as one.

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::FormatError;

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split([' ', ',']).filter(|token| !token.is_empty())
}

fn is_byte_token(token: &str) -> bool {
    token.len() == 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses a hex byte list.
///
/// Every token is validated before the output buffer is allocated, so a bad
/// token anywhere in the list yields an error and no partial data.
///
/// # Errors
///
/// Returns [`FormatError::InvalidData`] naming the first token that is not exactly
/// two hex digits.
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, FormatError> {
    let mut count = 0;
    for token in tokens(text) {
        if !is_byte_token(token) {
            return Err(FormatError::InvalidData {
                token: token.to_string(),
            });
        }
        count += 1;
    }

    let mut data = Vec::with_capacity(count);
    for token in tokens(text) {
        let byte = u8::from_str_radix(token, 16).map_err(|_| FormatError::InvalidData {
            token: token.to_string(),
        })?;
        data.push(byte);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_and_commas() {
        assert_eq!(
            parse_hex_bytes("01 02 10 12 33").unwrap(),
            vec![0x01, 0x02, 0x10, 0x12, 0x33]
        );
        assert_eq!(parse_hex_bytes("de,AD, be ,,eF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(parse_hex_bytes("").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_hex_bytes(" , ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn one_bad_token_rejects_everything() {
        assert_eq!(
            parse_hex_bytes("01,2"),
            Err(FormatError::InvalidData { token: "2".into() })
        );
        assert_eq!(
            parse_hex_bytes("01 02 123"),
            Err(FormatError::InvalidData { token: "123".into() })
        );
        assert_eq!(
            parse_hex_bytes("0x 01"),
            Err(FormatError::InvalidData { token: "0x".into() })
        );
        assert_eq!(
            parse_hex_bytes("+1"),
            Err(FormatError::InvalidData { token: "+1".into() })
        );
    }
}
