//! Error types for text parsing and name encoding.

/// Malformed text supplied for a GUID, data list, time or reset value.
///
/// These are always raised before any driver call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The GUID is not in `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
    #[error("invalid GUID, expected xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx")]
    InvalidGuid,
    /// A data token is not exactly two hex digits.
    #[error("invalid data token {token:?}, expected two hex digits per byte")]
    InvalidData {
        /// The offending token.
        token: alloc::string::String,
    },
    /// The time specification is malformed or a field is out of range.
    #[error("invalid time, expected Year:Month:Day:Hour:Minute:Second:Pad1:Nanosecond:TimeZone:Daylight:Pad2 ({reason})")]
    InvalidTime {
        /// What was wrong with it.
        reason: &'static str,
    },
    /// The wakeup specification is malformed.
    #[error("invalid wakeup setting, expected <true|false>[,<time>] ({reason})")]
    InvalidWakeup {
        /// What was wrong with it.
        reason: &'static str,
    },
    /// The reset type is neither a known name nor a number.
    #[error("invalid reset type, expected cold, warm, shutdown, platform or 0-3")]
    InvalidResetType,
}

/// Failure to encode a variable name into a caller-provided buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The buffer cannot hold the name plus its terminator.
    #[error("name needs {required} bytes but the buffer holds {capacity}")]
    BufferTooSmall {
        /// Bytes needed, terminator included.
        required: usize,
        /// Bytes available.
        capacity: usize,
    },
}
