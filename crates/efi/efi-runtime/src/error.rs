//! Errors raised while talking to the runtime services device.

use efi_types::{EfiStatus, NameError};
use nix::errno::Errno;

/// Error returned by a runtime service call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ioctl failed before the driver produced a firmware status.
    #[error("{request} ioctl failed")]
    Ioctl {
        /// Request name, e.g. `GET_VARIABLE`.
        request: &'static str,
        /// errno reported by the kernel.
        #[source]
        source: Errno,
    },
    /// The ioctl succeeded but the driver never wrote a status.
    #[error("{request} returned without a firmware status")]
    NoStatus {
        /// Request name.
        request: &'static str,
    },
    /// Firmware answered with a non-success status.
    #[error("firmware returned {0}")]
    Status(EfiStatus),
    /// The enumeration buffer cannot hold the next variable name.
    #[error("variable name buffer too small, {required} bytes required")]
    BufferTooSmall {
        /// Buffer size in bytes the driver asked for.
        required: usize,
    },
    /// An enumeration buffer size that is odd or smaller than one code unit.
    #[error("invalid variable name buffer size {0}, must be even and at least 2 bytes")]
    InvalidBufferSize(usize),
    /// A wire name without a terminating zero unit.
    #[error("variable name is not null-terminated")]
    UnterminatedName,
    /// A variable name could not be encoded.
    #[error(transparent)]
    Name(#[from] NameError),
}

impl Error {
    /// The firmware status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<EfiStatus> {
        match self {
            Self::Status(status) => Some(*status),
            Self::BufferTooSmall { .. } => Some(EfiStatus::BUFFER_TOO_SMALL),
            _ => None,
        }
    }
}
