//! UEFI status codes and the status catalog.
//!
//! This module defines [`EfiStatus`], a newtype around the 64-bit status value the
//! runtime driver writes back for every call. Status codes fall into three groups:
//!
//! - **Success** (`0`): the operation completed successfully.
//! - **Warnings** (`1..ERROR_BIT`): the operation completed with a non-fatal condition.
//! - **Errors** (`ERROR_BIT..`): the operation failed.
//!
//! Known codes are described by a single static table, [`CATALOG`], which maps each
//! code to its mnemonic and description. Codes outside the table are still valid
//! [`EfiStatus`] values; they simply have no catalog entry.

use core::fmt;

/// Bit 63, set on every error code.
pub const ERROR_BIT: u64 = 1 << 63;

/// A UEFI status code as reported by the runtime driver.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EfiStatus(pub u64);

/// A catalog entry describing one known status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    /// The status value.
    pub status: EfiStatus,
    /// The UEFI mnemonic, e.g. `EFI_NOT_FOUND`.
    pub mnemonic: &'static str,
    /// A one-sentence description.
    pub description: &'static str,
}

impl EfiStatus {
    // ── Success ──────────────────────────────────────────────────────

    /// The operation completed successfully.
    pub const SUCCESS: Self = Self(0);

    // ── Warning codes ────────────────────────────────────────────────

    /// The string contained characters that could not be rendered and were skipped.
    pub const WARN_UNKNOWN_GLYPH: Self = Self(1);
    /// The handle was closed, but the file was not deleted.
    pub const WARN_DELETE_FAILURE: Self = Self(2);
    /// The handle was closed, but the data to the file was not flushed properly.
    pub const WARN_WRITE_FAILURE: Self = Self(3);
    /// The resulting buffer was too small, and the data was truncated.
    pub const WARN_BUFFER_TOO_SMALL: Self = Self(4);
    /// The data has not been updated within the timeframe set by local policy.
    pub const WARN_STALE_DATA: Self = Self(5);
    /// The resulting buffer contains UEFI-compliant file system.
    pub const WARN_FILE_SYSTEM: Self = Self(6);
    /// The operation will be processed across a system reset.
    pub const WARN_RESET_REQUIRED: Self = Self(7);

    // ── Error codes ──────────────────────────────────────────────────

    /// The image failed to load.
    pub const LOAD_ERROR: Self = Self(ERROR_BIT | 1);
    /// A parameter was incorrect.
    pub const INVALID_PARAMETER: Self = Self(ERROR_BIT | 2);
    /// The operation is not supported.
    pub const UNSUPPORTED: Self = Self(ERROR_BIT | 3);
    /// The buffer was not the proper size for the request.
    pub const BAD_BUFFER_SIZE: Self = Self(ERROR_BIT | 4);
    /// The buffer is not large enough to hold the requested data.
    pub const BUFFER_TOO_SMALL: Self = Self(ERROR_BIT | 5);
    /// There is no data pending upon return.
    pub const NOT_READY: Self = Self(ERROR_BIT | 6);
    /// The physical device reported an error while attempting the operation.
    pub const DEVICE_ERROR: Self = Self(ERROR_BIT | 7);
    /// The device cannot be written to.
    pub const WRITE_PROTECTED: Self = Self(ERROR_BIT | 8);
    /// A resource has run out.
    pub const OUT_OF_RESOURCES: Self = Self(ERROR_BIT | 9);
    /// An inconsistency was detected on the file system.
    pub const VOLUME_CORRUPTED: Self = Self(ERROR_BIT | 0x0a);
    /// There is no more space on the file system.
    pub const VOLUME_FULL: Self = Self(ERROR_BIT | 0x0b);
    /// The device does not contain any medium to perform the operation.
    pub const NO_MEDIA: Self = Self(ERROR_BIT | 0x0c);
    /// The medium in the device has changed since the last access.
    pub const MEDIA_CHANGED: Self = Self(ERROR_BIT | 0x0d);
    /// The item was not found.
    pub const NOT_FOUND: Self = Self(ERROR_BIT | 0x0e);
    /// Access was denied.
    pub const ACCESS_DENIED: Self = Self(ERROR_BIT | 0x0f);
    /// The server was not found or did not respond to the request.
    pub const NO_RESPONSE: Self = Self(ERROR_BIT | 0x10);
    /// A mapping to a device does not exist.
    pub const NO_MAPPING: Self = Self(ERROR_BIT | 0x11);
    /// The timeout time expired.
    pub const TIMEOUT: Self = Self(ERROR_BIT | 0x12);
    /// The protocol has not been started.
    pub const NOT_STARTED: Self = Self(ERROR_BIT | 0x13);
    /// The protocol has already been started.
    pub const ALREADY_STARTED: Self = Self(ERROR_BIT | 0x14);
    /// The operation was aborted.
    pub const ABORTED: Self = Self(ERROR_BIT | 0x15);
    /// An ICMP error occurred during the network operation.
    pub const ICMP_ERROR: Self = Self(ERROR_BIT | 0x16);
    /// A TFTP error occurred during the network operation.
    pub const TFTP_ERROR: Self = Self(ERROR_BIT | 0x17);
    /// A protocol error occurred during the network operation.
    pub const PROTOCOL_ERROR: Self = Self(ERROR_BIT | 0x18);
    /// The function encountered an internal version that was incompatible.
    pub const INCOMPATIBLE_VERSION: Self = Self(ERROR_BIT | 0x19);
    /// The function was not performed due to a security violation.
    pub const SECURITY_VIOLATION: Self = Self(ERROR_BIT | 0x1a);
    /// A CRC error was detected.
    pub const CRC_ERROR: Self = Self(ERROR_BIT | 0x1b);
    /// Beginning or end of media was reached.
    pub const END_OF_MEDIA: Self = Self(ERROR_BIT | 0x1c);
    /// The end of the file was reached.
    pub const END_OF_FILE: Self = Self(ERROR_BIT | 0x1f);
    /// The language specified was invalid.
    pub const INVALID_LANGUAGE: Self = Self(ERROR_BIT | 0x20);
    /// The security status of the data is unknown or compromised.
    pub const COMPROMISED_DATA: Self = Self(ERROR_BIT | 0x21);
    /// There is an address conflict during the IP address configuration.
    pub const IP_ADDRESS_CONFLICT: Self = Self(ERROR_BIT | 0x22);
    /// An HTTP error occurred during the network operation.
    pub const HTTP_ERROR: Self = Self(ERROR_BIT | 0x23);

    /// Returns `true` if this status code indicates success.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this status code indicates an error (bit 63 set).
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 & ERROR_BIT != 0
    }

    /// Returns `true` if this status code indicates a warning (non-zero, bit 63 clear).
    #[inline]
    #[must_use]
    pub const fn is_warning(self) -> bool {
        !self.is_success() && !self.is_error()
    }

    /// Converts this status code to a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` for anything other than [`EfiStatus::SUCCESS`]. Warnings
    /// count as failures here: every caller in this workspace treats the driver's
    /// status as authoritative and only success as success.
    #[inline]
    pub const fn to_result(self) -> Result<(), Self> {
        if self.is_success() { Ok(()) } else { Err(self) }
    }

    /// Looks up this code in the status catalog.
    #[must_use]
    pub fn info(self) -> Option<&'static StatusInfo> {
        CATALOG.iter().find(|info| info.status == self)
    }

    /// Returns the mnemonic for the status code, if known.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        self.info().map(|info| info.mnemonic)
    }

    /// Returns the description for the status code, if known.
    #[must_use]
    pub fn description(self) -> Option<&'static str> {
        self.info().map(|info| info.description)
    }

    /// Returns a displayable one-line status report.
    ///
    /// Known codes render as `Return status: <MNEMONIC>. <description>`, unknown
    /// codes as their raw hex value.
    #[must_use]
    pub const fn report(self) -> StatusReport {
        StatusReport(self)
    }
}

impl From<u64> for EfiStatus {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for EfiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "EfiStatus({name})"),
            None => write!(f, "EfiStatus({:#x})", self.0),
        }
    }
}

impl fmt::Display for EfiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_error() => {
                write!(f, "Unknown error ({:#x})", self.0 & !ERROR_BIT)
            }
            None => write!(f, "Unknown warning ({})", self.0),
        }
    }
}

/// One-line report for a status code, see [`EfiStatus::report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport(EfiStatus);

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.info() {
            Some(info) => write!(f, "Return status: {}. {}", info.mnemonic, info.description),
            None => write!(
                f,
                "Cannot find the return status information, value = {:#x}.",
                self.0.0
            ),
        }
    }
}

const fn entry(status: EfiStatus, mnemonic: &'static str, description: &'static str) -> StatusInfo {
    StatusInfo {
        status,
        mnemonic,
        description,
    }
}

/// Every status code with a known mnemonic, in ascending code order within each group.
pub static CATALOG: [StatusInfo; 41] = [
    entry(EfiStatus::SUCCESS, "EFI_SUCCESS", "The operation completed successfully."),
    entry(
        EfiStatus::WARN_UNKNOWN_GLYPH,
        "EFI_WARN_UNKNOWN_GLYPH",
        "The string contained one or more characters that the device could not render and were skipped.",
    ),
    entry(
        EfiStatus::WARN_DELETE_FAILURE,
        "EFI_WARN_DELETE_FAILURE",
        "The handle was closed, but the file was not deleted.",
    ),
    entry(
        EfiStatus::WARN_WRITE_FAILURE,
        "EFI_WARN_WRITE_FAILURE",
        "The handle was closed, but the data to the file was not flushed properly.",
    ),
    entry(
        EfiStatus::WARN_BUFFER_TOO_SMALL,
        "EFI_WARN_BUFFER_TOO_SMALL",
        "The resulting buffer was too small, and the data was truncated to the buffer size.",
    ),
    entry(
        EfiStatus::WARN_STALE_DATA,
        "EFI_WARN_STALE_DATA",
        "The data has not been updated within the timeframe set by local policy for this type of data.",
    ),
    entry(
        EfiStatus::WARN_FILE_SYSTEM,
        "EFI_WARN_FILE_SYSTEM",
        "The resulting buffer contains UEFI-compliant file system.",
    ),
    entry(
        EfiStatus::WARN_RESET_REQUIRED,
        "EFI_WARN_RESET_REQUIRED",
        "The operation will be processed across a system reset.",
    ),
    entry(EfiStatus::LOAD_ERROR, "EFI_LOAD_ERROR", "The image failed to load."),
    entry(EfiStatus::INVALID_PARAMETER, "EFI_INVALID_PARAMETER", "A parameter was incorrect."),
    entry(EfiStatus::UNSUPPORTED, "EFI_UNSUPPORTED", "The operation is not supported."),
    entry(
        EfiStatus::BAD_BUFFER_SIZE,
        "EFI_BAD_BUFFER_SIZE",
        "The buffer was not the proper size for the request.",
    ),
    entry(
        EfiStatus::BUFFER_TOO_SMALL,
        "EFI_BUFFER_TOO_SMALL",
        "The buffer is not large enough to hold the requested data. The required buffer size is returned in the appropriate parameter when this error occurs.",
    ),
    entry(EfiStatus::NOT_READY, "EFI_NOT_READY", "There is no data pending upon return."),
    entry(
        EfiStatus::DEVICE_ERROR,
        "EFI_DEVICE_ERROR",
        "The physical device reported an error while attempting the operation.",
    ),
    entry(EfiStatus::WRITE_PROTECTED, "EFI_WRITE_PROTECTED", "The device cannot be written to."),
    entry(EfiStatus::OUT_OF_RESOURCES, "EFI_OUT_OF_RESOURCES", "A resource has run out."),
    entry(
        EfiStatus::VOLUME_CORRUPTED,
        "EFI_VOLUME_CORRUPTED",
        "An inconsistency was detected on the file system causing the operation to fail.",
    ),
    entry(EfiStatus::VOLUME_FULL, "EFI_VOLUME_FULL", "There is no more space on the file system."),
    entry(
        EfiStatus::NO_MEDIA,
        "EFI_NO_MEDIA",
        "The device does not contain any medium to perform the operation.",
    ),
    entry(
        EfiStatus::MEDIA_CHANGED,
        "EFI_MEDIA_CHANGED",
        "The medium in the device has changed since the last access.",
    ),
    entry(EfiStatus::NOT_FOUND, "EFI_NOT_FOUND", "The item was not found."),
    entry(EfiStatus::ACCESS_DENIED, "EFI_ACCESS_DENIED", "Access was denied."),
    entry(
        EfiStatus::NO_RESPONSE,
        "EFI_NO_RESPONSE",
        "The server was not found or did not respond to the request.",
    ),
    entry(EfiStatus::NO_MAPPING, "EFI_NO_MAPPING", "A mapping to a device does not exist."),
    entry(EfiStatus::TIMEOUT, "EFI_TIMEOUT", "The timeout time expired."),
    entry(EfiStatus::NOT_STARTED, "EFI_NOT_STARTED", "The protocol has not been started."),
    entry(
        EfiStatus::ALREADY_STARTED,
        "EFI_ALREADY_STARTED",
        "The protocol has already been started.",
    ),
    entry(EfiStatus::ABORTED, "EFI_ABORTED", "The operation was aborted."),
    entry(
        EfiStatus::ICMP_ERROR,
        "EFI_ICMP_ERROR",
        "An ICMP error occurred during the network operation.",
    ),
    entry(
        EfiStatus::TFTP_ERROR,
        "EFI_TFTP_ERROR",
        "A TFTP error occurred during the network operation.",
    ),
    entry(
        EfiStatus::PROTOCOL_ERROR,
        "EFI_PROTOCOL_ERROR",
        "A protocol error occurred during the network operation.",
    ),
    entry(
        EfiStatus::INCOMPATIBLE_VERSION,
        "EFI_INCOMPATIBLE_VERSION",
        "The function encountered an internal version that was incompatible with a version requested by the caller.",
    ),
    entry(
        EfiStatus::SECURITY_VIOLATION,
        "EFI_SECURITY_VIOLATION",
        "The function was not performed due to a security violation.",
    ),
    entry(EfiStatus::CRC_ERROR, "EFI_CRC_ERROR", "A CRC error was detected."),
    entry(EfiStatus::END_OF_MEDIA, "EFI_END_OF_MEDIA", "Beginning or end of media was reached."),
    entry(EfiStatus::END_OF_FILE, "EFI_END_OF_FILE", "The end of the file was reached."),
    entry(
        EfiStatus::INVALID_LANGUAGE,
        "EFI_INVALID_LANGUAGE",
        "The language specified was invalid.",
    ),
    entry(
        EfiStatus::COMPROMISED_DATA,
        "EFI_COMPROMISED_DATA",
        "The security status of the data is unknown or compromised and the data must be updated or replaced to restore a valid security status.",
    ),
    entry(
        EfiStatus::IP_ADDRESS_CONFLICT,
        "EFI_IP_ADDRESS_CONFLICT",
        "There is an address conflict address allocation.",
    ),
    entry(
        EfiStatus::HTTP_ERROR,
        "EFI_HTTP_ERROR",
        "A HTTP error occurred during the network operation.",
    ),
];

// ── Compile-time layout assertions ──────────────────────────────────

const _: () = assert!(core::mem::size_of::<EfiStatus>() == 8);
