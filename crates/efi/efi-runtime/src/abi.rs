//! Kernel ABI of the runtime services device.
//!
//! Every request takes a pointer to one of the packed argument structs below.
//! Pointer fields reference caller memory that the driver reads from or writes
//! to with `copy_{from,to}_user`; `status` always points at a `u64` the driver
//! fills with the firmware return value. The layouts mirror the kernel's
//! `__packed` definitions field for field.

use std::ffi::{c_int, c_ulong, c_void};

use efi_types::{EfiGuid, EfiTime, EfiTimeCapabilities};

/// ioctl type byte shared by all runtime service requests.
pub const IOCTL_MAGIC: u8 = b'p';

/// Value the status out-field is pre-filled with before each request.
///
/// The driver overwrites it as soon as the firmware call returns. Seeing it
/// unchanged after a failed ioctl means the request never reached firmware.
pub const STATUS_UNSET: u64 = u64::MAX;

/// `EFI_RUNTIME_GET_VARIABLE` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct GetVariableArgs {
    /// Null-terminated UCS-2 name.
    pub variable_name: *const u16,
    /// Vendor GUID.
    pub vendor_guid: *const EfiGuid,
    /// Out: attributes of the stored variable.
    pub attributes: *mut u32,
    /// In: capacity of `data`. Out: size of the stored data.
    pub data_size: *mut c_ulong,
    /// Out: variable data.
    pub data: *mut c_void,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_SET_VARIABLE` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct SetVariableArgs {
    /// Null-terminated UCS-2 name.
    pub variable_name: *const u16,
    /// Vendor GUID.
    pub vendor_guid: *const EfiGuid,
    /// Attributes to store.
    pub attributes: u32,
    /// Length of `data` in bytes; zero deletes the variable.
    pub data_size: c_ulong,
    /// Data to store.
    pub data: *const c_void,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_GET_NEXTVARIABLENAME` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct GetNextVariableNameArgs {
    /// In: capacity of `variable_name` in bytes. Out: size of the next name.
    pub variable_name_size: *mut c_ulong,
    /// In: previous name. Out: next name.
    pub variable_name: *mut u16,
    /// In: previous GUID. Out: next GUID.
    pub vendor_guid: *mut EfiGuid,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_QUERY_VARIABLEINFO` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct QueryVariableInfoArgs {
    /// Attributes of the storage class being queried.
    pub attributes: u32,
    /// Out: total storage.
    pub maximum_variable_storage_size: *mut u64,
    /// Out: free storage.
    pub remaining_variable_storage_size: *mut u64,
    /// Out: largest single variable.
    pub maximum_variable_size: *mut u64,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_GET_TIME` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct GetTimeArgs {
    /// Out: current time.
    pub time: *mut EfiTime,
    /// Out: clock capabilities.
    pub capabilities: *mut EfiTimeCapabilities,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_SET_TIME` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct SetTimeArgs {
    /// Time to program.
    pub time: *const EfiTime,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_GET_WAKETIME` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct GetWakeupTimeArgs {
    /// Out: alarm armed (0 or 1).
    pub enabled: *mut u8,
    /// Out: alarm fired (0 or 1).
    pub pending: *mut u8,
    /// Out: programmed alarm time.
    pub time: *mut EfiTime,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_SET_WAKETIME` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct SetWakeupTimeArgs {
    /// Arm (1) or disarm (0).
    pub enabled: u8,
    /// Alarm time, null when disarming.
    pub time: *const EfiTime,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_GET_NEXTHIGHMONOTONICCOUNT` argument.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct GetNextHighMonotonicCountArgs {
    /// Out: high 32 bits of the platform monotonic counter.
    pub high_count: *mut u32,
    /// Out: firmware status.
    pub status: *mut u64,
}

/// `EFI_RUNTIME_RESET_SYSTEM` argument.
///
/// The only request without a status out-field: a successful reset does not
/// return.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct ResetSystemArgs {
    /// `ResetType` discriminant.
    pub reset_type: c_int,
    /// Status reported to firmware as the reset reason.
    pub status: u64,
    /// Length of `data` in bytes.
    pub data_size: c_ulong,
    /// Optional reset data, null when `data_size` is zero.
    pub data: *const u16,
}

// ── Request wrappers ────────────────────────────────────────────────

nix::ioctl_readwrite!(
    /// `EFI_RUNTIME_GET_VARIABLE`, `_IOWR('p', 0x01, ...)`.
    get_variable,
    IOCTL_MAGIC,
    0x01,
    GetVariableArgs
);
nix::ioctl_write_ptr!(
    /// `EFI_RUNTIME_SET_VARIABLE`, `_IOW('p', 0x02, ...)`.
    set_variable,
    IOCTL_MAGIC,
    0x02,
    SetVariableArgs
);
nix::ioctl_read!(
    /// `EFI_RUNTIME_GET_TIME`, `_IOR('p', 0x03, ...)`.
    get_time,
    IOCTL_MAGIC,
    0x03,
    GetTimeArgs
);
nix::ioctl_write_ptr!(
    /// `EFI_RUNTIME_SET_TIME`, `_IOW('p', 0x04, ...)`.
    set_time,
    IOCTL_MAGIC,
    0x04,
    SetTimeArgs
);
nix::ioctl_read!(
    /// `EFI_RUNTIME_GET_WAKETIME`, `_IOR('p', 0x05, ...)`.
    get_wakeup_time,
    IOCTL_MAGIC,
    0x05,
    GetWakeupTimeArgs
);
nix::ioctl_write_ptr!(
    /// `EFI_RUNTIME_SET_WAKETIME`, `_IOW('p', 0x06, ...)`.
    set_wakeup_time,
    IOCTL_MAGIC,
    0x06,
    SetWakeupTimeArgs
);
nix::ioctl_readwrite!(
    /// `EFI_RUNTIME_GET_NEXTVARIABLENAME`, `_IOWR('p', 0x07, ...)`.
    get_next_variable_name,
    IOCTL_MAGIC,
    0x07,
    GetNextVariableNameArgs
);
nix::ioctl_read!(
    /// `EFI_RUNTIME_QUERY_VARIABLEINFO`, `_IOR('p', 0x08, ...)`.
    query_variable_info,
    IOCTL_MAGIC,
    0x08,
    QueryVariableInfoArgs
);
nix::ioctl_read!(
    /// `EFI_RUNTIME_GET_NEXTHIGHMONOTONICCOUNT`, `_IOR('p', 0x09, ...)`.
    get_next_high_monotonic_count,
    IOCTL_MAGIC,
    0x09,
    GetNextHighMonotonicCountArgs
);
nix::ioctl_write_ptr!(
    /// `EFI_RUNTIME_RESET_SYSTEM`, `_IOW('p', 0x0B, ...)`.
    reset_system,
    IOCTL_MAGIC,
    0x0b,
    ResetSystemArgs
);

/// Converts a buffer length to the driver's `unsigned long`.
///
/// On every Linux target `c_ulong` and `usize` have the same width; the
/// saturation only exists to keep the conversion total.
#[must_use]
pub fn to_ulong(len: usize) -> c_ulong {
    c_ulong::try_from(len).unwrap_or(c_ulong::MAX)
}

/// Converts a size reported by the driver back to `usize`.
#[must_use]
pub fn from_ulong(len: c_ulong) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}

// ── Compile-time layout assertions ──────────────────────────────────

#[cfg(target_pointer_width = "64")]
const _: () = {
    use core::mem::{offset_of, size_of};

    assert!(size_of::<GetVariableArgs>() == 48);
    assert!(size_of::<SetVariableArgs>() == 44);
    assert!(size_of::<GetNextVariableNameArgs>() == 32);
    assert!(size_of::<QueryVariableInfoArgs>() == 36);
    assert!(size_of::<GetTimeArgs>() == 24);
    assert!(size_of::<SetTimeArgs>() == 16);
    assert!(size_of::<GetWakeupTimeArgs>() == 32);
    assert!(size_of::<SetWakeupTimeArgs>() == 17);
    assert!(offset_of!(SetWakeupTimeArgs, enabled) == 0);
    assert!(size_of::<GetNextHighMonotonicCountArgs>() == 16);
    assert!(size_of::<ResetSystemArgs>() == 28);
};

#[cfg(test)]
mod tests {
    use super::*;

    use core::mem::offset_of;

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn packed_field_offsets() {
        assert_eq!(offset_of!(SetVariableArgs, attributes), 16);
        assert_eq!(offset_of!(SetVariableArgs, data_size), 20);
        assert_eq!(offset_of!(SetVariableArgs, data), 28);
        assert_eq!(offset_of!(QueryVariableInfoArgs, maximum_variable_storage_size), 4);
        assert_eq!(offset_of!(SetWakeupTimeArgs, enabled), 0);
        assert_eq!(offset_of!(SetWakeupTimeArgs, time), 1);
        assert_eq!(offset_of!(SetWakeupTimeArgs, status), 9);
        assert_eq!(offset_of!(ResetSystemArgs, status), 4);
        assert_eq!(offset_of!(ResetSystemArgs, data), 20);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn set_wakeup_time_leads_with_the_enable_flag() {
        let mut status = STATUS_UNSET;
        let time = EfiTime::default();
        let args = SetWakeupTimeArgs {
            enabled: 1,
            time: &raw const time,
            status: &raw mut status,
        };
        // SAFETY: the struct is 17 plain bytes with no padding.
        let bytes: [u8; 17] = unsafe { core::mem::transmute(args) };
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1..9], (&raw const time).addr().to_ne_bytes());
        assert_eq!(bytes[9..17], (&raw mut status).addr().to_ne_bytes());
    }

    #[test]
    fn ulong_conversions() {
        assert_eq!(to_ulong(1024), 1024);
        assert_eq!(from_ulong(4096), 4096);
    }
}
