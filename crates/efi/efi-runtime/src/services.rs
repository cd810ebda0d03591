//! Time, wakeup alarm, reset and variable store queries.
//!
//! Each wrapper issues exactly one request and turns a non-success status into
//! [`Error::Status`].

use efi_types::{
    EfiStatus, EfiTime, EfiTimeCapabilities, ResetType, VariableAttributes, VariableStorageInfo,
    WakeupAlarm, WakeupTime,
};

use crate::device::RuntimeDevice;
use crate::error::Error;

fn check(status: EfiStatus) -> Result<(), Error> {
    status.to_result().map_err(Error::Status)
}

/// Reads the current time and the clock's capabilities.
///
/// # Errors
///
/// [`Error::Status`] if firmware cannot read the clock.
pub fn get_time<D: RuntimeDevice + ?Sized>(
    device: &mut D,
) -> Result<(EfiTime, EfiTimeCapabilities), Error> {
    let mut time = EfiTime::default();
    let mut capabilities = EfiTimeCapabilities::default();
    check(device.get_time(&mut time, &mut capabilities)?)?;
    Ok((time, capabilities))
}

/// Sets the current time.
///
/// # Errors
///
/// [`Error::Status`], e.g. `EFI_INVALID_PARAMETER` for an out-of-range date.
pub fn set_time<D: RuntimeDevice + ?Sized>(device: &mut D, time: &EfiTime) -> Result<(), Error> {
    check(device.set_time(time)?)
}

/// Reads the wakeup alarm.
///
/// # Errors
///
/// [`Error::Status`], typically `EFI_UNSUPPORTED` on platforms without an alarm.
pub fn get_wakeup_time<D: RuntimeDevice + ?Sized>(device: &mut D) -> Result<WakeupTime, Error> {
    let mut wakeup = WakeupTime::default();
    check(device.get_wakeup_time(&mut wakeup.enabled, &mut wakeup.pending, &mut wakeup.time)?)?;
    Ok(wakeup)
}

/// Arms or disarms the wakeup alarm.
///
/// # Errors
///
/// [`Error::Status`] if firmware rejects the setting.
pub fn set_wakeup_time<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    alarm: &WakeupAlarm,
) -> Result<(), Error> {
    let status = match alarm {
        WakeupAlarm::Disabled => device.set_wakeup_time(false, None)?,
        WakeupAlarm::Enabled(time) => device.set_wakeup_time(true, Some(time))?,
    };
    check(status)
}

/// Asks firmware to reset the platform.
///
/// On success this call does not return to the caller in any meaningful way;
/// if it does, the reset was refused.
///
/// # Errors
///
/// [`Error::Ioctl`] if the driver rejected the request.
pub fn reset_system<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    reset_type: ResetType,
    status: EfiStatus,
    data: &[u8],
) -> Result<(), Error> {
    device.reset_system(reset_type, status, data)
}

/// Reports variable store capacity for variables with `attributes`.
///
/// # Errors
///
/// [`Error::Status`], typically `EFI_INVALID_PARAMETER` for an attribute
/// combination the store does not support.
pub fn query_variable_info<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    attributes: VariableAttributes,
) -> Result<VariableStorageInfo, Error> {
    let mut info = VariableStorageInfo::default();
    check(device.query_variable_info(attributes.bits(), &mut info)?)?;
    Ok(info)
}

/// Returns the high 32 bits of the platform monotonic counter, advancing it.
///
/// # Errors
///
/// [`Error::Status`], e.g. `EFI_DEVICE_ERROR` when the counter overflowed.
pub fn next_high_monotonic_count<D: RuntimeDevice + ?Sized>(device: &mut D) -> Result<u32, Error> {
    let mut count = 0;
    check(device.get_next_high_monotonic_count(&mut count)?)?;
    Ok(count)
}
