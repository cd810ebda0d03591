//! The runtime services device.
//!
//! [`RuntimeDevice`] is the seam between the call wrappers in this crate and the
//! kernel: one method per ioctl, raw buffers in, firmware status out. [`Device`]
//! implements it on top of an open device node; tests implement it with stubs.

use std::ffi::c_int;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::ptr;

use efi_types::{EfiGuid, EfiStatus, EfiTime, EfiTimeCapabilities, ResetType, VariableStorageInfo};
use log::debug;

use crate::abi::{self, STATUS_UNSET};
use crate::error::Error;

/// One method per runtime service request.
///
/// Every method except [`reset_system`](Self::reset_system) returns the status
/// the firmware reported, which may be a non-success value. `Err` is reserved
/// for failures where no status was produced at all.
pub trait RuntimeDevice {
    /// `GetVariable`.
    ///
    /// `name` must be null-terminated. `data.len()` is the capacity offered to
    /// firmware; on return `data_size` holds the size firmware reported, which
    /// exceeds the capacity when the status is `EFI_BUFFER_TOO_SMALL`.
    fn get_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: &mut u32,
        data: &mut [u8],
        data_size: &mut usize,
    ) -> Result<EfiStatus, Error>;

    /// `SetVariable`. An empty `data` deletes the variable.
    fn set_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: u32,
        data: &[u8],
    ) -> Result<EfiStatus, Error>;

    /// `GetNextVariableName`.
    ///
    /// `name` and `guid` are the cursor: they hold the previous entry on input
    /// and the next one on success. `name_size` is the capacity of `name` in
    /// bytes on input and the size firmware reported on return.
    fn get_next_variable_name(
        &mut self,
        name: &mut [u16],
        name_size: &mut usize,
        guid: &mut EfiGuid,
    ) -> Result<EfiStatus, Error>;

    /// `GetTime`.
    fn get_time(
        &mut self,
        time: &mut EfiTime,
        capabilities: &mut EfiTimeCapabilities,
    ) -> Result<EfiStatus, Error>;

    /// `SetTime`.
    fn set_time(&mut self, time: &EfiTime) -> Result<EfiStatus, Error>;

    /// `GetWakeupTime`.
    fn get_wakeup_time(
        &mut self,
        enabled: &mut bool,
        pending: &mut bool,
        time: &mut EfiTime,
    ) -> Result<EfiStatus, Error>;

    /// `SetWakeupTime`. `time` is `None` only when disarming.
    fn set_wakeup_time(&mut self, enabled: bool, time: Option<&EfiTime>)
    -> Result<EfiStatus, Error>;

    /// `QueryVariableInfo`.
    fn query_variable_info(
        &mut self,
        attributes: u32,
        info: &mut VariableStorageInfo,
    ) -> Result<EfiStatus, Error>;

    /// `GetNextHighMonotonicCount`.
    fn get_next_high_monotonic_count(&mut self, count: &mut u32) -> Result<EfiStatus, Error>;

    /// `ResetSystem`. Returns only if the firmware declined to reset.
    fn reset_system(
        &mut self,
        reset_type: ResetType,
        status: EfiStatus,
        data: &[u8],
    ) -> Result<(), Error>;
}

/// An open runtime services device node.
///
/// The node is opened read-write and closed when the value is dropped.
#[derive(Debug)]
pub struct Device {
    file: File,
    path: PathBuf,
}

impl Device {
    /// Opens the device node at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from `open(2)`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!("opened {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path the device was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        debug!("closing {}", self.path.display());
    }
}

/// Turns an ioctl result and the status out-field into the call's outcome.
///
/// A status the driver wrote wins over the ioctl return value: `efi_test`
/// reports firmware errors both ways, and the status is the precise one.
pub(crate) fn complete(
    request: &'static str,
    result: nix::Result<c_int>,
    status: u64,
) -> Result<EfiStatus, Error> {
    match (result, status) {
        (Err(source), STATUS_UNSET) => Err(Error::Ioctl { request, source }),
        (Ok(_), STATUS_UNSET) => Err(Error::NoStatus { request }),
        (Err(errno), status) => {
            let status = EfiStatus(status);
            debug!("{request}: {status} (ioctl: {errno})");
            Ok(status)
        }
        (Ok(_), status) => {
            let status = EfiStatus(status);
            debug!("{request}: {status}");
            Ok(status)
        }
    }
}

fn require_terminated(name: &[u16]) -> Result<(), Error> {
    if name.contains(&0) {
        Ok(())
    } else {
        Err(Error::UnterminatedName)
    }
}

impl RuntimeDevice for Device {
    fn get_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: &mut u32,
        data: &mut [u8],
        data_size: &mut usize,
    ) -> Result<EfiStatus, Error> {
        require_terminated(name)?;
        let mut size = abi::to_ulong(data.len());
        let mut status = STATUS_UNSET;
        let mut args = abi::GetVariableArgs {
            variable_name: name.as_ptr(),
            vendor_guid: ptr::from_ref(guid),
            attributes: ptr::from_mut(attributes),
            data_size: &raw mut size,
            data: data.as_mut_ptr().cast(),
            status: &raw mut status,
        };
        // SAFETY: every pointer in `args` borrows memory that outlives the call,
        // and `size` is the capacity of `data`.
        let result = unsafe { abi::get_variable(self.fd(), &raw mut args) };
        *data_size = abi::from_ulong(size);
        complete("GET_VARIABLE", result, status)
    }

    fn set_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: u32,
        data: &[u8],
    ) -> Result<EfiStatus, Error> {
        require_terminated(name)?;
        let mut status = STATUS_UNSET;
        let args = abi::SetVariableArgs {
            variable_name: name.as_ptr(),
            vendor_guid: ptr::from_ref(guid),
            attributes,
            data_size: abi::to_ulong(data.len()),
            data: data.as_ptr().cast(),
            status: &raw mut status,
        };
        // SAFETY: the driver reads `data_size` bytes from `data` and writes only
        // the status, all of which live until the call returns.
        let result = unsafe { abi::set_variable(self.fd(), &raw const args) };
        complete("SET_VARIABLE", result, status)
    }

    fn get_next_variable_name(
        &mut self,
        name: &mut [u16],
        name_size: &mut usize,
        guid: &mut EfiGuid,
    ) -> Result<EfiStatus, Error> {
        require_terminated(name)?;
        let capacity = name.len() * efi_types::name::UNIT_SIZE;
        let mut size = abi::to_ulong((*name_size).min(capacity));
        let mut status = STATUS_UNSET;
        let mut args = abi::GetNextVariableNameArgs {
            variable_name_size: &raw mut size,
            variable_name: name.as_mut_ptr(),
            vendor_guid: ptr::from_mut(guid),
            status: &raw mut status,
        };
        // SAFETY: `size` never exceeds the byte length of `name`, so the driver
        // cannot write past it; the GUID and status are exclusive borrows.
        let result = unsafe { abi::get_next_variable_name(self.fd(), &raw mut args) };
        *name_size = abi::from_ulong(size);
        complete("GET_NEXTVARIABLENAME", result, status)
    }

    fn get_time(
        &mut self,
        time: &mut EfiTime,
        capabilities: &mut EfiTimeCapabilities,
    ) -> Result<EfiStatus, Error> {
        let mut status = STATUS_UNSET;
        let mut args = abi::GetTimeArgs {
            time: ptr::from_mut(time),
            capabilities: ptr::from_mut(capabilities),
            status: &raw mut status,
        };
        // SAFETY: all three pointers are exclusive borrows of correctly sized values.
        let result = unsafe { abi::get_time(self.fd(), &raw mut args) };
        complete("GET_TIME", result, status)
    }

    fn set_time(&mut self, time: &EfiTime) -> Result<EfiStatus, Error> {
        let mut status = STATUS_UNSET;
        let args = abi::SetTimeArgs {
            time: ptr::from_ref(time),
            status: &raw mut status,
        };
        // SAFETY: `time` is read, `status` is written; both outlive the call.
        let result = unsafe { abi::set_time(self.fd(), &raw const args) };
        complete("SET_TIME", result, status)
    }

    fn get_wakeup_time(
        &mut self,
        enabled: &mut bool,
        pending: &mut bool,
        time: &mut EfiTime,
    ) -> Result<EfiStatus, Error> {
        let mut raw_enabled = 0u8;
        let mut raw_pending = 0u8;
        let mut status = STATUS_UNSET;
        let mut args = abi::GetWakeupTimeArgs {
            enabled: &raw mut raw_enabled,
            pending: &raw mut raw_pending,
            time: ptr::from_mut(time),
            status: &raw mut status,
        };
        // SAFETY: the flags are written through `u8` locals, never through `bool`.
        let result = unsafe { abi::get_wakeup_time(self.fd(), &raw mut args) };
        *enabled = raw_enabled != 0;
        *pending = raw_pending != 0;
        complete("GET_WAKETIME", result, status)
    }

    fn set_wakeup_time(
        &mut self,
        enabled: bool,
        time: Option<&EfiTime>,
    ) -> Result<EfiStatus, Error> {
        let mut status = STATUS_UNSET;
        let args = abi::SetWakeupTimeArgs {
            enabled: u8::from(enabled),
            time: time.map_or(ptr::null(), ptr::from_ref),
            status: &raw mut status,
        };
        // SAFETY: `time` is either null or a live borrow; the driver only reads it.
        let result = unsafe { abi::set_wakeup_time(self.fd(), &raw const args) };
        complete("SET_WAKETIME", result, status)
    }

    fn query_variable_info(
        &mut self,
        attributes: u32,
        info: &mut VariableStorageInfo,
    ) -> Result<EfiStatus, Error> {
        let mut status = STATUS_UNSET;
        let mut args = abi::QueryVariableInfoArgs {
            attributes,
            maximum_variable_storage_size: &raw mut info.maximum_storage_size,
            remaining_variable_storage_size: &raw mut info.remaining_storage_size,
            maximum_variable_size: &raw mut info.maximum_variable_size,
            status: &raw mut status,
        };
        // SAFETY: each out-pointer is a distinct field of an exclusive borrow.
        let result = unsafe { abi::query_variable_info(self.fd(), &raw mut args) };
        complete("QUERY_VARIABLEINFO", result, status)
    }

    fn get_next_high_monotonic_count(&mut self, count: &mut u32) -> Result<EfiStatus, Error> {
        let mut status = STATUS_UNSET;
        let mut args = abi::GetNextHighMonotonicCountArgs {
            high_count: ptr::from_mut(count),
            status: &raw mut status,
        };
        // SAFETY: both pointers are exclusive borrows that outlive the call.
        let result = unsafe { abi::get_next_high_monotonic_count(self.fd(), &raw mut args) };
        complete("GET_NEXTHIGHMONOTONICCOUNT", result, status)
    }

    fn reset_system(
        &mut self,
        reset_type: ResetType,
        status: EfiStatus,
        data: &[u8],
    ) -> Result<(), Error> {
        let args = abi::ResetSystemArgs {
            reset_type: reset_type as c_int,
            status: status.0,
            data_size: abi::to_ulong(data.len()),
            data: if data.is_empty() {
                ptr::null()
            } else {
                data.as_ptr().cast()
            },
        };
        debug!("RESET_SYSTEM: {reset_type:?}, reason {status}, {} data bytes", data.len());
        // SAFETY: the driver reads `data_size` bytes from `data`, which is borrowed
        // for the duration of the call.
        let result = unsafe { abi::reset_system(self.fd(), &raw const args) };
        result.map(drop).map_err(|source| Error::Ioctl {
            request: "RESET_SYSTEM",
            source,
        })
    }
}
