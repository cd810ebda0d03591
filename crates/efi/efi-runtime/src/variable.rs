//! Reading, writing and deleting a single variable.

use efi_types::name::encode_name;
use efi_types::{EfiGuid, EfiStatus, VariableAttributes};
use log::debug;

use crate::device::RuntimeDevice;
use crate::error::Error;

/// Initial data buffer offered to firmware by [`get_variable`].
pub const DEFAULT_DATA_CAPACITY: usize = 1024;

/// A variable's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Stored data, exactly as long as firmware reported.
    pub data: Vec<u8>,
    /// Stored attributes.
    pub attributes: VariableAttributes,
}

/// Reads `name` under `guid`, starting with [`DEFAULT_DATA_CAPACITY`] bytes.
///
/// # Errors
///
/// See [`get_variable_with_capacity`].
pub fn get_variable<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    name: &str,
    guid: &EfiGuid,
) -> Result<Variable, Error> {
    get_variable_with_capacity(device, name, guid, DEFAULT_DATA_CAPACITY)
}

/// Reads `name` under `guid`, offering `capacity` bytes first.
///
/// If firmware answers `EFI_BUFFER_TOO_SMALL` the buffer is resized to the size
/// it reported and the read is retried exactly once.
///
/// # Errors
///
/// [`Error::Status`] for any non-success status after the retry, or the
/// device error if the request itself failed.
pub fn get_variable_with_capacity<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    name: &str,
    guid: &EfiGuid,
    capacity: usize,
) -> Result<Variable, Error> {
    let wire_name = encode_name(name);
    let mut data = vec![0u8; capacity];
    let mut attributes = 0u32;
    let mut size = 0usize;

    let mut status = device.get_variable(&wire_name, guid, &mut attributes, &mut data, &mut size)?;
    if status == EfiStatus::BUFFER_TOO_SMALL {
        debug!("{name}: {capacity} bytes too small, retrying with {size}");
        data.resize(size, 0);
        status = device.get_variable(&wire_name, guid, &mut attributes, &mut data, &mut size)?;
    }
    status.to_result().map_err(Error::Status)?;

    data.truncate(size);
    Ok(Variable {
        data,
        attributes: VariableAttributes::from_bits_retain(attributes),
    })
}

/// Writes `data` to `name` under `guid` with `attributes`.
///
/// # Errors
///
/// [`Error::Status`] if firmware rejects the write.
pub fn set_variable<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    name: &str,
    guid: &EfiGuid,
    data: &[u8],
    attributes: VariableAttributes,
) -> Result<(), Error> {
    let wire_name = encode_name(name);
    device
        .set_variable(&wire_name, guid, attributes.bits(), data)?
        .to_result()
        .map_err(Error::Status)
}

/// Deletes `name` under `guid` by writing an empty payload.
///
/// # Errors
///
/// [`Error::Status`] if firmware rejects the write, typically `EFI_NOT_FOUND`.
pub fn delete_variable<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    name: &str,
    guid: &EfiGuid,
) -> Result<(), Error> {
    set_variable(device, name, guid, &[], VariableAttributes::default())
}
