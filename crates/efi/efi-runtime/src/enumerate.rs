//! Walking the variable store.
//!
//! `GetNextVariableName` is a cursor protocol: each call passes the previous
//! name and GUID in and receives the next pair in the same buffers. The walk
//! starts from an empty name and ends when firmware answers `EFI_NOT_FOUND`.
//! [`VariableNames`] wraps that loop as a lazy iterator.

use efi_types::name::{UNIT_SIZE, decode_name};
use efi_types::{EfiGuid, EfiStatus};

use crate::device::RuntimeDevice;
use crate::error::Error;

/// Default name buffer size in bytes.
pub const DEFAULT_NAME_BUFFER: usize = 1024;

/// One variable found by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    /// Variable name.
    pub name: String,
    /// Vendor GUID.
    pub guid: EfiGuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Active,
    /// Stopped on `EFI_BUFFER_TOO_SMALL`; can resume after [`VariableNames::grow`].
    Starved,
    Finished,
}

/// Iterator over every variable name in the store.
///
/// Yields `Ok` entries until firmware reports the end of the store. Any other
/// outcome is yielded once as `Err` and stops the iteration; from then on
/// `next` returns `None` without calling the device. The buffer is not grown
/// automatically. After [`Error::BufferTooSmall`] the caller may
/// [`grow`](Self::grow) it, which re-arms the iterator at the same position.
#[derive(Debug)]
pub struct VariableNames<'d, D: RuntimeDevice + ?Sized> {
    device: &'d mut D,
    name: Vec<u16>,
    guid: EfiGuid,
    cursor: Cursor,
}

fn validate(bytes: usize) -> Result<usize, Error> {
    if bytes < UNIT_SIZE || bytes % UNIT_SIZE != 0 {
        return Err(Error::InvalidBufferSize(bytes));
    }
    Ok(bytes / UNIT_SIZE)
}

/// Starts an enumeration with a name buffer of `buffer_size` bytes.
///
/// # Errors
///
/// [`Error::InvalidBufferSize`] if `buffer_size` is odd or below 2.
pub fn variable_names<D: RuntimeDevice + ?Sized>(
    device: &mut D,
    buffer_size: usize,
) -> Result<VariableNames<'_, D>, Error> {
    let units = validate(buffer_size)?;
    Ok(VariableNames {
        device,
        name: vec![0; units],
        guid: EfiGuid::NULL,
        cursor: Cursor::Active,
    })
}

impl<D: RuntimeDevice + ?Sized> VariableNames<'_, D> {
    /// Current name buffer size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.name.len() * UNIT_SIZE
    }

    /// Enlarges the name buffer to `buffer_size` bytes.
    ///
    /// The current cursor position is kept. If the iteration stopped because
    /// the buffer was too small, it resumes. A size not larger than the current
    /// one leaves the buffer unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBufferSize`] if `buffer_size` is odd or below 2.
    pub fn grow(&mut self, buffer_size: usize) -> Result<(), Error> {
        let units = validate(buffer_size)?;
        if units > self.name.len() {
            self.name.resize(units, 0);
        }
        if self.cursor == Cursor::Starved {
            self.cursor = Cursor::Active;
        }
        Ok(())
    }
}

impl<D: RuntimeDevice + ?Sized> Iterator for VariableNames<'_, D> {
    type Item = Result<VariableEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor != Cursor::Active {
            return None;
        }

        let mut size = self.buffer_size();
        let status = match self
            .device
            .get_next_variable_name(&mut self.name, &mut size, &mut self.guid)
        {
            Ok(status) => status,
            Err(err) => {
                self.cursor = Cursor::Finished;
                return Some(Err(err));
            }
        };

        match status {
            EfiStatus::SUCCESS => Some(Ok(VariableEntry {
                name: decode_name(&self.name, size),
                guid: self.guid,
            })),
            EfiStatus::NOT_FOUND => {
                self.cursor = Cursor::Finished;
                None
            }
            EfiStatus::BUFFER_TOO_SMALL => {
                self.cursor = Cursor::Starved;
                Some(Err(Error::BufferTooSmall { required: size }))
            }
            status => {
                self.cursor = Cursor::Finished;
                Some(Err(Error::Status(status)))
            }
        }
    }
}
