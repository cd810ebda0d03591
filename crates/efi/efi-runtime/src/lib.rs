//! Client for the kernel's UEFI Runtime Services device.
//!
//! Linux exposes firmware runtime calls to user space through a character device
//! (`/dev/efi_runtime` from the `efi_runtime` module, or `/dev/efi_test` from the
//! in-tree `efi_test` module). Each runtime call is one ioctl carrying a packed
//! argument struct and a pointer the driver writes the firmware status into.
//!
//! # Architecture
//!
//! - [`abi`] - packed argument structs and ioctl request numbers, matching the kernel
//! - [`device`] - the [`RuntimeDevice`] seam and the ioctl-backed [`Device`]
//! - [`session`] - locating or loading the driver and tearing it down again
//! - [`variable`] - reading, writing and deleting one variable
//! - [`enumerate`] - walking the variable store with `GetNextVariableName`
//! - [`services`] - time, wakeup alarm, reset and variable store queries
//!
//! All calls are synchronous and block until the driver answers. Nothing here is
//! shared between threads; a process holds at most one [`DriverSession`].
//!
//! ```no_run
//! use efi_runtime::session::{DriverCandidate, DriverSession, Modprobe};
//! use efi_runtime::variable;
//! use efi_types::EfiGuid;
//!
//! let mut session = DriverSession::start(Modprobe::default(), &DriverCandidate::defaults())?;
//! let timeout = variable::get_variable(&mut session, "Timeout", &EfiGuid::GLOBAL_VARIABLE)?;
//! println!("{:?}", timeout.data);
//! session.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod abi;
pub mod device;
pub mod enumerate;
pub mod error;
pub mod services;
pub mod session;
pub mod variable;

pub use device::{Device, RuntimeDevice};
pub use error::Error;
pub use session::{DriverSession, SessionError};
