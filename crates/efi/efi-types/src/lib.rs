//! UEFI runtime types and text codecs.
//!
//! This crate holds everything the uefiop tools need to talk about firmware
//! variables without touching a device: status codes, GUIDs, variable names,
//! attributes, time values and the small text formats accepted on the command
//! line.
//!
//! # Architecture
//!
//! - [`status`] - 64-bit status codes and the static status catalog
//! - [`guid`] - GUID type with the driver's mixed-endian layout and its text codec
//! - [`name`] - 8-bit <-> UCS-2 variable name codec
//! - [`variable`] - variable attribute flags
//! - [`time`] - time, time capabilities and wakeup alarm types
//! - [`reset`] - reset type
//! - [`data`] - hex byte-list parser for variable and reset payloads
//!
//! Every type that crosses the device boundary is `#[repr(C)]` and its size is
//! checked at compile time against the kernel layout.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod data;
pub mod error;
pub mod guid;
pub mod name;
pub mod reset;
pub mod status;
pub mod time;
pub mod variable;

pub use error::{FormatError, NameError};
pub use guid::EfiGuid;
pub use reset::ResetType;
pub use status::EfiStatus;
pub use time::{EfiTime, EfiTimeCapabilities, WakeupAlarm, WakeupTime};
pub use variable::{VariableAttributes, VariableStorageInfo};
