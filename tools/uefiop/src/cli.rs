//! Command-line interface definitions for uefiop.

use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use efi_runtime::enumerate::DEFAULT_NAME_BUFFER;
use efi_types::data::parse_hex_bytes;
use efi_types::{EfiGuid, EfiStatus, EfiTime, FormatError, ResetType, VariableAttributes, WakeupAlarm};

/// Exercise UEFI Runtime Services through the efi_runtime/efi_test driver.
#[derive(Parser, Debug)]
#[command(name = "uefiop", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Open this device node directly instead of locating or loading a driver.
    #[arg(long, global = true, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Only use a driver that is already present; never load a kernel module.
    #[arg(long, global = true)]
    pub no_load: bool,

    /// Show only errors on stderr.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show every driver request and lifecycle step on stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a variable.
    Get(GetArgs),
    /// Write or delete a variable.
    Set(SetArgs),
    /// List every variable name and vendor GUID.
    List(ListArgs),
    /// Read or set the firmware clock.
    Time(TimeArgs),
    /// Read or program the wakeup alarm.
    Wakeup(WakeupArgs),
    /// Reset the platform.
    Reset(ResetArgs),
    /// Report variable store capacity.
    Info(InfoArgs),
    /// Advance and print the high monotonic counter.
    Monotonic,
}

/// Arguments for the `get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Vendor GUID, e.g. 8be4df61-93ca-11d2-aa0d-00e098032b8c.
    #[arg(long, short = 'g')]
    pub guid: EfiGuid,

    /// Variable name.
    #[arg(long, short = 'n')]
    pub name: String,

    /// Write the data to this file instead of printing it.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

/// Arguments for the `set` subcommand.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Vendor GUID.
    #[arg(long, short = 'g')]
    pub guid: EfiGuid,

    /// Variable name.
    #[arg(long, short = 'n')]
    pub name: String,

    /// Data as two-digit hex bytes separated by spaces or commas. Takes
    /// precedence over --file.
    #[arg(long, short = 'd', value_name = "HEX")]
    pub data: Option<HexBytes>,

    /// Read the data from this file.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Attributes as a hex bit mask.
    #[arg(long, short = 'a', value_parser = parse_attributes, default_value = "7")]
    pub attributes: VariableAttributes,

    /// Delete the variable; any data given is ignored.
    #[arg(long, short = 'D')]
    pub delete: bool,
}

/// Arguments for the `list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Variable name buffer size in bytes (even, at least 2).
    #[arg(long, short = 's', default_value_t = DEFAULT_NAME_BUFFER)]
    pub size: usize,
}

/// Arguments for the `time` subcommand.
#[derive(Args, Debug)]
pub struct TimeArgs {
    /// Set the clock to
    /// Year:Month:Day:Hour:Minute:Second:Pad1:Nanosecond:TimeZone:Daylight:Pad2.
    #[arg(long, value_name = "TIME")]
    pub set: Option<EfiTime>,
}

/// Arguments for the `wakeup` subcommand.
#[derive(Args, Debug)]
pub struct WakeupArgs {
    /// `false` to disarm, or `true,<TIME>` to arm the alarm.
    #[arg(long, value_name = "ALARM")]
    pub set: Option<WakeupAlarm>,
}

/// Arguments for the `reset` subcommand.
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// cold, warm, shutdown, platform or 0-3.
    #[arg(long = "type", short = 't', default_value = "cold")]
    pub reset_type: ResetType,

    /// Reset reason as a hex status code.
    #[arg(long, short = 's', value_parser = parse_status, default_value = "0")]
    pub status: EfiStatus,

    /// Reset data as hex bytes.
    #[arg(long, short = 'd', value_name = "HEX")]
    pub data: Option<HexBytes>,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Attributes of the storage class to query, as a hex bit mask.
    #[arg(long, short = 'a', value_parser = parse_attributes, default_value = "7")]
    pub attributes: VariableAttributes,
}

/// A hex byte list given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl FromStr for HexBytes {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_bytes(s).map(Self)
    }
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

fn parse_attributes(text: &str) -> Result<VariableAttributes, ParseIntError> {
    u32::from_str_radix(strip_hex_prefix(text), 16).map(VariableAttributes::from_bits_retain)
}

fn parse_status(text: &str) -> Result<EfiStatus, ParseIntError> {
    u64::from_str_radix(strip_hex_prefix(text), 16).map(EfiStatus)
}
