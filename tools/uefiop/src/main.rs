//! uefiop: exercise UEFI Runtime Services from user space.
//!
//! Locates (or loads) the `efi_runtime`/`efi_test` driver, issues one runtime
//! service call per invocation, prints the result and the firmware status, and
//! unloads the driver again if it loaded it.
//!
//! Exit code: 0 when the firmware reported success (for `list`, reaching the
//! end of the store), 1 otherwise.

mod cli;
mod logger;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use efi_runtime::session::{DriverCandidate, DriverSession, Modprobe};
use efi_runtime::{Error, RuntimeDevice, enumerate, services, variable};
use efi_types::{EfiStatus, EfiTime, WakeupAlarm};
use log::{debug, warn};

use cli::{
    Cli, Command, GetArgs, HexBytes, InfoArgs, ListArgs, ResetArgs, SetArgs, TimeArgs, WakeupArgs,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.quiet, cli.verbose);

    match run(cli) {
        Ok(status) => {
            println!("{}", status.report());
            if status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<EfiStatus> {
    let mut session = open_session(cli.device.as_deref(), cli.no_load)?;
    debug!("using {}", session.device_path().display());

    let status = match cli.command {
        Command::Get(args) => cmd_get(&mut session, &args)?,
        Command::Set(args) => cmd_set(&mut session, args)?,
        Command::List(args) => cmd_list(&mut session, &args)?,
        Command::Time(args) => cmd_time(&mut session, &args)?,
        Command::Wakeup(args) => cmd_wakeup(&mut session, &args)?,
        Command::Reset(args) => cmd_reset(&mut session, args)?,
        Command::Info(args) => cmd_info(&mut session, &args)?,
        Command::Monotonic => cmd_monotonic(&mut session)?,
    };

    session.close().context("failed to release the UEFI runtime driver")?;
    Ok(status)
}

fn open_session(device: Option<&Path>, no_load: bool) -> Result<DriverSession> {
    let loader = Modprobe::default();
    let session = match device {
        Some(path) => DriverSession::open_path(loader, path),
        None if no_load => DriverSession::attach(loader, &DriverCandidate::defaults()),
        None => DriverSession::start(loader, &DriverCandidate::defaults()),
    };
    session.context("cannot open the UEFI runtime driver")
}

/// Splits a call result into its value and the firmware status.
///
/// A non-success status is an outcome to report, not a failure of the tool;
/// only errors without a status propagate.
fn settle<T>(result: Result<T, Error>) -> Result<(Option<T>, EfiStatus)> {
    match result {
        Ok(value) => Ok((Some(value), EfiStatus::SUCCESS)),
        Err(err) => match err.status() {
            Some(status) => Ok((None, status)),
            None => Err(err.into()),
        },
    }
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|byte| format!("{byte:02x}")).collect()
}

// ===========================================================================
// Variables
// ===========================================================================

fn cmd_get<D: RuntimeDevice + ?Sized>(device: &mut D, args: &GetArgs) -> Result<EfiStatus> {
    let (found, status) = settle(variable::get_variable(device, &args.name, &args.guid))?;
    if let Some(found) = found {
        debug!("attributes {:#x}", found.attributes.bits());
        match &args.file {
            Some(path) => fs::write(path, &found.data)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("Data:\n{}", hex(&found.data)),
        }
    }
    Ok(status)
}

/// Chooses the bytes to write: `--data` wins over `--file`.
fn select_payload(data: Option<HexBytes>, file: Option<&Path>) -> Result<Vec<u8>> {
    match (data, file) {
        (Some(HexBytes(bytes)), file) => {
            if let Some(file) = file {
                warn!("--data given, ignoring {}", file.display());
            }
            Ok(bytes)
        }
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        (None, None) => bail!("nothing to write: pass --data, --file or --delete"),
    }
}

fn cmd_set<D: RuntimeDevice + ?Sized>(device: &mut D, args: SetArgs) -> Result<EfiStatus> {
    let result = if args.delete {
        if args.data.is_some() || args.file.is_some() {
            warn!("--delete given, ignoring data");
        }
        variable::delete_variable(device, &args.name, &args.guid)
    } else {
        let payload = select_payload(args.data, args.file.as_deref())?;
        variable::set_variable(device, &args.name, &args.guid, &payload, args.attributes)
    };
    let (_, status) = settle(result)?;
    Ok(status)
}

fn cmd_list<D: RuntimeDevice + ?Sized>(device: &mut D, args: &ListArgs) -> Result<EfiStatus> {
    for entry in enumerate::variable_names(device, args.size)? {
        match entry {
            Ok(entry) => {
                println!("VariableName: {}", entry.name);
                println!("VendorGuid: {}", entry.guid);
            }
            Err(Error::BufferTooSmall { required }) => {
                println!(
                    "The buffer is too small, need {required} bytes. \
                     Pass a larger --size and try again."
                );
                return Ok(EfiStatus::BUFFER_TOO_SMALL);
            }
            Err(err) => return settle::<()>(Err(err)).map(|(_, status)| status),
        }
    }
    println!("Searching completed.");
    Ok(EfiStatus::SUCCESS)
}

fn cmd_info<D: RuntimeDevice + ?Sized>(device: &mut D, args: &InfoArgs) -> Result<EfiStatus> {
    let (info, status) = settle(services::query_variable_info(device, args.attributes))?;
    if let Some(info) = info {
        println!("MaximumVariableStorageSize:   {}", info.maximum_storage_size);
        println!("RemainingVariableStorageSize: {}", info.remaining_storage_size);
        println!("MaximumVariableSize:          {}", info.maximum_variable_size);
    }
    Ok(status)
}

// ===========================================================================
// Clock, alarm, counter and reset
// ===========================================================================

fn print_time(time: &EfiTime) {
    println!("Year:       {}", time.year);
    println!("Month:      {}", time.month);
    println!("Day:        {}", time.day);
    println!("Hour:       {}", time.hour);
    println!("Minute:     {}", time.minute);
    println!("Second:     {}", time.second);
    println!("Pad1:       {}", time.pad1);
    println!("Nanosecond: {}", time.nanosecond);
    println!("TimeZone:   {}", time.time_zone);
    println!("Daylight:   {}", time.daylight);
    println!("Pad2:       {}", time.pad2);
}

fn cmd_time<D: RuntimeDevice + ?Sized>(device: &mut D, args: &TimeArgs) -> Result<EfiStatus> {
    if let Some(time) = &args.set {
        let (_, status) = settle(services::set_time(device, time))?;
        return Ok(status);
    }

    let (now, status) = settle(services::get_time(device))?;
    if let Some((time, capabilities)) = now {
        print_time(&time);
        println!("Resolution: {}", capabilities.resolution);
        println!("Accuracy:   {}", capabilities.accuracy);
        println!("SetsToZero: {}", capabilities.sets_to_zero());
    }
    Ok(status)
}

fn cmd_wakeup<D: RuntimeDevice + ?Sized>(device: &mut D, args: &WakeupArgs) -> Result<EfiStatus> {
    if let Some(alarm) = &args.set {
        if let WakeupAlarm::Enabled(time) = alarm {
            debug!("arming wakeup alarm for {time}");
        }
        let (_, status) = settle(services::set_wakeup_time(device, alarm))?;
        return Ok(status);
    }

    let (wakeup, status) = settle(services::get_wakeup_time(device))?;
    if let Some(wakeup) = wakeup {
        println!("Enabled:    {}", wakeup.enabled);
        println!("Pending:    {}", wakeup.pending);
        print_time(&wakeup.time);
    }
    Ok(status)
}

fn cmd_monotonic<D: RuntimeDevice + ?Sized>(device: &mut D) -> Result<EfiStatus> {
    let (count, status) = settle(services::next_high_monotonic_count(device))?;
    if let Some(count) = count {
        println!("HighCount: {count}");
    }
    Ok(status)
}

fn cmd_reset<D: RuntimeDevice + ?Sized>(device: &mut D, args: ResetArgs) -> Result<EfiStatus> {
    let data = args.data.map(|HexBytes(bytes)| bytes).unwrap_or_default();
    services::reset_system(device, args.reset_type, args.status, &data)
        .context("reset request rejected by the driver")?;
    bail!("firmware returned from ResetSystem without resetting")
}
