//! Diagnostic logging to stderr.
//!
//! Three levels controlled by CLI flags:
//! - **Quiet** (`-q`): errors only
//! - **Default** (no flag): warnings and errors
//! - **Verbose** (`-v`): everything down to debug, including each driver request
//!
//! Command output goes to stdout; this logger never writes there.

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Format: "[LEVEL] target: message"
        eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Maps the verbosity flags to a level filter.
pub fn level(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Installs the logger. Call once at startup.
pub fn init(quiet: bool, verbose: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level(quiet, verbose));
    }
}
