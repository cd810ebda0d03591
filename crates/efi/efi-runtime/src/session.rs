//! Driver discovery, loading and teardown.
//!
//! A [`DriverSession`] goes through three states:
//!
//! ```text
//! Searching ──▶ Open (borrowed: node already existed)
//!     │   └───▶ Open (owned: this session loaded the module)
//!     └──────▶ Failed
//! ```
//!
//! Only an owned session unloads its module again, and it does so on every exit
//! path: explicitly via [`DriverSession::close`], or best-effort on drop.
//! Module management is delegated to a [`ModuleLoader`]; the production one is
//! [`Modprobe`].

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use efi_types::{EfiGuid, EfiStatus, EfiTime, EfiTimeCapabilities, ResetType, VariableStorageInfo};
use log::{debug, info, warn};

use crate::device::{Device, RuntimeDevice};
use crate::error::Error;

/// Errors raised while locating, loading or releasing the driver.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No candidate produced a usable device node.
    #[error("no UEFI runtime driver available (tried {tried})")]
    DriverUnavailable {
        /// Comma-separated candidate module names.
        tried: String,
    },
    /// A candidate module is loaded but its device node is missing.
    #[error("module {module} is loaded but its device node is missing")]
    InconsistentModule {
        /// The loaded module.
        module: String,
    },
    /// The module loader could not be spawned.
    #[error("failed to run {}", program.display())]
    Loader {
        /// Loader executable.
        program: PathBuf,
        /// Spawn error.
        #[source]
        source: io::Error,
    },
    /// The module loader exited unsuccessfully.
    #[error("{action} {module} failed: {status}")]
    LoaderFailed {
        /// `load` or `unload`.
        action: LoaderAction,
        /// Module name.
        module: String,
        /// Loader exit status.
        status: ExitStatus,
    },
    /// The loaded module registry could not be read.
    #[error("failed to read module list {}", path.display())]
    ModuleList {
        /// Registry path.
        path: PathBuf,
        /// Read error.
        #[source]
        source: io::Error,
    },
    /// The device node could not be opened.
    #[error("failed to open {}", path.display())]
    Open {
        /// Device node.
        path: PathBuf,
        /// Open error.
        #[source]
        source: io::Error,
    },
    /// The module is still listed after unloading it.
    #[error("module {module} is still loaded after unloading it")]
    UnloadFailed {
        /// Module name.
        module: String,
    },
}

/// Loader operation named in [`SessionError::LoaderFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderAction {
    /// Inserting a module.
    Load,
    /// Removing a module.
    Unload,
}

impl fmt::Display for LoaderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "loading",
            Self::Unload => "unloading",
        })
    }
}

/// A kernel module and the device node it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCandidate {
    /// Module name as passed to the loader.
    pub module: String,
    /// Device node the module exposes.
    pub device: PathBuf,
}

impl DriverCandidate {
    /// Creates a candidate.
    pub fn new(module: impl Into<String>, device: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            device: device.into(),
        }
    }

    /// The supported drivers in order of preference: the out-of-tree
    /// `efi_runtime` module, then the in-tree `efi_test` module.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("efi_runtime", "/dev/efi_runtime"),
            Self::new("efi_test", "/dev/efi_test"),
        ]
    }
}

/// Loads, unloads and queries kernel modules.
pub trait ModuleLoader {
    /// Inserts `module`, waiting for the operation to finish.
    ///
    /// # Errors
    ///
    /// Fails if the loader cannot be run or reports failure.
    fn load(&mut self, module: &str) -> Result<(), SessionError>;

    /// Removes `module`, waiting for the operation to finish.
    ///
    /// # Errors
    ///
    /// Fails if the loader cannot be run or reports failure.
    fn unload(&mut self, module: &str) -> Result<(), SessionError>;

    /// Whether `module` is currently listed as loaded.
    ///
    /// # Errors
    ///
    /// Fails if the module registry cannot be read.
    fn is_loaded(&mut self, module: &str) -> Result<bool, SessionError>;
}

/// [`ModuleLoader`] backed by `modprobe` and `/proc/modules`.
///
/// The loader process is waited on without a timeout.
#[derive(Debug, Clone)]
pub struct Modprobe {
    program: PathBuf,
    modules: PathBuf,
}

impl Default for Modprobe {
    fn default() -> Self {
        Self::new("modprobe", "/proc/modules")
    }
}

impl Modprobe {
    /// Uses `program` as the loader and `modules` as the registry.
    pub fn new(program: impl Into<PathBuf>, modules: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            modules: modules.into(),
        }
    }

    fn run(&self, action: LoaderAction, module: &str) -> Result<(), SessionError> {
        let mut cmd = Command::new(&self.program);
        if action == LoaderAction::Unload {
            cmd.arg("-r");
        }
        cmd.arg(module).stdin(Stdio::null());
        debug!("running {cmd:?}");

        let status = cmd.status().map_err(|source| SessionError::Loader {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(SessionError::LoaderFailed {
                action,
                module: module.to_owned(),
                status,
            });
        }
        Ok(())
    }
}

impl ModuleLoader for Modprobe {
    fn load(&mut self, module: &str) -> Result<(), SessionError> {
        info!("loading module {module}");
        self.run(LoaderAction::Load, module)
    }

    fn unload(&mut self, module: &str) -> Result<(), SessionError> {
        info!("unloading module {module}");
        self.run(LoaderAction::Unload, module)
    }

    fn is_loaded(&mut self, module: &str) -> Result<bool, SessionError> {
        let listing =
            fs::read_to_string(&self.modules).map_err(|source| SessionError::ModuleList {
                path: self.modules.clone(),
                source,
            })?;
        Ok(module_listed(&listing, module))
    }
}

/// Whether a `/proc/modules` style listing names `module`.
///
/// Only the first whitespace-separated field of each line is compared, and it
/// must match exactly.
#[must_use]
pub fn module_listed(listing: &str, module: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().next() == Some(module))
}

/// An open runtime services device plus the module it may own.
///
/// The session implements [`RuntimeDevice`] itself, so it can be handed
/// directly to the call wrappers in this crate.
#[derive(Debug)]
pub struct DriverSession<L: ModuleLoader = Modprobe> {
    // Declared before `module` so the node is closed before any unload.
    device: Device,
    module: ModuleGuard<L>,
}

/// The loader plus the module a session is responsible for unloading.
///
/// Unloads on drop, so a module is released even when opening its node fails.
#[derive(Debug)]
struct ModuleGuard<L: ModuleLoader> {
    owned: Option<String>,
    loader: L,
}

impl<L: ModuleLoader> ModuleGuard<L> {
    fn release(&mut self) -> Result<(), SessionError> {
        let Some(module) = self.owned.take() else {
            return Ok(());
        };
        if !self.loader.is_loaded(&module)? {
            warn!("module {module} was already unloaded");
            return Ok(());
        }
        self.loader.unload(&module)?;
        if self.loader.is_loaded(&module)? {
            return Err(SessionError::UnloadFailed { module });
        }
        Ok(())
    }
}

impl<L: ModuleLoader> Drop for ModuleGuard<L> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("driver teardown failed: {err}");
        }
    }
}

impl<L: ModuleLoader> DriverSession<L> {
    /// Finds a usable driver, loading one if necessary, and opens its device.
    ///
    /// Candidates are tried in order:
    ///
    /// 1. the first candidate whose device node already exists is opened and
    ///    the session does not own its module;
    /// 2. if any candidate module is loaded without its node, the system is in
    ///    an inconsistent state and nothing is loaded;
    /// 3. otherwise each module is loaded in turn until one is listed as loaded
    ///    and its node exists. A module that loads without producing its node is
    ///    unloaded again before moving on.
    ///
    /// # Errors
    ///
    /// [`SessionError::InconsistentModule`] for case 2,
    /// [`SessionError::DriverUnavailable`] when no candidate works, and
    /// [`SessionError::Open`] if the node cannot be opened. In the last case a
    /// module loaded by this call is unloaded before returning.
    pub fn start(loader: L, candidates: &[DriverCandidate]) -> Result<Self, SessionError> {
        Self::locate(loader, candidates, true)
    }

    /// Like [`start`](Self::start) but never loads a module.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn attach(loader: L, candidates: &[DriverCandidate]) -> Result<Self, SessionError> {
        Self::locate(loader, candidates, false)
    }

    /// Opens `path` directly, without any module management.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Open`] if the node cannot be opened.
    pub fn open_path(loader: L, path: impl AsRef<Path>) -> Result<Self, SessionError> {
        Self::open(loader, path.as_ref(), None)
    }

    fn locate(
        mut loader: L,
        candidates: &[DriverCandidate],
        allow_load: bool,
    ) -> Result<Self, SessionError> {
        if let Some(found) = candidates.iter().find(|c| c.device.exists()) {
            debug!("found existing device {}", found.device.display());
            return Self::open(loader, &found.device, None);
        }

        for candidate in candidates {
            if loader.is_loaded(&candidate.module)? {
                return Err(SessionError::InconsistentModule {
                    module: candidate.module.clone(),
                });
            }
        }

        if allow_load {
            for candidate in candidates {
                if try_load(&mut loader, candidate) {
                    return Self::open(loader, &candidate.device, Some(candidate.module.clone()));
                }
            }
        }

        let tried = candidates
            .iter()
            .map(|c| c.module.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(SessionError::DriverUnavailable { tried })
    }

    fn open(loader: L, path: &Path, owned_module: Option<String>) -> Result<Self, SessionError> {
        // Guard first: a failed open drops it and releases the module.
        let module = ModuleGuard {
            owned: owned_module,
            loader,
        };
        let device = Device::open(path).map_err(|source| SessionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { device, module })
    }

    /// Path of the open device node.
    #[must_use]
    pub fn device_path(&self) -> &Path {
        self.device.path()
    }

    /// The module this session loaded and will unload, if any.
    #[must_use]
    pub fn owned_module(&self) -> Option<&str> {
        self.module.owned.as_deref()
    }

    /// Closes the device and unloads the module if this session loaded it.
    ///
    /// # Errors
    ///
    /// Reports loader failures and [`SessionError::UnloadFailed`] when the
    /// module is still listed afterwards.
    pub fn close(self) -> Result<(), SessionError> {
        let Self { device, mut module } = self;
        drop(device);
        module.release()
    }
}

/// Loads one candidate and checks that it produced its device node.
fn try_load<L: ModuleLoader>(loader: &mut L, candidate: &DriverCandidate) -> bool {
    let module = candidate.module.as_str();
    if let Err(err) = loader.load(module) {
        warn!("{err}");
        return false;
    }

    match loader.is_loaded(module) {
        Ok(true) if candidate.device.exists() => return true,
        Ok(true) => warn!(
            "module {module} loaded but {} did not appear",
            candidate.device.display()
        ),
        Ok(false) => {
            warn!("module {module} is not listed after loading");
            return false;
        }
        Err(err) => warn!("cannot verify module {module}: {err}"),
    }

    if let Err(err) = loader.unload(module) {
        warn!("{err}");
    }
    false
}

impl<L: ModuleLoader> RuntimeDevice for DriverSession<L> {
    fn get_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: &mut u32,
        data: &mut [u8],
        data_size: &mut usize,
    ) -> Result<EfiStatus, Error> {
        self.device.get_variable(name, guid, attributes, data, data_size)
    }

    fn set_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: u32,
        data: &[u8],
    ) -> Result<EfiStatus, Error> {
        self.device.set_variable(name, guid, attributes, data)
    }

    fn get_next_variable_name(
        &mut self,
        name: &mut [u16],
        name_size: &mut usize,
        guid: &mut EfiGuid,
    ) -> Result<EfiStatus, Error> {
        self.device.get_next_variable_name(name, name_size, guid)
    }

    fn get_time(
        &mut self,
        time: &mut EfiTime,
        capabilities: &mut EfiTimeCapabilities,
    ) -> Result<EfiStatus, Error> {
        self.device.get_time(time, capabilities)
    }

    fn set_time(&mut self, time: &EfiTime) -> Result<EfiStatus, Error> {
        self.device.set_time(time)
    }

    fn get_wakeup_time(
        &mut self,
        enabled: &mut bool,
        pending: &mut bool,
        time: &mut EfiTime,
    ) -> Result<EfiStatus, Error> {
        self.device.get_wakeup_time(enabled, pending, time)
    }

    fn set_wakeup_time(
        &mut self,
        enabled: bool,
        time: Option<&EfiTime>,
    ) -> Result<EfiStatus, Error> {
        self.device.set_wakeup_time(enabled, time)
    }

    fn query_variable_info(
        &mut self,
        attributes: u32,
        info: &mut VariableStorageInfo,
    ) -> Result<EfiStatus, Error> {
        self.device.query_variable_info(attributes, info)
    }

    fn get_next_high_monotonic_count(&mut self, count: &mut u32) -> Result<EfiStatus, Error> {
        self.device.get_next_high_monotonic_count(count)
    }

    fn reset_system(
        &mut self,
        reset_type: ResetType,
        status: EfiStatus,
        data: &[u8],
    ) -> Result<(), Error> {
        self.device.reset_system(reset_type, status, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
efi_test 16384 0 - Live 0x0000000000000000
efivarfs 20480 1 - Live 0x0000000000000000
efi_runtime_extra 12288 0 - Live 0x0000000000000000
";

    #[test]
    fn listing_matches_whole_first_field() {
        assert!(module_listed(LISTING, "efi_test"));
        assert!(module_listed(LISTING, "efivarfs"));
        assert!(!module_listed(LISTING, "efi_runtime"));
        assert!(!module_listed(LISTING, "efi"));
        assert!(!module_listed(LISTING, "16384"));
        assert!(!module_listed("", "efi_test"));
    }

    #[test]
    fn default_candidates() {
        let candidates = DriverCandidate::defaults();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].module, "efi_runtime");
        assert_eq!(candidates[0].device, Path::new("/dev/efi_runtime"));
        assert_eq!(candidates[1].module, "efi_test");
        assert_eq!(candidates[1].device, Path::new("/dev/efi_test"));
    }

    #[test]
    fn unreadable_registry_is_reported() {
        let mut loader = Modprobe::new(
            "modprobe",
            std::env::temp_dir().join("efi-runtime-no-such-registry"),
        );
        assert!(matches!(
            loader.is_loaded("efi_test"),
            Err(SessionError::ModuleList { .. })
        ));
    }

    #[test]
    fn missing_loader_is_reported() {
        let mut loader = Modprobe::new(
            std::env::temp_dir().join("efi-runtime-no-such-loader"),
            "/proc/modules",
        );
        assert!(matches!(
            loader.load("efi_test"),
            Err(SessionError::Loader { .. })
        ));
    }

    #[test]
    fn failing_loader_exit_is_reported() {
        let mut loader = Modprobe::new("/bin/false", "/proc/modules");
        let err = loader.unload("efi_test").unwrap_err();
        assert!(matches!(
            err,
            SessionError::LoaderFailed { action: LoaderAction::Unload, ref module, status }
                if module == "efi_test" && !status.success()
        ));

        let mut loader = Modprobe::new("/bin/true", "/proc/modules");
        loader.load("efi_test").unwrap();
        loader.unload("efi_test").unwrap();
    }
}
