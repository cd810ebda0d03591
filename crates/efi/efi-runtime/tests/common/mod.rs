//! Shared fixtures: an in-memory firmware, a scripted module loader and
//! scratch directories.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use efi_runtime::Error;
use efi_runtime::session::{ModuleLoader, SessionError};
use efi_runtime::RuntimeDevice;
use efi_types::name::UNIT_SIZE;
use efi_types::{
    EfiGuid, EfiStatus, EfiTime, EfiTimeCapabilities, ResetType, VariableStorageInfo,
};
use nix::errno::Errno;

// ---------------------------------------------------------------------------
// Stub device
// ---------------------------------------------------------------------------

/// One stored variable.
#[derive(Debug, Clone)]
pub struct StoredVariable {
    pub name: String,
    pub guid: EfiGuid,
    pub attributes: u32,
    pub data: Vec<u8>,
}

/// A `SetVariable` request as the device saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCall {
    pub name: String,
    pub guid: EfiGuid,
    pub attributes: u32,
    pub data_len: usize,
}

/// In-memory firmware answering every request the way a real variable store
/// and clock would.
#[derive(Debug, Default)]
pub struct StubDevice {
    pub store: Vec<StoredVariable>,
    /// Capacities offered to each `GetVariable`.
    pub get_capacities: Vec<usize>,
    pub set_calls: Vec<SetCall>,
    pub next_name_calls: usize,
    /// Answer the n-th `GetNextVariableName` (1-based) with this status.
    pub fail_next_name_at: Option<(usize, EfiStatus)>,
    /// Every `BUFFER_TOO_SMALL` answer makes the variable this much larger,
    /// simulating a variable that changes between reads.
    pub growth_per_read: usize,
    /// Fail every request with this errno before reaching firmware.
    pub broken: Option<Errno>,
    pub time: EfiTime,
    pub capabilities: EfiTimeCapabilities,
    pub alarm: Option<EfiTime>,
    pub alarm_pending: bool,
    /// `(enabled, time passed)` for each `SetWakeupTime`.
    pub wakeup_calls: Vec<(bool, Option<EfiTime>)>,
    pub storage: VariableStorageInfo,
    pub queried_attributes: Vec<u32>,
    pub monotonic: u32,
    pub resets: Vec<(ResetType, EfiStatus, Vec<u8>)>,
}

impl StubDevice {
    pub fn with_variables(variables: &[(&str, EfiGuid, &[u8])]) -> Self {
        Self {
            store: variables
                .iter()
                .map(|&(name, guid, data)| StoredVariable {
                    name: name.to_owned(),
                    guid,
                    attributes: 0x7,
                    data: data.to_vec(),
                })
                .collect(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), Error> {
        match self.broken {
            Some(source) => Err(Error::Ioctl {
                request: "STUB",
                source,
            }),
            None => Ok(()),
        }
    }

    fn find(&self, name: &str, guid: &EfiGuid) -> Option<usize> {
        self.store
            .iter()
            .position(|v| v.name == name && v.guid == *guid)
    }
}

/// Reads a null-terminated wire name back into a string.
pub fn wire_to_string(name: &[u16]) -> String {
    name.iter()
        .take_while(|&&unit| unit != 0)
        .map(|&unit| char::from(u8::try_from(unit).unwrap()))
        .collect()
}

impl RuntimeDevice for StubDevice {
    fn get_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: &mut u32,
        data: &mut [u8],
        data_size: &mut usize,
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        self.get_capacities.push(data.len());
        let growth = self.growth_per_read;
        let Some(index) = self.find(&wire_to_string(name), guid) else {
            return Ok(EfiStatus::NOT_FOUND);
        };
        let variable = &mut self.store[index];
        if data.len() < variable.data.len() {
            *data_size = variable.data.len();
            variable.data.resize(variable.data.len() + growth, 0xee);
            return Ok(EfiStatus::BUFFER_TOO_SMALL);
        }
        data[..variable.data.len()].copy_from_slice(&variable.data);
        *data_size = variable.data.len();
        *attributes = variable.attributes;
        Ok(EfiStatus::SUCCESS)
    }

    fn set_variable(
        &mut self,
        name: &[u16],
        guid: &EfiGuid,
        attributes: u32,
        data: &[u8],
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        let name = wire_to_string(name);
        self.set_calls.push(SetCall {
            name: name.clone(),
            guid: *guid,
            attributes,
            data_len: data.len(),
        });
        match (self.find(&name, guid), data.is_empty()) {
            (Some(index), true) => {
                self.store.remove(index);
            }
            (None, true) => return Ok(EfiStatus::NOT_FOUND),
            (Some(index), false) => {
                self.store[index].data = data.to_vec();
                self.store[index].attributes = attributes;
            }
            (None, false) => self.store.push(StoredVariable {
                name,
                guid: *guid,
                attributes,
                data: data.to_vec(),
            }),
        }
        Ok(EfiStatus::SUCCESS)
    }

    fn get_next_variable_name(
        &mut self,
        name: &mut [u16],
        name_size: &mut usize,
        guid: &mut EfiGuid,
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        self.next_name_calls += 1;
        if let Some((call, status)) = self.fail_next_name_at {
            if call == self.next_name_calls {
                return Ok(status);
            }
        }
        let previous = wire_to_string(name);
        let next = if previous.is_empty() {
            0
        } else {
            match self.find(&previous, guid) {
                Some(index) => index + 1,
                None => return Ok(EfiStatus::INVALID_PARAMETER),
            }
        };
        let Some(variable) = self.store.get(next) else {
            return Ok(EfiStatus::NOT_FOUND);
        };

        let required = (variable.name.len() + 1) * UNIT_SIZE;
        if *name_size < required {
            *name_size = required;
            return Ok(EfiStatus::BUFFER_TOO_SMALL);
        }
        for (unit, byte) in name.iter_mut().zip(variable.name.bytes()) {
            *unit = u16::from(byte);
        }
        name[variable.name.len()] = 0;
        *name_size = required;
        *guid = variable.guid;
        Ok(EfiStatus::SUCCESS)
    }

    fn get_time(
        &mut self,
        time: &mut EfiTime,
        capabilities: &mut EfiTimeCapabilities,
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        *time = self.time;
        *capabilities = self.capabilities;
        Ok(EfiStatus::SUCCESS)
    }

    fn set_time(&mut self, time: &EfiTime) -> Result<EfiStatus, Error> {
        self.check()?;
        if time.month == 0 || time.month > 12 {
            return Ok(EfiStatus::INVALID_PARAMETER);
        }
        self.time = *time;
        Ok(EfiStatus::SUCCESS)
    }

    fn get_wakeup_time(
        &mut self,
        enabled: &mut bool,
        pending: &mut bool,
        time: &mut EfiTime,
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        *enabled = self.alarm.is_some();
        *pending = self.alarm_pending;
        *time = self.alarm.unwrap_or_default();
        Ok(EfiStatus::SUCCESS)
    }

    fn set_wakeup_time(
        &mut self,
        enabled: bool,
        time: Option<&EfiTime>,
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        self.wakeup_calls.push((enabled, time.copied()));
        self.alarm = if enabled { time.copied() } else { None };
        Ok(EfiStatus::SUCCESS)
    }

    fn query_variable_info(
        &mut self,
        attributes: u32,
        info: &mut VariableStorageInfo,
    ) -> Result<EfiStatus, Error> {
        self.check()?;
        self.queried_attributes.push(attributes);
        *info = self.storage;
        Ok(EfiStatus::SUCCESS)
    }

    fn get_next_high_monotonic_count(&mut self, count: &mut u32) -> Result<EfiStatus, Error> {
        self.check()?;
        self.monotonic += 1;
        *count = self.monotonic;
        Ok(EfiStatus::SUCCESS)
    }

    fn reset_system(
        &mut self,
        reset_type: ResetType,
        status: EfiStatus,
        data: &[u8],
    ) -> Result<(), Error> {
        self.check()?;
        self.resets.push((reset_type, status, data.to_vec()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fake module loader
// ---------------------------------------------------------------------------

/// What a loaded module does to its device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeBehaviour {
    /// A regular file appears at the node path.
    Appears,
    /// Nothing appears.
    Missing,
    /// Something that cannot be opened read-write appears.
    Unopenable,
}

#[derive(Debug, Default)]
pub struct LoaderState {
    pub loaded: HashSet<String>,
    /// `load <module>` / `unload <module>` in call order.
    pub calls: Vec<String>,
    pub nodes: HashMap<String, (PathBuf, NodeBehaviour)>,
    pub refuse_load: HashSet<String>,
    pub refuse_unload: HashSet<String>,
}

impl LoaderState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn loads(&self) -> usize {
        self.calls.iter().filter(|c| c.starts_with("load ")).count()
    }
}

/// [`ModuleLoader`] that simulates module insertion by creating node files.
///
/// The state is shared so tests can inspect it after the session has taken
/// ownership of the loader.
#[derive(Debug, Clone, Default)]
pub struct FakeLoader(pub Rc<RefCell<LoaderState>>);

impl FakeLoader {
    pub fn module(&self, module: &str, node: &Path, behaviour: NodeBehaviour) -> &Self {
        self.0
            .borrow_mut()
            .nodes
            .insert(module.to_owned(), (node.to_path_buf(), behaviour));
        self
    }

    pub fn state(&self) -> std::cell::Ref<'_, LoaderState> {
        self.0.borrow()
    }
}

impl ModuleLoader for FakeLoader {
    fn load(&mut self, module: &str) -> Result<(), SessionError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(format!("load {module}"));
        if state.refuse_load.contains(module) {
            return Err(SessionError::Loader {
                program: "fake-modprobe".into(),
                source: io::Error::other("refused"),
            });
        }
        state.loaded.insert(module.to_owned());
        match state.nodes.get(module) {
            Some((node, NodeBehaviour::Appears)) => fs::write(node, b"").unwrap(),
            Some((node, NodeBehaviour::Unopenable)) => fs::create_dir(node).unwrap(),
            Some((_, NodeBehaviour::Missing)) | None => {}
        }
        Ok(())
    }

    fn unload(&mut self, module: &str) -> Result<(), SessionError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(format!("unload {module}"));
        if state.refuse_unload.contains(module) {
            return Ok(());
        }
        state.loaded.remove(module);
        if let Some((node, _)) = state.nodes.get(module) {
            if node.is_dir() {
                fs::remove_dir(node).unwrap();
            } else if node.exists() {
                fs::remove_file(node).unwrap();
            }
        }
        Ok(())
    }

    fn is_loaded(&mut self, module: &str) -> Result<bool, SessionError> {
        Ok(self.0.borrow().loaded.contains(module))
    }
}

// ---------------------------------------------------------------------------
// Scratch directories
// ---------------------------------------------------------------------------

/// A fresh directory under the system temp dir, removed on drop.
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!("efi-runtime-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
