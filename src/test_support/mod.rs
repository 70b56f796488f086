//! Test doubles for the build engine.
//!
//! `StubCore` is a scripted [`Core`]: it declares whatever files and
//! parameters a test gives it, can be told to fail its fetch, and records
//! every fetch and export into a shared [`EventLog`]. `StubSource` hands a
//! fixed list of stub cores to the engine as a [`DependencySource`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::core::{Core, CoreFile, CoreName, Flags, Parameter};
use crate::library::DependencySource;
use crate::sources::FetchError;

/// Something a stub core was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Fetch(String),
    Export {
        core: String,
        dst: PathBuf,
        is_toplevel: bool,
    },
}

/// Shared, ordered record of stub core activity.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Names of the cores that were exported, in order.
    pub fn exported(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Export { core, .. } => Some(core),
                Event::Fetch(_) => None,
            })
            .collect()
    }
}

/// A scripted core.
#[derive(Debug, Clone)]
pub struct StubCore {
    name: CoreName,
    files_root: PathBuf,
    files: Vec<CoreFile>,
    toplevel_files: Vec<CoreFile>,
    parameters: Vec<Parameter>,
    toplevel_parameters: Vec<Parameter>,
    fail_fetch: bool,
    log: EventLog,
}

impl StubCore {
    pub fn new(name: &str) -> Self {
        let name = CoreName::parse(name);
        StubCore {
            files_root: PathBuf::from("/cores").join(name.sanitized()),
            name,
            files: Vec::new(),
            toplevel_files: Vec::new(),
            parameters: Vec::new(),
            toplevel_parameters: Vec::new(),
            fail_fetch: false,
            log: EventLog::new(),
        }
    }

    pub fn with_files_root(mut self, files_root: impl Into<PathBuf>) -> Self {
        self.files_root = files_root.into();
        self
    }

    pub fn with_file(mut self, file: CoreFile) -> Self {
        self.files.push(file);
        self
    }

    /// A file only listed when this core is the top level.
    pub fn with_toplevel_file(mut self, file: CoreFile) -> Self {
        self.toplevel_files.push(file);
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// A parameter only declared when this core is the top level.
    pub fn with_toplevel_parameter(mut self, parameter: Parameter) -> Self {
        self.toplevel_parameters.push(parameter);
        self
    }

    /// Make `fetch` fail with a transport error.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = log.clone();
        self
    }
}

impl Core for StubCore {
    fn name(&self) -> &CoreName {
        &self.name
    }

    fn files_root(&self) -> &Path {
        &self.files_root
    }

    fn fetch(&mut self) -> Result<(), FetchError> {
        self.log.push(Event::Fetch(self.name.to_string()));

        if self.fail_fetch {
            return Err(FetchError::Http {
                url: format!("https://cores.example.com/{}.tar.gz", self.name.sanitized()),
                status: 503,
            });
        }
        Ok(())
    }

    fn export(&self, dst: &Path, flags: &Flags) -> Result<()> {
        std::fs::create_dir_all(dst)?;
        for file in self.files(flags).iter().filter(|f| !f.is_include_file) {
            let target = dst.join(&file.name);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, "")?;
        }

        self.log.push(Event::Export {
            core: self.name.to_string(),
            dst: dst.to_path_buf(),
            is_toplevel: flags.is_toplevel,
        });
        Ok(())
    }

    fn parameters(&self, flags: &Flags) -> Vec<Parameter> {
        let mut params = self.parameters.clone();
        if flags.is_toplevel {
            params.extend(self.toplevel_parameters.iter().cloned());
        }
        params
    }

    fn files(&self, flags: &Flags) -> Vec<CoreFile> {
        let mut files = self.files.clone();
        if flags.is_toplevel {
            files.extend(self.toplevel_files.iter().cloned());
        }
        files
    }
}

/// A dependency source returning a fixed, already ordered list of cores.
#[derive(Debug, Default)]
pub struct StubSource {
    cores: Vec<StubCore>,
    requests: Vec<(CoreName, Flags)>,
}

impl StubSource {
    pub fn new(cores: Vec<StubCore>) -> Self {
        StubSource {
            cores,
            requests: Vec::new(),
        }
    }

    /// Every `get_depends` call seen so far.
    pub fn requests(&self) -> &[(CoreName, Flags)] {
        &self.requests
    }
}

impl DependencySource for StubSource {
    fn get_depends(&mut self, system: &CoreName, flags: &Flags) -> Result<Vec<Box<dyn Core>>> {
        self.requests.push((system.clone(), flags.clone()));
        Ok(self
            .cores
            .iter()
            .cloned()
            .map(|c| Box::new(c) as Box<dyn Core>)
            .collect())
    }
}
