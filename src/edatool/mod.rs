//! The build engine.
//!
//! An [`EdaTool`] is created for one system core, one tool and one flow. It
//! asks a [`DependencySource`] for the system's cores (dependencies first)
//! and then:
//!
//! - stages them into the build tree ([`EdaTool::configure`]),
//! - turns their parameters into a command-line schema and parses user
//!   values ([`EdaTool::parse_args`]),
//! - merges their file lists relative to the work root
//!   ([`EdaTool::resolve_files`]).
//!
//! Tool backends consume the results and render values with
//! [`render_value`].

pub mod error;
pub mod fileset;
pub mod params;
pub mod paths;
pub mod render;
mod stage;

use std::path::PathBuf;

use anyhow::Result;

use crate::core::{Core, CoreName, Flags, Flow};
use crate::library::DependencySource;
use crate::util::ToolInvocation;

pub use error::EdaError;
pub use fileset::Fileset;
pub use params::{ParamSchema, ParamSpec, ParamStore};
pub use paths::BuildPaths;
pub use render::render_value;

/// Settings fixed for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Tool identifier, e.g. `icarus` or `vivado`
    pub tool: String,

    pub flow: Flow,

    /// Copy core sources into `src_root` before the tool runs
    pub export: bool,

    /// Configured root; the system's build root lives below it
    pub build_root: PathBuf,
}

impl ToolConfig {
    pub fn new(tool: impl Into<String>, flow: Flow, build_root: impl Into<PathBuf>) -> Self {
        ToolConfig {
            tool: tool.into(),
            flow,
            export: true,
            build_root: build_root.into(),
        }
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }
}

/// Build engine for one system, tool and flow.
pub struct EdaTool {
    system: CoreName,
    config: ToolConfig,
    paths: BuildPaths,
    cores: Vec<Box<dyn Core>>,
    params: ParamStore,
    parsed: bool,
}

impl EdaTool {
    /// Create an engine, fetching the system's cores from `source`.
    ///
    /// `system` must be the full name of the system core, since cores are
    /// matched against it to decide which one is the top level.
    pub fn new(
        system: CoreName,
        config: ToolConfig,
        source: &mut dyn DependencySource,
    ) -> Result<Self> {
        let flags = Flags::new(config.tool.clone(), config.flow);
        let cores = source.get_depends(&system, &flags)?;
        Ok(Self::with_cores(system, config, cores))
    }

    /// Create an engine over an already ordered list of cores.
    pub fn with_cores(system: CoreName, config: ToolConfig, cores: Vec<Box<dyn Core>>) -> Self {
        let paths = BuildPaths::new(&config.build_root, &system, config.flow, &config.tool);
        tracing::debug!(
            "{} cores for {} ({} with {}), work root {}",
            cores.len(),
            system,
            config.flow,
            config.tool,
            paths.work_root.display()
        );

        EdaTool {
            system,
            config,
            paths,
            cores,
            params: ParamStore::default(),
            parsed: false,
        }
    }

    pub fn system(&self) -> &CoreName {
        &self.system
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    pub fn cores(&self) -> &[Box<dyn Core>] {
        &self.cores
    }

    /// Parameter values, empty until [`parse_args`](Self::parse_args) succeeds.
    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Flags for querying cores, with `is_toplevel` unset.
    pub fn flags(&self) -> Flags {
        Flags::new(self.config.tool.clone(), self.config.flow)
    }

    /// Whether `core` is the system being built.
    fn is_toplevel(&self, core: &dyn Core) -> bool {
        core.name() == &self.system
    }

    /// A command for the downstream tool, running in the work root with
    /// `BUILD_ROOT`, `SRC_ROOT` and `WORK_ROOT` set.
    pub fn tool_command(&self, program: &str) -> ToolInvocation {
        ToolInvocation::new(program)
            .envs(self.paths.tool_env())
            .current_dir(&self.paths.work_root)
    }
}
