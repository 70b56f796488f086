//! Opening a build target: config, core library and engine.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::{Core, CoreName, Flow, ParamCategory};
use crate::edatool::{EdaTool, ToolConfig};
use crate::library::CoreLibrary;
use crate::util::GlobalContext;

/// What to build and how, as given on the command line.
///
/// Unset fields fall back to the configuration files.
#[derive(Debug, Clone)]
pub struct TargetOptions {
    /// System core; `build.toplevel` when unset
    pub system: Option<String>,

    pub tool: String,

    pub flow: Flow,

    /// Override `build.export`
    pub export: Option<bool>,

    /// Override `build.build_root`
    pub build_root: Option<PathBuf>,

    /// Override `library.cores_root`
    pub cores_root: Vec<PathBuf>,

    /// Parameter categories to accept; the flow's defaults when unset
    pub categories: Option<Vec<ParamCategory>>,

    /// Parameter arguments, e.g. `["--width", "16"]`
    pub args: Vec<String>,
}

impl TargetOptions {
    pub fn new(tool: impl Into<String>, flow: Flow) -> Self {
        TargetOptions {
            system: None,
            tool: tool.into(),
            flow,
            export: None,
            build_root: None,
            cores_root: Vec::new(),
            categories: None,
            args: Vec::new(),
        }
    }

    pub fn categories(&self) -> Vec<ParamCategory> {
        self.categories
            .clone()
            .unwrap_or_else(|| self.flow.default_categories().to_vec())
    }
}

/// Discover the core library and create the engine for the target.
pub fn open_target(ctx: &GlobalContext, opts: &TargetOptions) -> Result<EdaTool> {
    let config = ctx.config();

    let Some(system) = opts.system.clone().or_else(|| config.build.toplevel.clone()) else {
        bail!(
            "no system core given\n\
             help: name one on the command line or set `build.toplevel` in .socstage/config.toml"
        );
    };

    let roots: Vec<PathBuf> = if !opts.cores_root.is_empty() {
        opts.cores_root.clone()
    } else if !config.library.cores_root.is_empty() {
        config.library.cores_root.clone()
    } else {
        vec![ctx.cwd().to_path_buf()]
    };
    let roots: Vec<PathBuf> = roots.iter().map(|r| ctx.resolve_path(r)).collect();

    let mut library = CoreLibrary::discover(&roots, &ctx.cache_dir(), &config.fetch_options());
    if library.is_empty() {
        tracing::warn!("no cores found under {}", display_roots(&roots));
    }

    let system = library.resolve(&CoreName::parse(&system))?.name().clone();

    let build_root = opts
        .build_root
        .clone()
        .or_else(|| config.build.build_root.clone())
        .unwrap_or_else(|| PathBuf::from("build"));

    let tool_config = ToolConfig::new(opts.tool.clone(), opts.flow, ctx.resolve_path(&build_root))
        .with_export(opts.export.unwrap_or_else(|| config.export()));

    EdaTool::new(system, tool_config, &mut library)
}

fn display_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
