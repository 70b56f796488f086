//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use socstage::{Flow, ParamCategory};

/// socstage - stage hardware-design cores for EDA tools
#[derive(Parser)]
#[command(name = "socstage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage a system's cores and write its build description
    Setup(TargetArgs),

    /// Show the files a system is built from
    Files(FilesArgs),

    /// Show a system's parameters after parsing
    Params(ParamsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct TargetArgs {
    /// System core, e.g. `acme:soc:top:1.0` or `top` (default: build.toplevel)
    pub system: Option<String>,

    /// Tool the build is for, e.g. `icarus` or `vivado`
    #[arg(short, long)]
    pub tool: String,

    /// Kind of flow (sim or synth)
    #[arg(long, default_value = "sim")]
    pub flow: Flow,

    /// Reference core files where they are instead of copying them
    #[arg(long)]
    pub no_export: bool,

    /// Root directory for build trees
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<PathBuf>,

    /// Directory to search for core manifests (repeatable)
    #[arg(long = "cores-root", value_name = "DIR")]
    pub cores_root: Vec<PathBuf>,

    /// Parameter category to accept (repeatable; default depends on the flow)
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<ParamCategory>,

    /// Core parameters, e.g. `-- --width 16`
    #[arg(last = true, value_name = "PARAMS")]
    pub params: Vec<String>,
}

#[derive(Args)]
pub struct FilesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the fileset as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ParamsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Wrap string values in double quotes
    #[arg(long)]
    pub quote: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
