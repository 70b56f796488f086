//! socstage CLI - stage hardware-design cores for EDA tools

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use socstage::core::ManifestError;
use socstage::library::LibraryError;
use socstage::sources::FetchError;
use socstage::EdaError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        // Parameter parse errors (and `-- --help`) are reported by clap.
        if let Some(clap_err) = e.downcast_ref::<EdaError>().and_then(EdaError::as_clap_error) {
            clap_err.exit();
        }

        eprintln!("error: {:#}", e);
        if let Some(help) = help_for(&e) {
            eprintln!("help: {}", help);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("socstage=debug")
    } else {
        EnvFilter::new("socstage=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Setup(args) => commands::setup::execute(args),
        Commands::Files(args) => commands::files::execute(args),
        Commands::Params(args) => commands::params::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Help text of the first diagnostic in the error chain that has one.
fn help_for(e: &anyhow::Error) -> Option<String> {
    e.chain().find_map(|cause| {
        let diagnostic: &dyn Diagnostic = if let Some(d) = cause.downcast_ref::<EdaError>() {
            d
        } else if let Some(d) = cause.downcast_ref::<LibraryError>() {
            d
        } else if let Some(d) = cause.downcast_ref::<FetchError>() {
            d
        } else if let Some(d) = cause.downcast_ref::<ManifestError>() {
            d
        } else {
            return None;
        };
        diagnostic.help().map(|h| h.to_string())
    })
}
