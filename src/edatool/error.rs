//! Build engine errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::sources::FetchError;

/// Error raised while staging, building the parameter schema or parsing
/// parameter values.
#[derive(Debug, Error, Diagnostic)]
pub enum EdaError {
    #[error("problem while fetching `{core}`")]
    #[diagnostic(code(socstage::stage::fetch))]
    Fetch {
        core: String,
        #[source]
        source: FetchError,
    },

    #[error("invalid data type `{datatype}` for parameter `{parameter}` in `{core}`")]
    #[diagnostic(
        code(socstage::params::invalid_datatype),
        help("Supported data types are: bool, int, str, file")
    )]
    InvalidDataType {
        datatype: String,
        parameter: String,
        core: String,
    },

    #[error("invalid parameter name `{parameter}` in `{core}`")]
    #[diagnostic(
        code(socstage::params::invalid_name),
        help("Parameter names must be non-empty, must not start with `-` and must not contain whitespace or `=`")
    )]
    InvalidName { parameter: String, core: String },

    #[error("invalid default `{default}` for {datatype} parameter `{parameter}` in `{core}`")]
    #[diagnostic(code(socstage::params::invalid_default))]
    InvalidDefault {
        default: String,
        datatype: String,
        parameter: String,
        core: String,
    },

    #[error("failed to prepare work directory {}", .path.display())]
    #[diagnostic(code(socstage::stage::filesystem))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to export `{core}` to {}", .dst.display())]
    #[diagnostic(code(socstage::stage::export))]
    Export {
        core: String,
        dst: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(socstage::params::parse))]
    ArgParse(clap::Error),
}

impl EdaError {
    /// The clap error behind a parse failure, so callers can let clap
    /// render it and pick the exit code.
    pub fn as_clap_error(&self) -> Option<&clap::Error> {
        match self {
            EdaError::ArgParse(e) => Some(e),
            _ => None,
        }
    }
}
