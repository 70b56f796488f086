//! socstage - stages hardware-design cores and synthesizes a tool-agnostic
//! build configuration.
//!
//! This crate provides the library behind the `socstage` binary: core
//! manifests and the core library, source providers, and the build engine
//! that stages cores, parses their parameters and merges their files.

pub mod core;
pub mod edatool;
pub mod library;
pub mod ops;
pub mod sources;
pub mod util;

/// Scripted cores and dependency sources for unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{Core, CoreFile, CoreName, Flags, Flow, ParamCategory, ParamValue, Parameter};
pub use edatool::{render_value, EdaError, EdaTool, Fileset, ParamStore, ToolConfig};
pub use library::{CoreLibrary, DependencySource};
pub use util::context::GlobalContext;
