//! High-level operations.
//!
//! This module contains the implementation of socstage commands.

pub mod inspect;
pub mod setup;
pub mod target;

pub use inspect::{files, params, RenderedParam};
pub use setup::{setup, BuildDescription, SetupResult, BUILD_DESCRIPTION_FILE};
pub use target::{open_target, TargetOptions};
