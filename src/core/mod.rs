//! Core data structures.
//!
//! This module contains the types shared by the build engine and the core
//! library:
//! - Core identifiers (CoreName)
//! - Parameter and file declarations
//! - Query flags
//! - The `Core` trait and its manifest-backed implementation

pub mod core_name;
pub mod file;
pub mod flags;
pub mod hdl_core;
pub mod manifest;
pub mod parameter;

pub use core_name::CoreName;
pub use file::CoreFile;
pub use flags::{Flags, Flow};
pub use hdl_core::Core;
pub use manifest::{ManifestCore, ManifestError, MANIFEST_SUFFIX};
pub use parameter::{DataType, ParamCategory, ParamValue, Parameter};
