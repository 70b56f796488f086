//! Core trait - the interface every hardware-design core exposes.

use std::path::Path;

use anyhow::Result;

use crate::core::{CoreFile, CoreName, Flags, Parameter};
use crate::sources::FetchError;

/// A reusable unit of hardware-design sources and build parameters.
///
/// Cores are created and owned by a [`DependencySource`]; the build engine
/// only queries them and invokes their capabilities.
///
/// [`DependencySource`]: crate::library::DependencySource
pub trait Core {
    /// The core's identifier.
    fn name(&self) -> &CoreName;

    /// Filesystem-safe form of the name.
    fn sanitized_name(&self) -> String {
        self.name().sanitized()
    }

    /// Where the core's files live before staging.
    fn files_root(&self) -> &Path;

    /// Make the core's files available locally.
    fn fetch(&mut self) -> Result<(), FetchError>;

    /// Copy the files selected by `flags` into `dst`.
    fn export(&self, dst: &Path, flags: &Flags) -> Result<()>;

    /// Parameters declared under `flags`, in declaration order.
    fn parameters(&self, flags: &Flags) -> Vec<Parameter>;

    /// Files selected by `flags`, in declaration order.
    fn files(&self, flags: &Flags) -> Vec<CoreFile>;
}
