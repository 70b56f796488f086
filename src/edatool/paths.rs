//! Build directory layout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{CoreName, Flow};
use crate::util::paths::absolute;

/// Environment variable holding the system's build root.
///
/// Kept for cores that predate `SRC_ROOT` and `WORK_ROOT`.
pub const BUILD_ROOT_ENV: &str = "BUILD_ROOT";
pub const SRC_ROOT_ENV: &str = "SRC_ROOT";
pub const WORK_ROOT_ENV: &str = "WORK_ROOT";

/// Where a system's sources are staged and where the tool runs.
///
/// ```text
/// <root>/<system>/
///     src/<core>/          staged core sources
///     <flow>-<tool>/       tool work directory
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPaths {
    pub build_root: PathBuf,
    pub src_root: PathBuf,
    pub work_root: PathBuf,
}

impl BuildPaths {
    /// Layout for `system` under the configured `root`.
    ///
    /// All paths are absolute and lexically normalized.
    pub fn new(root: &Path, system: &CoreName, flow: Flow, tool: &str) -> Self {
        let build_root = absolute(root).join(system.sanitized());
        let src_root = build_root.join("src");
        let work_root = build_root.join(format!("{}-{}", flow, tool));

        BuildPaths {
            build_root,
            src_root,
            work_root,
        }
    }

    /// Destination of a core's staged sources.
    pub fn staged_dir(&self, sanitized_name: &str) -> PathBuf {
        self.src_root.join(sanitized_name)
    }

    /// Variables handed to downstream tool processes.
    pub fn tool_env(&self) -> Vec<(&'static str, String)> {
        vec![
            (BUILD_ROOT_ENV, self.build_root.display().to_string()),
            (SRC_ROOT_ENV, self.src_root.display().to_string()),
            (WORK_ROOT_ENV, self.work_root.display().to_string()),
        ]
    }
}
