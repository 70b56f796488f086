//! Merging the file lists of all cores.

use std::path::Path;

use serde::Serialize;

use crate::core::CoreFile;
use crate::edatool::EdaTool;
use crate::util::paths::relative_path;

/// Files for the downstream tool, relative to the work root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fileset {
    /// Source files in dependency order, then declaration order
    pub src_files: Vec<CoreFile>,

    /// Include directories in order of first appearance, without duplicates
    pub include_dirs: Vec<String>,
}

impl EdaTool {
    /// Collect every core's files, rewritten relative to the work root.
    ///
    /// Staged cores are referenced under `src_root`; without export the
    /// files are referenced where the core keeps them.
    pub fn resolve_files(&self) -> Fileset {
        let flags = self.flags();
        let mut fileset = Fileset::default();

        for core in &self.cores {
            let files_root = if self.config.export {
                self.paths.staged_dir(&core.sanitized_name())
            } else {
                core.files_root().to_path_buf()
            };
            let basepath = relative_path(&files_root, &self.paths.work_root);
            let core_flags = flags.toplevel(self.is_toplevel(core.as_ref()));

            for file in core.files(&core_flags) {
                if file.is_include_file {
                    let dir = join_base(&basepath, file.dirname());
                    if !fileset.include_dirs.contains(&dir) {
                        fileset.include_dirs.push(dir);
                    }
                } else {
                    let name = join_base(&basepath, &file.name);
                    fileset.src_files.push(file.with_name(name));
                }
            }
        }

        fileset
    }
}

fn join_base(base: &Path, name: &str) -> String {
    if name.is_empty() {
        base.display().to_string()
    } else {
        base.join(name).display().to_string()
    }
}
