//! `*.core.toml` manifest parsing and the manifest-backed [`Core`].
//!
//! ```toml
//! [core]
//! name = "acme:ip:uart:1.0"
//! depends = ["acme:ip:fifo"]
//!
//! [[fileset]]
//! name = "rtl"
//! file_type = "verilogSource"
//! files = ["rtl/uart.v", { name = "rtl/uart_defs.vh", is_include_file = true }]
//!
//! [[parameter]]
//! name = "width"
//! paramtype = "vlogparam"
//! datatype = "int"
//! default = "8"
//! ```

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::core::{Core, CoreFile, CoreName, Flags, Parameter};
use crate::sources::{FetchError, FetchOptions, Provider};
use crate::util::fs::{copy_dir_all, copy_file, ensure_dir, remove_dir_all_if_exists};

/// File name suffix identifying core manifests.
pub const MANIFEST_SUFFIX: &str = ".core.toml";

/// Error loading a core manifest.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("failed to read core manifest {}", .path.display())]
    #[diagnostic(code(socstage::manifest::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse core manifest {}", .path.display())]
    #[diagnostic(code(socstage::manifest::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("core manifest {} does not name its core", .path.display())]
    #[diagnostic(
        code(socstage::manifest::missing_name),
        help("Add `name = \"vendor:library:name:version\"` to the [core] section")
    )]
    MissingName { path: PathBuf },

    #[error("core manifest {} lists `{file}`, which is outside the core's directory", .path.display())]
    #[diagnostic(
        code(socstage::manifest::file_outside_core),
        help("File names must be relative paths without `..` components")
    )]
    FileOutsideCore { path: PathBuf, file: String },
}

/// Visibility of a fileset or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Visible to cores that depend on this one
    #[default]
    Public,
    /// Only used when this core is the top level
    Private,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    core: CoreSection,

    #[serde(default)]
    provider: Option<Provider>,

    #[serde(default)]
    fileset: Vec<FilesetDecl>,

    #[serde(default)]
    parameter: Vec<ParameterDecl>,
}

#[derive(Debug, Deserialize)]
struct CoreSection {
    name: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    depends: Vec<CoreName>,
}

/// A named group of files.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesetDecl {
    pub name: String,

    /// Default file type for entries that do not set one
    #[serde(default)]
    pub file_type: Option<String>,

    #[serde(default)]
    pub logical_name: Option<String>,

    /// Flows or tools this fileset is used by; empty means all
    #[serde(default)]
    pub usage: Vec<String>,

    #[serde(default)]
    pub scope: Scope,

    /// Extra dependencies pulled in when this fileset applies
    #[serde(default)]
    pub depends: Vec<CoreName>,

    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl FilesetDecl {
    fn applies(&self, flags: &Flags) -> bool {
        let used = self.usage.is_empty()
            || self
                .usage
                .iter()
                .any(|u| u == flags.flow.as_str() || *u == flags.tool);
        used && (self.scope == Scope::Public || flags.is_toplevel)
    }
}

/// A file entry: a bare path or a full table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Name(String),
    File(CoreFile),
}

impl FileEntry {
    pub fn name(&self) -> &str {
        match self {
            FileEntry::Name(name) => name,
            FileEntry::File(file) => &file.name,
        }
    }
}

/// Whether `name` stays below the directory it is joined onto.
fn stays_inside(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Clone, Deserialize)]
struct ParameterDecl {
    #[serde(flatten)]
    parameter: Parameter,

    #[serde(default)]
    scope: Scope,
}

/// A core described by a `*.core.toml` manifest.
#[derive(Debug, Clone)]
pub struct ManifestCore {
    name: CoreName,
    description: String,
    manifest_path: PathBuf,
    files_root: PathBuf,
    provider: Option<Provider>,
    fetch_opts: FetchOptions,
    depends: Vec<CoreName>,
    filesets: Vec<FilesetDecl>,
    parameters: Vec<ParameterDecl>,
}

impl ManifestCore {
    /// Load a manifest. Files are looked up next to it until a cache is set.
    pub fn load(manifest_path: &Path) -> Result<Self, ManifestError> {
        let contents =
            std::fs::read_to_string(manifest_path).map_err(|source| ManifestError::Read {
                path: manifest_path.to_path_buf(),
                source,
            })?;

        Self::parse(&contents, manifest_path)
    }

    /// Parse manifest text that was read from `manifest_path`.
    pub fn parse(contents: &str, manifest_path: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(contents).map_err(|source| ManifestError::Parse {
            path: manifest_path.to_path_buf(),
            source,
        })?;

        if raw.core.name.trim().is_empty() {
            return Err(ManifestError::MissingName {
                path: manifest_path.to_path_buf(),
            });
        }

        // Staging copies `files_root/<name>` to `dst/<name>`; an absolute name
        // would make both the same file.
        let outside = raw
            .fileset
            .iter()
            .flat_map(|fs| fs.files.iter())
            .find(|entry| !stays_inside(entry.name()));
        if let Some(entry) = outside {
            return Err(ManifestError::FileOutsideCore {
                path: manifest_path.to_path_buf(),
                file: entry.name().to_string(),
            });
        }

        let files_root = manifest_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Ok(ManifestCore {
            name: CoreName::parse(&raw.core.name),
            description: raw.core.description,
            manifest_path: manifest_path.to_path_buf(),
            files_root,
            provider: raw.provider,
            fetch_opts: FetchOptions::default(),
            depends: raw.core.depends,
            filesets: raw.fileset,
            parameters: raw.parameter,
        })
    }

    /// Place remote sources under `cache_dir/<sanitized name>`.
    ///
    /// Cores without a provider keep their files next to the manifest.
    pub fn with_cache(mut self, cache_dir: &Path, fetch_opts: FetchOptions) -> Self {
        if self.provider.is_some() {
            self.files_root = cache_dir.join(self.name.sanitized());
        }
        self.fetch_opts = fetch_opts;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }

    pub fn filesets(&self) -> &[FilesetDecl] {
        &self.filesets
    }

    /// Cores this one depends on under `flags`.
    pub fn depends(&self, flags: &Flags) -> Vec<CoreName> {
        let mut deps = self.depends.clone();
        for fileset in self.filesets.iter().filter(|fs| fs.applies(flags)) {
            for dep in &fileset.depends {
                if !deps.contains(dep) {
                    deps.push(dep.clone());
                }
            }
        }
        deps
    }
}

impl Core for ManifestCore {
    fn name(&self) -> &CoreName {
        &self.name
    }

    fn files_root(&self) -> &Path {
        &self.files_root
    }

    fn fetch(&mut self) -> Result<(), FetchError> {
        let Some(provider) = &self.provider else {
            return Ok(());
        };

        if self.files_root.exists() {
            tracing::debug!("{} already cached at {}", self.name, self.files_root.display());
            return Ok(());
        }

        provider.fetch(&self.files_root, &self.fetch_opts)
    }

    fn export(&self, dst: &Path, flags: &Flags) -> Result<()> {
        remove_dir_all_if_exists(dst)?;
        ensure_dir(dst)?;

        for file in self.files(flags) {
            let src = self.files_root.join(&file.name);
            let target = dst.join(&file.name);

            if src.is_dir() {
                copy_dir_all(&src, &target)?;
            } else {
                copy_file(&src, &target)
                    .with_context(|| format!("failed to export `{}` from {}", file.name, self.name))?;
            }
        }

        Ok(())
    }

    fn parameters(&self, flags: &Flags) -> Vec<Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.scope == Scope::Public || flags.is_toplevel)
            .map(|p| p.parameter.clone())
            .collect()
    }

    fn files(&self, flags: &Flags) -> Vec<CoreFile> {
        let mut files = Vec::new();

        for fileset in self.filesets.iter().filter(|fs| fs.applies(flags)) {
            for entry in &fileset.files {
                let mut file = match entry {
                    FileEntry::Name(name) => CoreFile::new(name.clone()),
                    FileEntry::File(file) => file.clone(),
                };
                if file.file_type.is_none() {
                    file.file_type = fileset.file_type.clone();
                }
                if file.logical_name.is_none() {
                    file.logical_name = fileset.logical_name.clone();
                }
                files.push(file);
            }
        }

        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Flow, ParamCategory};
    use tempfile::TempDir;

    const UART: &str = r#"
[core]
name = "acme:ip:uart:1.0"
description = "Simple UART"
depends = ["acme:ip:fifo"]

[[fileset]]
name = "rtl"
file_type = "verilogSource"
files = [
    "rtl/uart.v",
    { name = "rtl/uart_defs.vh", is_include_file = true },
]

[[fileset]]
name = "tb"
usage = ["sim"]
scope = "private"
depends = ["acme:sim:bfm"]
files = ["tb/uart_tb.v"]

[[fileset]]
name = "constraints"
usage = ["vivado"]
files = [{ name = "data/uart.xdc", file_type = "xdc" }]

[[parameter]]
name = "width"
paramtype = "vlogparam"
datatype = "int"
default = "8"
description = "Data width"

[[parameter]]
name = "timeout"
paramtype = "plusarg"
datatype = "int"
scope = "private"
"#;

    fn uart() -> ManifestCore {
        ManifestCore::parse(UART, Path::new("/cores/uart/uart.core.toml")).unwrap()
    }

    #[test]
    fn test_parse_manifest() {
        let core = uart();
        assert_eq!(core.name().to_string(), "acme:ip:uart:1.0");
        assert_eq!(core.description(), "Simple UART");
        assert_eq!(core.files_root(), Path::new("/cores/uart"));
        assert!(core.provider().is_none());
        assert_eq!(core.filesets().len(), 3);
    }

    #[test]
    fn test_files_follow_flags() {
        let core = uart();

        let dep_sim = Flags::new("icarus", Flow::Sim);
        let names: Vec<_> = core.files(&dep_sim).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["rtl/uart.v", "rtl/uart_defs.vh"]);

        let top_sim = dep_sim.toplevel(true);
        let names: Vec<_> = core.files(&top_sim).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["rtl/uart.v", "rtl/uart_defs.vh", "tb/uart_tb.v"]);

        let top_synth = Flags::new("vivado", Flow::Synth).toplevel(true);
        let files = core.files(&top_synth);
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].file_type.as_deref(), Some("verilogSource"));
        assert!(files[1].is_include_file);
        assert_eq!(files[2].file_type.as_deref(), Some("xdc"));
    }

    #[test]
    fn test_private_parameters_only_for_toplevel() {
        let core = uart();
        let flags = Flags::new("icarus", Flow::Sim);

        let params = core.parameters(&flags);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "width");
        assert_eq!(params[0].category, ParamCategory::Vlogparam);

        assert_eq!(core.parameters(&flags.toplevel(true)).len(), 2);
    }

    #[test]
    fn test_depends_include_matching_filesets() {
        let core = uart();
        let flags = Flags::new("icarus", Flow::Sim);

        assert_eq!(core.depends(&flags), vec![CoreName::parse("acme:ip:fifo")]);
        assert_eq!(
            core.depends(&flags.toplevel(true)),
            vec![CoreName::parse("acme:ip:fifo"), CoreName::parse("acme:sim:bfm")]
        );
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = ManifestCore::parse("[core]\nname = \"\"\n", Path::new("x.core.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::MissingName { .. }));

        let err = ManifestCore::parse("[core]\n", Path::new("x.core.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_files_outside_core_are_rejected() {
        for file in ["/opt/ip/uart.v", "../shared/uart.v", "rtl/../../uart.v"] {
            let manifest = format!(
                "[core]\nname = \"acme:ip:uart:1.0\"\n\n[[fileset]]\nname = \"rtl\"\nfiles = [\"{}\"]\n",
                file
            );
            match ManifestCore::parse(&manifest, Path::new("/cores/uart/uart.core.toml")) {
                Err(ManifestError::FileOutsideCore { file: listed, .. }) => assert_eq!(listed, file),
                other => panic!("expected FileOutsideCore for {}, got {:?}", file, other),
            }
        }

        let table = "[core]\nname = \"u\"\n\n[[fileset]]\nname = \"rtl\"\nfiles = [{ name = \"../u.vh\", is_include_file = true }]\n";
        assert!(matches!(
            ManifestCore::parse(table, Path::new("u.core.toml")),
            Err(ManifestError::FileOutsideCore { .. })
        ));

        let nested = "[core]\nname = \"u\"\n\n[[fileset]]\nname = \"rtl\"\nfiles = [\"./rtl/u.v\"]\n";
        assert!(ManifestCore::parse(nested, Path::new("u.core.toml")).is_ok());
    }

    #[test]
    fn test_absolute_file_name_leaves_source_intact() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("precious.v");
        std::fs::write(&source, "module precious; endmodule").unwrap();

        let root = tmp.path().join("uart");
        std::fs::create_dir_all(&root).unwrap();
        let manifest_path = root.join("uart.core.toml");
        std::fs::write(
            &manifest_path,
            format!(
                "[core]\nname = \"acme:ip:uart:1.0\"\n\n[[fileset]]\nname = \"rtl\"\nfiles = [{:?}]\n",
                source.display().to_string()
            ),
        )
        .unwrap();

        let err = ManifestCore::load(&manifest_path).unwrap_err();
        assert!(matches!(err, ManifestError::FileOutsideCore { .. }));
        assert_eq!(
            std::fs::read_to_string(&source).unwrap(),
            "module precious; endmodule"
        );
    }

    #[test]
    fn test_provider_moves_files_root_to_cache() {
        let manifest = r#"
[core]
name = "acme:ip:spi:2.0"

[provider]
url = "https://example.com/spi-2.0.tar.gz"
"#;
        let core = ManifestCore::parse(manifest, Path::new("/cores/spi.core.toml"))
            .unwrap()
            .with_cache(Path::new("/cache"), FetchOptions::default());

        assert_eq!(core.files_root(), Path::new("/cache/acme_ip_spi_2.0"));
    }

    #[test]
    fn test_export_copies_selected_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("uart");
        std::fs::create_dir_all(root.join("rtl")).unwrap();
        std::fs::create_dir_all(root.join("tb")).unwrap();
        std::fs::write(root.join("rtl/uart.v"), "module uart; endmodule").unwrap();
        std::fs::write(root.join("rtl/uart_defs.vh"), "`define UART").unwrap();
        std::fs::write(root.join("tb/uart_tb.v"), "module tb; endmodule").unwrap();

        let manifest_path = root.join("uart.core.toml");
        std::fs::write(&manifest_path, UART).unwrap();
        let core = ManifestCore::load(&manifest_path).unwrap();

        let dst = tmp.path().join("build/src/acme_ip_uart_1.0");
        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(dst.join("stale.v"), "old").unwrap();

        core.export(&dst, &Flags::new("icarus", Flow::Sim)).unwrap();

        assert!(dst.join("rtl/uart.v").exists());
        assert!(dst.join("rtl/uart_defs.vh").exists());
        assert!(!dst.join("tb/uart_tb.v").exists());
        assert!(!dst.join("stale.v").exists());
    }

    #[test]
    fn test_fetch_without_provider_is_noop() {
        let mut core = uart();
        core.fetch().unwrap();
    }
}
