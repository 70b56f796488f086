//! Files belonging to a core.

use serde::{Deserialize, Serialize};

/// A file declared by a core.
///
/// `name` is relative to the core's files root until the fileset resolver
/// rewrites it relative to the work root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreFile {
    pub name: String,

    /// Only the containing directory matters (text inclusion).
    #[serde(default)]
    pub is_include_file: bool,

    /// File type hint for tool backends (e.g. `verilogSource`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// VHDL library the file belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_name: Option<String>,
}

impl CoreFile {
    pub fn new(name: impl Into<String>) -> Self {
        CoreFile {
            name: name.into(),
            is_include_file: false,
            file_type: None,
            logical_name: None,
        }
    }

    pub fn include(name: impl Into<String>) -> Self {
        CoreFile {
            is_include_file: true,
            ..CoreFile::new(name)
        }
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// A copy of this record pointing at `name`.
    pub fn with_name(&self, name: impl Into<String>) -> CoreFile {
        CoreFile {
            name: name.into(),
            is_include_file: self.is_include_file,
            file_type: self.file_type.clone(),
            logical_name: self.logical_name.clone(),
        }
    }

    /// Directory part of `name`, the way include directories are derived.
    ///
    /// `inc/defs.vh` and `inc/` both yield `inc`; a bare file name yields
    /// an empty string.
    pub fn dirname(&self) -> &str {
        match self.name.rfind('/') {
            Some(0) => "/",
            Some(idx) => {
                let head = self.name[..idx].trim_end_matches('/');
                if head.is_empty() {
                    "/"
                } else {
                    head
                }
            }
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirname() {
        assert_eq!(CoreFile::include("inc/defs.vh").dirname(), "inc");
        assert_eq!(CoreFile::include("inc/").dirname(), "inc");
        assert_eq!(CoreFile::include("a/b/c.svh").dirname(), "a/b");
        assert_eq!(CoreFile::include("defs.vh").dirname(), "");
        assert_eq!(CoreFile::include("/abs.vh").dirname(), "/");
    }

    #[test]
    fn test_with_name_keeps_metadata() {
        let file = CoreFile::new("rtl/top.v").with_file_type("verilogSource");
        let moved = file.with_name("../src/top_0/rtl/top.v");

        assert_eq!(moved.name, "../src/top_0/rtl/top.v");
        assert_eq!(moved.file_type.as_deref(), Some("verilogSource"));
        assert_eq!(file.name, "rtl/top.v");
    }
}
