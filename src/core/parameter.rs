//! Build parameters declared by cores.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The mechanism through which a downstream tool receives a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamCategory {
    /// Verilog plusarg (run-time value)
    Plusarg,
    /// Verilog parameter (compile-time value)
    Vlogparam,
    /// Verilog define (compile-time global symbol)
    Vlogdefine,
    /// VHDL generic
    Generic,
    /// Command-line argument passed to the built model
    Cmdlinearg,
}

impl ParamCategory {
    /// All categories, in presentation order.
    pub const ALL: [ParamCategory; 5] = [
        ParamCategory::Plusarg,
        ParamCategory::Vlogparam,
        ParamCategory::Vlogdefine,
        ParamCategory::Generic,
        ParamCategory::Cmdlinearg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamCategory::Plusarg => "plusarg",
            ParamCategory::Vlogparam => "vlogparam",
            ParamCategory::Vlogdefine => "vlogdefine",
            ParamCategory::Generic => "generic",
            ParamCategory::Cmdlinearg => "cmdlinearg",
        }
    }

    /// Heading used for this category's section of the help text.
    pub fn description(&self) -> &'static str {
        match self {
            ParamCategory::Plusarg => "Verilog plusargs (Run-time option)",
            ParamCategory::Vlogparam => "Verilog parameters (Compile-time option)",
            ParamCategory::Vlogdefine => "Verilog defines (Compile-time global symbol)",
            ParamCategory::Generic => "VHDL generic (Run-time option)",
            ParamCategory::Cmdlinearg => "Command-line arguments (Run-time option)",
        }
    }
}

impl fmt::Display for ParamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown parameter category `{}` (expected one of: plusarg, vlogparam, vlogdefine, generic, cmdlinearg)",
                    s
                )
            })
    }
}

/// The value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int,
    Str,
    File,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Str => "str",
            DataType::File => "file",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(DataType::Bool),
            "int" => Ok(DataType::Int),
            "str" => Ok(DataType::Str),
            "file" => Ok(DataType::File),
            _ => Err(()),
        }
    }
}

/// A parameter declaration as exposed by a core.
///
/// The datatype is kept as declared; it is checked when the command-line
/// schema is built so the error can name the owning core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "paramtype")]
    pub category: ParamCategory,

    pub datatype: String,

    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub description: String,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        category: ParamCategory,
        datatype: impl Into<String>,
    ) -> Self {
        Parameter {
            name: name.into(),
            category,
            datatype: datatype.into(),
            default: None,
            description: String::new(),
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The declared datatype, if it is one we know.
    pub fn data_type(&self) -> Option<DataType> {
        self.datatype.parse().ok()
    }

    /// Key under which the parsed value is stored.
    pub fn store_key(&self) -> String {
        self.name.replace('-', "_")
    }
}

/// A parsed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    File(PathBuf),
}

impl ParamValue {
    pub fn data_type(&self) -> DataType {
        match self {
            ParamValue::Bool(_) => DataType::Bool,
            ParamValue::Int(_) => DataType::Int,
            ParamValue::Str(_) => DataType::Str,
            ParamValue::File(_) => DataType::File,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::File(p) => write!(f, "{}", p.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip_names() {
        for category in ParamCategory::ALL {
            assert_eq!(category.as_str().parse::<ParamCategory>(), Ok(category));
        }
        assert!("define".parse::<ParamCategory>().is_err());
    }

    #[test]
    fn test_data_type_lookup() {
        let param = Parameter::new("width", ParamCategory::Vlogparam, "int");
        assert_eq!(param.data_type(), Some(DataType::Int));

        let bad = Parameter::new("width", ParamCategory::Vlogparam, "integer");
        assert_eq!(bad.data_type(), None);
    }

    #[test]
    fn test_store_key_normalizes_hyphens() {
        let param = Parameter::new("clock-freq-hz", ParamCategory::Plusarg, "int");
        assert_eq!(param.store_key(), "clock_freq_hz");
    }

    #[test]
    fn test_parameter_from_toml() {
        let param: Parameter = toml::from_str(
            r#"
name = "timeout"
paramtype = "plusarg"
datatype = "int"
default = "1000"
description = "Simulation timeout"
"#,
        )
        .unwrap();

        assert_eq!(param.category, ParamCategory::Plusarg);
        assert_eq!(param.default.as_deref(), Some("1000"));
        assert_eq!(param.description, "Simulation timeout");
    }
}
