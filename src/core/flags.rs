//! Context flags passed to cores when querying files and parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::ParamCategory;

/// Class of downstream activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Sim,
    Synth,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Sim => "sim",
            Flow::Synth => "synth",
        }
    }

    /// Parameter categories a flow accepts when none are requested explicitly.
    pub fn default_categories(&self) -> &'static [ParamCategory] {
        match self {
            Flow::Sim => &ParamCategory::ALL,
            Flow::Synth => &[
                ParamCategory::Vlogparam,
                ParamCategory::Vlogdefine,
                ParamCategory::Generic,
            ],
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sim" => Ok(Flow::Sim),
            "synth" => Ok(Flow::Synth),
            _ => Err(format!("unknown flow `{}` (expected `sim` or `synth`)", s)),
        }
    }
}

/// Flags a core may use to vary its parameters and files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    pub tool: String,
    pub flow: Flow,
    pub is_toplevel: bool,
}

impl Flags {
    pub fn new(tool: impl Into<String>, flow: Flow) -> Self {
        Flags {
            tool: tool.into(),
            flow,
            is_toplevel: false,
        }
    }

    /// Same flags with `is_toplevel` set.
    pub fn toplevel(&self, is_toplevel: bool) -> Flags {
        Flags {
            is_toplevel,
            ..self.clone()
        }
    }
}
