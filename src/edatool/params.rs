//! Parameter schema building and parsing.
//!
//! Every parameter a core declares becomes a `--<name>` flag. Flags are
//! grouped into one help section per category, typed after the declared
//! datatype, and parsed with clap into a [`ParamStore`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use serde::Serialize;

use crate::core::{Core, CoreName, DataType, Flags, ParamCategory, ParamValue, Parameter};
use crate::edatool::{EdaError, EdaTool};
use crate::util::paths::expand_file_path;

/// Parsed parameter values, one map per category.
///
/// Keys are parameter names with `-` replaced by `_`, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamStore {
    pub plusarg: BTreeMap<String, ParamValue>,
    pub vlogparam: BTreeMap<String, ParamValue>,
    pub vlogdefine: BTreeMap<String, ParamValue>,
    pub generic: BTreeMap<String, ParamValue>,
    pub cmdlinearg: BTreeMap<String, ParamValue>,
}

impl ParamStore {
    pub fn bucket(&self, category: ParamCategory) -> &BTreeMap<String, ParamValue> {
        match category {
            ParamCategory::Plusarg => &self.plusarg,
            ParamCategory::Vlogparam => &self.vlogparam,
            ParamCategory::Vlogdefine => &self.vlogdefine,
            ParamCategory::Generic => &self.generic,
            ParamCategory::Cmdlinearg => &self.cmdlinearg,
        }
    }

    fn bucket_mut(&mut self, category: ParamCategory) -> &mut BTreeMap<String, ParamValue> {
        match category {
            ParamCategory::Plusarg => &mut self.plusarg,
            ParamCategory::Vlogparam => &mut self.vlogparam,
            ParamCategory::Vlogdefine => &mut self.vlogdefine,
            ParamCategory::Generic => &mut self.generic,
            ParamCategory::Cmdlinearg => &mut self.cmdlinearg,
        }
    }

    pub fn insert(&mut self, category: ParamCategory, key: impl Into<String>, value: ParamValue) {
        self.bucket_mut(category).insert(key.into(), value);
    }

    pub fn get(&self, category: ParamCategory, key: &str) -> Option<&ParamValue> {
        self.bucket(category).get(key)
    }

    /// All values, category by category.
    pub fn iter(&self) -> impl Iterator<Item = (ParamCategory, &str, &ParamValue)> {
        ParamCategory::ALL.into_iter().flat_map(move |category| {
            self.bucket(category)
                .iter()
                .map(move |(key, value)| (category, key.as_str(), value))
        })
    }

    pub fn is_empty(&self) -> bool {
        ParamCategory::ALL
            .iter()
            .all(|c| self.bucket(*c).is_empty())
    }
}

/// Whether `name` can be used as a `--<name>` flag.
fn is_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c == '=')
}

/// One command-line flag derived from a core's parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub parameter: Parameter,
    pub data_type: DataType,
    pub default: Option<ParamValue>,
    /// The core that declared the parameter
    pub core: CoreName,
}

impl ParamSpec {
    /// Check the name, declared datatype and default of `parameter`.
    pub fn new(parameter: Parameter, core: &CoreName) -> Result<Self, EdaError> {
        if !is_flag_name(&parameter.name) {
            return Err(EdaError::InvalidName {
                parameter: parameter.name.clone(),
                core: core.to_string(),
            });
        }

        let data_type = parameter
            .data_type()
            .ok_or_else(|| EdaError::InvalidDataType {
                datatype: parameter.datatype.clone(),
                parameter: parameter.name.clone(),
                core: core.to_string(),
            })?;

        let default = match parameter.default.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(cast_default(raw, data_type).ok_or_else(|| {
                EdaError::InvalidDefault {
                    default: raw.to_string(),
                    datatype: data_type.to_string(),
                    parameter: parameter.name.clone(),
                    core: core.to_string(),
                }
            })?),
        };

        Ok(ParamSpec {
            parameter,
            data_type,
            default,
            core: core.clone(),
        })
    }

    fn arg(&self) -> Arg {
        let name = self.parameter.name.clone();
        let arg = Arg::new(name.clone())
            .long(name)
            .help(self.parameter.description.clone())
            .help_heading(self.parameter.category.description());

        let arg = match self.data_type {
            DataType::Bool => arg.action(ArgAction::SetTrue),
            DataType::Int => arg
                .action(ArgAction::Set)
                .num_args(1)
                .value_name("INT")
                .value_parser(value_parser!(i64)),
            DataType::Str => arg
                .action(ArgAction::Set)
                .num_args(1)
                .value_name("STR")
                .value_parser(value_parser!(String)),
            DataType::File => arg
                .action(ArgAction::Set)
                .num_args(1)
                .value_name("FILE")
                .value_parser(parse_file_arg),
        };

        match &self.default {
            Some(default) => arg.default_value(default_arg_value(default)),
            None => arg,
        }
    }

    fn value(&self, matches: &clap::ArgMatches) -> Option<ParamValue> {
        let id = self.parameter.name.as_str();
        match self.data_type {
            DataType::Bool => Some(ParamValue::Bool(matches.get_flag(id))),
            DataType::Int => matches.get_one::<i64>(id).copied().map(ParamValue::Int),
            DataType::Str => matches.get_one::<String>(id).cloned().map(ParamValue::Str),
            DataType::File => matches.get_one::<PathBuf>(id).cloned().map(ParamValue::File),
        }
    }
}

fn parse_file_arg(s: &str) -> Result<PathBuf, String> {
    Ok(expand_file_path(s))
}

/// Cast a declared default to `data_type`.
fn cast_default(raw: &str, data_type: DataType) -> Option<ParamValue> {
    match data_type {
        DataType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(ParamValue::Bool(true)),
            "false" | "0" => Some(ParamValue::Bool(false)),
            _ => None,
        },
        DataType::Int => raw.trim().parse().ok().map(ParamValue::Int),
        DataType::Str => Some(ParamValue::Str(raw.to_string())),
        DataType::File => Some(ParamValue::File(expand_file_path(raw))),
    }
}

/// A typed default in the form clap's value parser reads back.
fn default_arg_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Str(s) => s.clone(),
        ParamValue::File(path) => path.display().to_string(),
    }
}

/// The command-line schema for a set of cores.
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    specs: Vec<ParamSpec>,
}

impl ParamSchema {
    /// Collect the parameters of `cores` that fall in `categories`.
    ///
    /// A later core declaring a flag that is already present replaces the
    /// earlier declaration.
    pub fn build(
        cores: &[Box<dyn Core>],
        system: &CoreName,
        flags: &Flags,
        categories: &[ParamCategory],
    ) -> Result<Self, EdaError> {
        let mut specs: Vec<ParamSpec> = Vec::new();

        for core in cores {
            let core_flags = flags.toplevel(core.name() == system);

            for parameter in core.parameters(&core_flags) {
                if !categories.contains(&parameter.category) {
                    continue;
                }

                let spec = ParamSpec::new(parameter, core.name())?;
                if let Some(pos) = specs
                    .iter()
                    .position(|s| s.parameter.name == spec.parameter.name)
                {
                    let replaced = specs.remove(pos);
                    tracing::debug!(
                        "parameter `{}` from {} overrides the one from {}",
                        spec.parameter.name,
                        spec.core,
                        replaced.core
                    );
                }
                specs.push(spec);
            }
        }

        Ok(ParamSchema { specs })
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The clap command accepting these parameters.
    pub fn command(&self, name: impl Into<String>) -> Command {
        let mut cmd = Command::new(name.into())
            .no_binary_name(true)
            .disable_version_flag(true);

        if self.specs.iter().any(|s| s.parameter.name == "help") {
            cmd = cmd.disable_help_flag(true);
        }

        for spec in &self.specs {
            cmd = cmd.arg(spec.arg());
        }
        cmd
    }

    /// Parse `args` (without a program name) into a fresh store.
    pub fn parse(&self, name: impl Into<String>, args: &[String]) -> Result<ParamStore, EdaError> {
        let matches = self
            .command(name)
            .try_get_matches_from(args)
            .map_err(EdaError::ArgParse)?;

        let mut store = ParamStore::default();
        for spec in &self.specs {
            if let Some(value) = spec.value(&matches) {
                store.insert(spec.parameter.category, spec.parameter.store_key(), value);
            }
        }
        Ok(store)
    }
}

impl EdaTool {
    /// Build the parameter schema for `categories` and parse `args` into
    /// [`params`](EdaTool::params).
    ///
    /// Nothing is stored unless the whole schema builds and every argument
    /// parses. Once parameters have been parsed, later calls do nothing.
    pub fn parse_args(
        &mut self,
        args: &[String],
        prog: &str,
        categories: &[ParamCategory],
    ) -> Result<(), EdaError> {
        if self.parsed {
            return Ok(());
        }

        let schema = self.schema(categories)?;
        let name = format!("socstage {} {}", prog, self.system);
        self.params = schema.parse(name, args)?;
        self.parsed = true;

        tracing::debug!("parsed {} parameters for {}", schema.specs().len(), self.system);
        Ok(())
    }

    /// The parameter schema for `categories`, without parsing anything.
    pub fn schema(&self, categories: &[ParamCategory]) -> Result<ParamSchema, EdaError> {
        ParamSchema::build(&self.cores, &self.system, &self.flags(), categories)
    }
}
