//! Implementation of `socstage setup`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{CoreFile, Flow, ParamCategory};
use crate::edatool::{render_value, BuildPaths, EdaTool, Fileset, ParamStore};
use crate::ops::target::{open_target, TargetOptions};
use crate::util::fs::write_string;
use crate::util::GlobalContext;

/// File name of the build description written to the work root.
pub const BUILD_DESCRIPTION_FILE: &str = "socstage.json";

/// Everything a tool backend needs to generate its project files.
#[derive(Debug, Clone, Serialize)]
pub struct BuildDescription {
    pub name: String,
    pub tool: String,
    pub flow: Flow,
    pub paths: BuildPaths,

    /// Environment to run the tool with
    pub env: BTreeMap<String, String>,

    pub files: Vec<CoreFile>,
    pub include_dirs: Vec<String>,

    /// Typed parameter values
    pub parameters: ParamStore,

    /// Parameter values in tool literal syntax, per category
    pub rendered: BTreeMap<String, BTreeMap<String, String>>,
}

impl BuildDescription {
    pub fn new(tool: &EdaTool, fileset: Fileset) -> Self {
        let params = tool.params();

        let mut rendered: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (category, key, value) in params.iter() {
            rendered
                .entry(category.to_string())
                .or_default()
                .insert(key.to_string(), render_value(value, quotes_strings(category)));
        }

        BuildDescription {
            name: tool.system().to_string(),
            tool: tool.config().tool.clone(),
            flow: tool.config().flow,
            paths: tool.paths().clone(),
            env: tool
                .paths()
                .tool_env()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            files: fileset.src_files,
            include_dirs: fileset.include_dirs,
            parameters: params.clone(),
            rendered,
        }
    }
}

/// Verilog parameters and defines take string values as quoted literals.
fn quotes_strings(category: ParamCategory) -> bool {
    matches!(category, ParamCategory::Vlogparam | ParamCategory::Vlogdefine)
}

/// Result of a setup run.
#[derive(Debug)]
pub struct SetupResult {
    pub description: BuildDescription,
    pub description_path: PathBuf,
}

/// Stage the target, parse its parameters and write the build description.
pub fn setup(ctx: &GlobalContext, opts: &TargetOptions) -> Result<SetupResult> {
    let mut tool = open_target(ctx, opts)?;

    tool.configure()?;
    tool.parse_args(&opts.args, "setup", &opts.categories())?;
    let fileset = tool.resolve_files();

    let description = BuildDescription::new(&tool, fileset);
    let description_path = tool.paths().work_root.join(BUILD_DESCRIPTION_FILE);

    let json = serde_json::to_string_pretty(&description)
        .context("failed to serialize build description")?;
    write_string(&description_path, &json)?;

    tracing::info!("Wrote {}", description_path.display());

    Ok(SetupResult {
        description,
        description_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Core, CoreName, ParamValue, Parameter};
    use crate::edatool::ToolConfig;
    use crate::test_support::StubCore;

    #[test]
    fn test_description_renders_per_category() {
        let core = StubCore::new("acme:soc:top:1.0")
            .with_file(CoreFile::new("top.v"))
            .with_parameter(Parameter::new("name", ParamCategory::Vlogparam, "str").with_default("uart"))
            .with_parameter(Parameter::new("tag", ParamCategory::Plusarg, "str").with_default("run1"))
            .with_parameter(Parameter::new("trace", ParamCategory::Plusarg, "bool"));
        let mut tool = EdaTool::with_cores(
            CoreName::parse("acme:soc:top:1.0"),
            ToolConfig::new("icarus", Flow::Sim, "/b"),
            vec![Box::new(core) as Box<dyn Core>],
        );
        tool.parse_args(&[], "setup", &ParamCategory::ALL).unwrap();

        let description = BuildDescription::new(&tool, tool.resolve_files());

        assert_eq!(description.name, "acme:soc:top:1.0");
        assert_eq!(description.files[0].name, "../src/acme_soc_top_1.0/top.v");
        assert_eq!(description.env["WORK_ROOT"], "/b/acme_soc_top_1.0/sim-icarus");
        assert_eq!(description.rendered["vlogparam"]["name"], "\"uart\"");
        assert_eq!(description.rendered["plusarg"]["tag"], "run1");
        assert_eq!(description.rendered["plusarg"]["trace"], "0");
        assert_eq!(
            description.parameters.get(ParamCategory::Plusarg, "trace"),
            Some(&ParamValue::Bool(false))
        );

        let json: serde_json::Value = serde_json::to_value(&description).unwrap();
        assert_eq!(json["flow"], "sim");
        assert_eq!(json["parameters"]["vlogparam"]["name"], "uart");
        assert_eq!(json["parameters"]["plusarg"]["trace"], false);
    }
}
