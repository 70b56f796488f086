//! Implementation of `socstage files` and `socstage params`.
//!
//! Both open the target without staging it.

use anyhow::Result;

use crate::core::ParamCategory;
use crate::edatool::{render_value, Fileset};
use crate::ops::target::{open_target, TargetOptions};
use crate::util::GlobalContext;

/// The merged fileset the target would be built from.
pub fn files(ctx: &GlobalContext, opts: &TargetOptions) -> Result<Fileset> {
    let tool = open_target(ctx, opts)?;
    Ok(tool.resolve_files())
}

/// A parsed parameter, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedParam {
    pub category: ParamCategory,
    pub name: String,
    pub value: String,
}

/// Parse the target's parameters and render every value.
pub fn params(ctx: &GlobalContext, opts: &TargetOptions, quote: bool) -> Result<Vec<RenderedParam>> {
    let mut tool = open_target(ctx, opts)?;
    tool.parse_args(&opts.args, "params", &opts.categories())?;

    Ok(tool
        .params()
        .iter()
        .map(|(category, name, value)| RenderedParam {
            category,
            name: name.to_string(),
            value: render_value(value, quote),
        })
        .collect())
}
