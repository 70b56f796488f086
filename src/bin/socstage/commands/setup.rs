//! `socstage setup` command

use anyhow::Result;

use socstage::ops;
use socstage::util::GlobalContext;

use crate::cli::TargetArgs;

pub fn execute(args: TargetArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let opts = super::target_options(args);

    let result = ops::setup(&ctx, &opts)?;
    let description = &result.description;

    println!(
        "Set up {} for {} ({}): {} files, {} include directories",
        description.name,
        description.tool,
        description.flow,
        description.files.len(),
        description.include_dirs.len()
    );
    println!("{}", result.description_path.display());

    Ok(())
}
