//! `socstage params` command

use anyhow::Result;

use socstage::ops;
use socstage::util::GlobalContext;

use crate::cli::ParamsArgs;

pub fn execute(args: ParamsArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let opts = super::target_options(args.target);

    let params = ops::params(&ctx, &opts, args.quote)?;
    if params.is_empty() {
        println!("(no parameters)");
    }

    for param in params {
        println!("{:<11}{}={}", param.category.as_str(), param.name, param.value);
    }

    Ok(())
}
