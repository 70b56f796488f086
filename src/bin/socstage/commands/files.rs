//! `socstage files` command

use anyhow::Result;

use socstage::ops;
use socstage::util::GlobalContext;

use crate::cli::FilesArgs;

pub fn execute(args: FilesArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let opts = super::target_options(args.target);

    let fileset = ops::files(&ctx, &opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fileset)?);
        return Ok(());
    }

    for file in &fileset.src_files {
        match &file.file_type {
            Some(file_type) => println!("{}  [{}]", file.name, file_type),
            None => println!("{}", file.name),
        }
    }
    for dir in &fileset.include_dirs {
        println!("{}  [include]", dir);
    }

    Ok(())
}
