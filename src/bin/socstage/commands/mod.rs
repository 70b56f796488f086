//! Command implementations

pub mod completions;
pub mod files;
pub mod params;
pub mod setup;

use socstage::ops::TargetOptions;

use crate::cli::TargetArgs;

/// Target options from the shared command-line arguments.
fn target_options(args: TargetArgs) -> TargetOptions {
    TargetOptions {
        system: args.system,
        tool: args.tool,
        flow: args.flow,
        export: if args.no_export { Some(false) } else { None },
        build_root: args.build_root,
        cores_root: args.cores_root,
        categories: if args.categories.is_empty() {
            None
        } else {
            Some(args.categories)
        },
        args: args.params,
    }
}
