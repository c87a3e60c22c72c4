use anyhow::{Context as AnyhowContext, Result};
use std::fs;

use super::{registry, write_output};
use crate::Context;
use crate::cli::UpgradeArgs;
use crate::ui;

pub fn run(ctx: &Context, args: UpgradeArgs) -> Result<()> {
    let registry = registry()?;
    let schema = registry.lookup(&args.type_name)?;

    let raw = fs::read(&args.state)
        .with_context(|| format!("Could not read state file: {}", args.state.display()))?;
    let upgraded = declarative::read::upgrade_state(schema, &raw)
        .with_context(|| format!("Cannot upgrade {}", args.state.display()))?;

    if !ctx.quiet {
        ui::success(&format!("Upgraded {} state", args.type_name));
    }

    write_output(args.out.as_deref(), &upgraded)
}
