use anyhow::{Context as AnyhowContext, Result};
use declarative::{Engine, RemoteObjectClient};

use super::{connect, load_state, report_warnings, write_state};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    execute(ctx, &connect(ctx)?, &args)
}

pub fn execute<C: RemoteObjectClient>(ctx: &Context, engine: &Engine<C>, args: &ApplyArgs) -> Result<()> {
    let schema = engine.schema(&args.type_name)?;

    let prior = load_state(schema, args.prior.as_deref())?;
    let planned = load_state(schema, args.planned.as_deref())?;

    let outcome = engine
        .apply(&args.type_name, prior.as_ref(), planned.as_ref())
        .with_context(|| format!("Failed to apply {}", args.type_name))?;

    report_warnings(&outcome.warnings);

    if !ctx.quiet {
        match &outcome.new_state {
            Some(state) => ui::success(&format!(
                "Applied {} {}",
                args.type_name,
                state.require_id().unwrap_or("?")
            )),
            None => ui::success(&format!("Removed {}", args.type_name)),
        }
    }

    write_state(args.out.as_deref(), outcome.new_state.as_ref())
}
