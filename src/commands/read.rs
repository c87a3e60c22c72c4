//! Read command - refresh one object from the org
//!
//! Exits with code 2 when the object no longer exists so callers can drop
//! it from state without parsing output.

use anyhow::Result;
use declarative::{Engine, ReadOutcome, RemoteObjectClient};
use std::process::ExitCode;

use super::{connect, load_state, write_state};
use crate::Context;
use crate::cli::ReadArgs;
use crate::ui;

pub const EXIT_NOT_FOUND: u8 = 2;

pub fn run(ctx: &Context, args: ReadArgs) -> Result<ExitCode> {
    if execute(ctx, &connect(ctx)?, &args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_NOT_FOUND))
    }
}

/// Refresh and write the state; `false` when the object is gone, in which
/// case nothing is written.
pub fn execute<C: RemoteObjectClient>(ctx: &Context, engine: &Engine<C>, args: &ReadArgs) -> Result<bool> {
    let schema = engine.schema(&args.type_name)?;
    let previous = load_state(schema, args.previous.as_deref())?;

    match engine.read(&args.type_name, &args.id, previous.as_ref())? {
        ReadOutcome::Found(state) => {
            if !ctx.quiet {
                ui::success(&format!("Read {} {}", args.type_name, args.id));
            }
            write_state(args.out.as_deref(), Some(&state))?;
            Ok(true)
        }
        ReadOutcome::NotFound => {
            ui::warn(&format!("{} {} no longer exists", args.type_name, args.id));
            Ok(false)
        }
    }
}
