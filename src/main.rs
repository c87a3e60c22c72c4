mod cli;
mod commands;
mod config;
mod paths;
mod resources;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    /// Explicit config file, if given
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        config: cli.config,
    };

    match run(&ctx, cli.command) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<ExitCode> {
    let done = |result: Result<()>| result.map(|()| ExitCode::SUCCESS);

    match command {
        Command::Schema { type_name } => done(commands::schema::run(ctx, type_name.as_deref())),
        Command::Plan(args) => done(commands::plan::run(ctx, args)),
        Command::Apply(args) => done(commands::apply::run(ctx, args)),
        Command::Read(args) => commands::read::run(ctx, args),
        Command::Import(args) => done(commands::import::run(ctx, args)),
        Command::Lookup(args) => done(commands::lookup::run(ctx, args)),
        Command::Upgrade(args) => done(commands::upgrade::run(ctx, args)),
    }
}

/// Print the error chain, plus advice when the engine categorized it
fn report(err: &anyhow::Error) {
    ui::error(&format!("{err:#}"));
    if let Some(category) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<declarative::Error>())
        .map(declarative::Error::category)
    {
        ui::dim(&format!("{category}: {}", category.advice()));
    }
}
