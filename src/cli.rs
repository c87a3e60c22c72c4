use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sobject-provider")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Plan, apply and read Salesforce objects from declared state", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config dir>/config.toml)
    #[arg(long, global = true, env = "SOBJECT_PROVIDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List resource types, or show the attributes of one
    Schema {
        /// Resource type, e.g. salesforce_user
        type_name: Option<String>,
    },

    /// Compute the planned state for a change (no network access)
    Plan(PlanArgs),

    /// Execute a planned change against the org
    Apply(ApplyArgs),

    /// Refresh a resource from the org (exit code 2 if it no longer exists)
    Read(ReadArgs),

    /// Adopt an existing object into state
    Import(ImportArgs),

    /// Find an existing object through a data source, e.g. a profile by name
    Lookup(LookupArgs),

    /// Re-encode stored state under the current schema
    Upgrade(UpgradeArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Resource type
    pub type_name: String,

    /// Prior state file (omit when creating)
    #[arg(long)]
    pub prior: Option<PathBuf>,

    /// Proposed state file (omit when destroying)
    #[arg(long)]
    pub proposed: Option<PathBuf>,

    /// Write the planned state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Resource type
    pub type_name: String,

    /// Prior state file (omit when creating)
    #[arg(long)]
    pub prior: Option<PathBuf>,

    /// Planned state file (omit when destroying)
    #[arg(long)]
    pub planned: Option<PathBuf>,

    /// Write the new state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Resource type
    pub type_name: String,

    /// Remote object id
    pub id: String,

    /// Previous state file, for attributes the org does not store
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Write the refreshed state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Resource type
    pub type_name: String,

    /// Remote object id
    pub id: String,

    /// Write the imported state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct LookupArgs {
    /// Data source, e.g. salesforce_profile
    pub type_name: String,

    /// Attribute to match on
    pub attribute: String,

    /// Value the attribute must equal
    pub value: String,

    /// Write the found state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct UpgradeArgs {
    /// Resource type
    pub type_name: String,

    /// Stored state file
    pub state: PathBuf,

    /// Write the upgraded state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}
