//! Command implementations
//!
//! State files hold wire-encoded resource values; stdout is used when no
//! output file is given.

pub mod apply;
pub mod import;
pub mod lookup;
pub mod plan;
pub mod read;
pub mod schema;
pub mod upgrade;

use anyhow::{Context as AnyhowContext, Result};
use declarative::codec::{decode_state, encode_state};
use declarative::{Engine, ResourceSchema, ResourceState, SchemaRegistry, Warning};
use sobject::ForceClient;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::Context;
use crate::config::ProviderConfig;
use crate::resources;
use crate::ui;

/// The built-in schema registry
pub fn registry() -> Result<Arc<SchemaRegistry>> {
    let registry = resources::registry().context("Built-in resource schemas are invalid")?;
    Ok(Arc::new(registry))
}

/// The built-in data sources
pub fn data_sources() -> Result<Arc<SchemaRegistry>> {
    let sources = resources::data_sources().context("Built-in data source schemas are invalid")?;
    Ok(Arc::new(sources))
}

/// Engine connected to the configured org
pub fn connect(ctx: &Context) -> Result<Engine<ForceClient>> {
    let config = ProviderConfig::load(ctx.config.as_deref())?.with_process_env();
    let conn = config.connection().context("Provider is not configured")?;
    log::debug!("Connecting to {} (API v{})", conn.instance_url, conn.api_version);
    let client = ForceClient::new(conn)?;
    Ok(Engine::new(registry()?, client).with_data_sources(data_sources()?))
}

/// Read a state file; no path means "no resource"
pub fn load_state(schema: &ResourceSchema, path: Option<&Path>) -> Result<Option<ResourceState>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = fs::read(path).with_context(|| format!("Could not read state file: {}", path.display()))?;
    decode_state(schema, &bytes).with_context(|| format!("Invalid state in {}", path.display()))
}

/// Write a state to `out`, or to stdout
pub fn write_state(out: Option<&Path>, state: Option<&ResourceState>) -> Result<()> {
    let bytes = encode_state(state)?;
    write_output(out, &bytes)
}

pub fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("Could not write {}", path.display()))?;
            log::debug!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Show warnings; these are printed even in quiet mode
pub fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        ui::warn(&warning.summary);
        ui::dim(&warning.detail);
    }
}
