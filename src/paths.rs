//! Where the provider keeps its config file
//!
//! The config directory is the first of:
//!
//! 1. `$SOBJECT_PROVIDER_CONFIG_DIR` (`~` and `$VARS` are expanded)
//! 2. `$XDG_CONFIG_HOME/sobject-provider`
//! 3. `%APPDATA%\sobject-provider` on Windows
//! 4. `~/.config/sobject-provider`

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::PathBuf;

pub const ENV_CONFIG_DIR: &str = "SOBJECT_PROVIDER_CONFIG_DIR";

const APP_DIR: &str = "sobject-provider";

pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the config directory from the process environment
pub fn config_dir() -> Result<PathBuf> {
    resolve_config_dir(|key| std::env::var(key).ok())
}

/// Default location of `config.toml`
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

fn resolve_config_dir(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    if let Some(dir) = lookup(ENV_CONFIG_DIR).filter(|d| !d.is_empty()) {
        let dir = expand(&dir);
        log::debug!("Config dir from {ENV_CONFIG_DIR}: {}", dir.display());
        return Ok(dir);
    }

    if let Some(base) = lookup("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(base).join(APP_DIR));
    }

    #[cfg(windows)]
    if let Some(app_data) = dirs::config_dir() {
        return Ok(app_data.join(APP_DIR));
    }

    let home = dirs::home_dir().context("Cannot locate the home directory for the config dir")?;
    Ok(home.join(".config").join(APP_DIR))
}

/// Expand `~` and `$VARS`; unresolvable variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
