//! Lookup command - find an existing object through a data source

use anyhow::{Context as AnyhowContext, Result};
use declarative::{Engine, RemoteObjectClient};

use super::{connect, write_state};
use crate::Context;
use crate::cli::LookupArgs;
use crate::ui;

pub fn run(ctx: &Context, args: LookupArgs) -> Result<()> {
    execute(ctx, &connect(ctx)?, &args)
}

pub fn execute<C: RemoteObjectClient>(ctx: &Context, engine: &Engine<C>, args: &LookupArgs) -> Result<()> {
    let state = engine
        .lookup(&args.type_name, &args.attribute, &args.value)
        .with_context(|| format!("Error getting {}", args.type_name))?;

    if !ctx.quiet {
        ui::success(&format!(
            "Found {} {}",
            args.type_name,
            state.require_id().unwrap_or("?")
        ));
    }

    write_state(args.out.as_deref(), Some(&state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{mock_engine, quiet};
    use crate::resources::{PROFILE, USER_LICENSE};
    use declarative::codec::decode_state;
    use declarative::TypedValue;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn args(type_name: &str, attribute: &str, value: &str, dir: &TempDir) -> LookupArgs {
        LookupArgs {
            type_name: type_name.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            out: Some(dir.path().join("found.json")),
        }
    }

    #[test]
    fn test_lookup_writes_state() {
        let engine = mock_engine();
        let dir = TempDir::new().unwrap();
        engine.client().insert(
            "UserLicense",
            "100",
            json!({"LicenseDefinitionKey": "SFDC", "Name": "Salesforce"})
                .as_object()
                .unwrap()
                .clone(),
        );

        execute(&quiet(), &engine, &args(USER_LICENSE, "license_definition_key", "SFDC", &dir)).unwrap();

        let schema = engine.data_source(USER_LICENSE).unwrap();
        let written = fs::read(dir.path().join("found.json")).unwrap();
        let state = decode_state(schema, &written).unwrap().unwrap();
        assert_eq!(state.require_id().unwrap(), "100");
        assert_eq!(state.get("name"), &TypedValue::from("Salesforce"));
    }

    #[test]
    fn test_lookup_no_match_is_error() {
        let engine = mock_engine();
        let dir = TempDir::new().unwrap();

        let err = execute(&quiet(), &engine, &args(PROFILE, "name", "Nobody", &dir)).unwrap_err();

        assert_eq!(
            format!("{err:#}"),
            "Error getting salesforce_profile: No Profile where Name = 'Nobody'"
        );
        assert!(!dir.path().join("found.json").exists());
    }
}
