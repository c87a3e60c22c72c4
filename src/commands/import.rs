use anyhow::{Context as AnyhowContext, Result};
use declarative::{Engine, RemoteObjectClient};

use super::{connect, write_state};
use crate::Context;
use crate::cli::ImportArgs;
use crate::ui;

pub fn run(ctx: &Context, args: ImportArgs) -> Result<()> {
    execute(ctx, &connect(ctx)?, &args)
}

pub fn execute<C: RemoteObjectClient>(ctx: &Context, engine: &Engine<C>, args: &ImportArgs) -> Result<()> {
    let state = engine
        .import(&args.type_name, &args.id)
        .with_context(|| format!("Failed to import {} {}", args.type_name, args.id))?;

    if !ctx.quiet {
        ui::success(&format!("Imported {} {}", args.type_name, args.id));
    }

    write_state(args.out.as_deref(), Some(&state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{mock_engine, quiet};
    use crate::resources::PROFILE;
    use declarative::codec::decode_state;
    use declarative::TypedValue;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn args(id: &str, dir: &TempDir) -> ImportArgs {
        ImportArgs {
            type_name: PROFILE.to_string(),
            id: id.to_string(),
            out: Some(dir.path().join("profile.json")),
        }
    }

    #[test]
    fn test_import_writes_state() {
        let engine = mock_engine();
        let dir = TempDir::new().unwrap();
        engine.client().insert(
            "Profile",
            "00e1",
            json!({"Name": "Support", "UserLicenseId": "100", "PermissionsApiEnabled": true})
                .as_object()
                .unwrap()
                .clone(),
        );

        execute(&quiet(), &engine, &args("00e1", &dir)).unwrap();

        let schema = engine.schema(PROFILE).unwrap();
        let written = fs::read(dir.path().join("profile.json")).unwrap();
        let state = decode_state(schema, &written).unwrap().unwrap();
        assert_eq!(state.require_id().unwrap(), "00e1");
        assert_eq!(state.get("permissions_api_enabled"), &TypedValue::Bool(true));
    }

    #[test]
    fn test_import_missing_is_error() {
        let engine = mock_engine();
        let dir = TempDir::new().unwrap();

        let err = execute(&quiet(), &engine, &args("00e404", &dir)).unwrap_err();

        assert!(err.to_string().contains("Failed to import salesforce_profile 00e404"));
        let cause = err.downcast_ref::<declarative::Error>().unwrap();
        assert!(matches!(cause, declarative::Error::Remote(remote) if remote.is_not_found()));
        assert!(!dir.path().join("profile.json").exists());
    }
}
