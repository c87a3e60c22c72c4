//! Apply engine - executes planned changes against the remote
//!
//! Each call is a single synchronous round trip (plus an optional settle
//! read). Nothing is retried here; retryable failures are reported as such
//! and the caller decides.

use crate::client::{Record, RemoteObjectClient};
use crate::codec::to_remote_json;
use crate::engine::Engine;
use crate::error::Result;
use crate::schema::{AttributeSpec, DeletePolicy, ID_ATTRIBUTE, ResourceSchema};
use crate::types::{ApplyOutcome, ReadOutcome, ResourceState, Warning};
use crate::value::TypedValue;
use serde_json::Value;

/// Which attributes a write may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Create,
    Update,
}

impl Write {
    fn sends(self, spec: &AttributeSpec, value: &TypedValue) -> bool {
        if spec.name == ID_ATTRIBUTE || spec.local || spec.is_computed_only() {
            return false;
        }
        // optional+computed attributes still waiting on the remote are left out;
        // anything else unknown is caught by the remote codec
        if spec.computed && value.is_unknown() {
            return false;
        }
        match self {
            Self::Create => true,
            Self::Update => !spec.immutable,
        }
    }
}

fn payload(schema: &ResourceSchema, planned: &ResourceState, write: Write) -> Result<Record> {
    to_remote_json(
        schema,
        schema
            .attributes
            .iter()
            .map(|spec| (spec, planned.get(&spec.name)))
            .filter(|(spec, value)| write.sends(spec, value)),
    )
}

fn is_set(state: &ResourceState, flag: &str) -> bool {
    state.get(flag).as_bool() == Some(true)
}

impl<C: RemoteObjectClient> Engine<C> {
    /// Apply a planned change, dispatching on which states are present.
    ///
    /// - `planned` is `None`: destroy the object named by `prior`
    /// - `prior` is `None`: create
    /// - both: update in place
    pub fn apply(
        &self,
        type_name: &str,
        prior: Option<&ResourceState>,
        planned: Option<&ResourceState>,
    ) -> Result<ApplyOutcome> {
        match (prior, planned) {
            (None, None) => {
                self.schema(type_name)?;
                Ok(ApplyOutcome::removed())
            }
            (Some(prior), None) => self.apply_destroy(type_name, prior.require_id()?),
            (None, Some(planned)) => self.apply_create(type_name, planned).map(|(_, outcome)| outcome),
            (Some(prior), Some(planned)) => self.apply_update(type_name, prior, planned),
        }
    }

    /// Create the object and return its new id along with the new state.
    ///
    /// Computed attributes other than `id` stay unknown unless the schema asks
    /// for a settle read.
    pub fn apply_create(&self, type_name: &str, planned: &ResourceState) -> Result<(String, ApplyOutcome)> {
        let schema = self.schema(type_name)?;
        let body = payload(schema, planned, Write::Create)?;

        log::debug!("Creating {} ({} fields)", schema.api_name, body.len());
        log::trace!("POST {} {}", schema.api_name, Value::Object(body.clone()));
        let id = self.client().post(&schema.api_name, &body)?;
        log::info!("Created {} {id}", schema.api_name);

        let mut state = planned.clone();
        state.type_name.clone_from(&schema.type_name);
        state.set(ID_ATTRIBUTE, id.as_str());

        let mut outcome = ApplyOutcome::with_state(state);
        if let Some(reset) = &schema.password_reset {
            if is_set(planned, &reset.trigger) {
                self.reset_password(schema, &id, "created", &mut outcome);
            } else {
                outcome.warn(Warning::new(
                    format!("No Password For {}", schema.api_name),
                    format!(
                        "{} {id} was created but no password reset was sent; \
                         set {} = true and apply if one is needed",
                        schema.api_name, reset.trigger
                    ),
                ));
            }
        }
        if schema.refresh_after_write {
            self.settle(schema, &id, &mut outcome);
        }
        Ok((id, outcome))
    }

    /// Send the planned values to the existing object named by `prior`.
    ///
    /// The whole allowed payload goes out every time; immutable attributes
    /// are never sent. A password reset is requested only when its trigger
    /// goes from unset to `true`.
    pub fn apply_update(
        &self,
        type_name: &str,
        prior: &ResourceState,
        planned: &ResourceState,
    ) -> Result<ApplyOutcome> {
        let schema = self.schema(type_name)?;
        let id = prior.require_id()?;
        let body = payload(schema, planned, Write::Update)?;

        log::debug!("Updating {} {id} ({} fields)", schema.api_name, body.len());
        log::trace!("PATCH {} {id} {}", schema.api_name, Value::Object(body.clone()));
        self.client().patch(&schema.api_name, id, &body)?;

        let mut state = planned.clone();
        state.type_name.clone_from(&schema.type_name);
        state.set(ID_ATTRIBUTE, id);

        let mut outcome = ApplyOutcome::with_state(state);
        if let Some(reset) = &schema.password_reset
            && is_set(planned, &reset.trigger)
            && !is_set(prior, &reset.trigger)
        {
            self.reset_password(schema, id, "updated", &mut outcome);
        }
        if schema.refresh_after_write {
            self.settle(schema, id, &mut outcome);
        }
        Ok(outcome)
    }

    /// Delete or deactivate the object. An object that is already gone counts
    /// as destroyed.
    pub fn apply_destroy(&self, type_name: &str, id: &str) -> Result<ApplyOutcome> {
        let schema = self.schema(type_name)?;
        let mut outcome = ApplyOutcome::removed();

        let result = match &schema.delete_policy {
            DeletePolicy::Delete => {
                log::debug!("Deleting {} {id}", schema.api_name);
                self.client().delete(&schema.api_name, id)
            }
            DeletePolicy::Deactivate { field } => {
                log::debug!("Deactivating {} {id}", schema.api_name);
                let mut body = Record::new();
                body.insert(field.clone(), Value::Bool(false));
                self.client().patch(&schema.api_name, id, &body).map(|()| {
                    outcome.warn(Warning::new(
                        format!("{} records cannot be deleted", schema.api_name),
                        format!(
                            "{} {id} was deactivated ({field} = false) and removed from state, \
                             but it still exists remotely",
                            schema.api_name
                        ),
                    ));
                })
            }
        };

        match result {
            Ok(()) => Ok(outcome),
            Err(e) if e.is_not_found() => {
                log::info!("{} {id} already gone", schema.api_name);
                Ok(ApplyOutcome::removed())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn reset_password(&self, schema: &ResourceSchema, id: &str, done: &str, outcome: &mut ApplyOutcome) {
        log::debug!("Resetting password for {} {id}", schema.api_name);
        if let Err(e) = self.client().reset_password(&schema.api_name, id) {
            log::warn!("Password reset for {} {id} failed: {e}", schema.api_name);
            outcome.warn(Warning::new(
                "Error Resetting Password",
                format!(
                    "{} {id} was {done} but the reset password request failed: {e}",
                    schema.api_name
                ),
            ));
        }
    }

    /// Follow-up read after a write. Failures here never undo the write.
    fn settle(&self, schema: &ResourceSchema, id: &str, outcome: &mut ApplyOutcome) {
        let previous = outcome.new_state.clone();
        match self.fetch(schema, id, previous.as_ref()) {
            Ok(ReadOutcome::Found(state)) => outcome.new_state = Some(state),
            Ok(ReadOutcome::NotFound) => outcome.warn(Warning::new(
                format!("Error Getting {}", schema.api_name),
                format!("{} {id} was written but could not be read back", schema.api_name),
            )),
            Err(e) => outcome.warn(Warning::new(format!("Error Getting {}", schema.api_name), e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Call, MockClient};
    use crate::error::{Error, RemoteError};
    use crate::schema::{AttrType, SchemaRegistry};
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .register(
                ResourceSchema::new("thing", "Thing")
                    .attribute(AttributeSpec::required("name", AttrType::String)),
            )
            .register(
                ResourceSchema::new("salesforce_profile", "Profile")
                    .attribute(AttributeSpec::required("name", AttrType::String).remote("Name"))
                    .attribute(
                        AttributeSpec::required("license_id", AttrType::String)
                            .immutable()
                            .remote("UserLicenseId"),
                    )
                    .attribute(
                        AttributeSpec::optional("permissions_api_enabled", AttrType::Bool)
                            .and_computed()
                            .remote("PermissionsApiEnabled"),
                    )
                    .refresh_after_write(),
            )
            .register(
                ResourceSchema::new("salesforce_user", "User")
                    .attribute(AttributeSpec::required("last_name", AttrType::String).remote("LastName"))
                    .attribute(AttributeSpec::computed("is_active", AttrType::Bool).remote("IsActive"))
                    .attribute(AttributeSpec::optional("reset_password", AttrType::Bool).local())
                    .deactivate_with("IsActive")
                    .reset_password_with("reset_password"),
            )
            .build()
            .unwrap()
    }

    fn engine() -> Engine<MockClient> {
        Engine::new(Arc::new(registry()), MockClient::new())
    }

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_create_posts_and_injects_id() {
        let engine = engine();
        let proposed = ResourceState::new("thing").with("name", "foo");
        let planned = engine.plan("thing", None, Some(&proposed)).unwrap().planned.unwrap();

        let (id, outcome) = engine.apply_create("thing", &planned).unwrap();

        assert_eq!(id, "001");
        assert_eq!(engine.client().last_post(), Some(record(json!({"name": "foo"}))));
        let state = outcome.new_state.unwrap();
        assert_eq!(state.get("name"), &TypedValue::from("foo"));
        assert_eq!(state.id(), &TypedValue::from("001"));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_update_skips_immutable() {
        let engine = engine();
        engine.client().insert(
            "Profile",
            "00e1",
            record(json!({"Name": "foo", "UserLicenseId": "L1", "PermissionsApiEnabled": true})),
        );
        let prior = ResourceState::new("salesforce_profile")
            .with("id", "00e1")
            .with("name", "foo")
            .with("license_id", "L1")
            .with("permissions_api_enabled", true);
        let planned = prior
            .clone()
            .with("name", "bar")
            .with("permissions_api_enabled", TypedValue::Null);

        engine.apply_update("salesforce_profile", &prior, &planned).unwrap();

        assert_eq!(engine.client().last_patch(), Some(record(json!({"Name": "bar"}))));
    }

    #[test]
    fn test_create_leaves_out_unknown_and_local() {
        let engine = engine();
        let planned = ResourceState::new("salesforce_user")
            .with("last_name", "Smith")
            .with("is_active", TypedValue::Unknown)
            .with("reset_password", true);

        let (_, outcome) = engine.apply_create("salesforce_user", &planned).unwrap();

        assert_eq!(engine.client().last_post(), Some(record(json!({"LastName": "Smith"}))));
        let state = outcome.new_state.unwrap();
        assert!(state.get("is_active").is_unknown());
        assert_eq!(state.get("reset_password"), &TypedValue::Bool(true));
    }

    #[test]
    fn test_create_with_unknown_required_attribute_is_a_bug() {
        let engine = engine();
        let planned = ResourceState::new("thing").with("name", TypedValue::Unknown);
        let err = engine.apply_create("thing", &planned).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert!(engine.client().calls().is_empty());
    }

    #[test]
    fn test_refresh_after_write_settles_computed() {
        let engine = engine();
        let planned = ResourceState::new("salesforce_profile")
            .with("name", "Support")
            .with("license_id", "L1")
            .with("permissions_api_enabled", TypedValue::Unknown);

        let (id, outcome) = engine.apply_create("salesforce_profile", &planned).unwrap();
        assert!(outcome.warnings.is_empty());
        let state = outcome.new_state.unwrap();
        assert_eq!(state.require_id().unwrap(), id);
        // the mock stores only what was posted, so the settled value is null, not unknown
        assert!(state.get("permissions_api_enabled").is_null());
        assert!(matches!(engine.client().calls().last(), Some(Call::Get { .. })));
    }

    #[test]
    fn test_settle_failure_becomes_warning() {
        let engine = engine();
        let planned = ResourceState::new("salesforce_profile")
            .with("name", "Support")
            .with("license_id", "L1")
            .with("permissions_api_enabled", TypedValue::Unknown);
        engine
            .client()
            .fail_next_get(RemoteError::transient("Service Unavailable", Some(503)));

        let (id, outcome) = engine.apply_create("salesforce_profile", &planned).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].summary, "Error Getting Profile");
        assert_eq!(outcome.warnings[0].detail, "Service Unavailable");
        let state = outcome.new_state.unwrap();
        assert_eq!(state.require_id().unwrap(), id);
        assert!(state.get("permissions_api_enabled").is_unknown());
        assert!(engine.client().record("Profile", &id).is_some());
    }

    #[test]
    fn test_settle_not_found_is_warning() {
        let engine = engine();
        engine.client().insert("Profile", "00e1", record(json!({"Name": "Support", "UserLicenseId": "L1"})));
        let prior = ResourceState::new("salesforce_profile")
            .with("id", "00e1")
            .with("name", "Support")
            .with("license_id", "L1")
            .with("permissions_api_enabled", false);
        let planned = prior.clone().with("name", "Renamed");
        engine.client().fail_next_get(RemoteError::not_found("gone"));

        let outcome = engine.apply_update("salesforce_profile", &prior, &planned).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.new_state.as_ref(), Some(&planned));
    }

    #[test]
    fn test_update_of_vanished_object_fails() {
        let engine = engine();
        let planned = ResourceState::new("thing").with("id", "001").with("name", "foo");
        let err = engine.apply_update("thing", &planned, &planned).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::NotFound);
    }

    #[test]
    fn test_create_failure_propagates() {
        let engine = engine();
        engine
            .client()
            .fail_next(RemoteError::transient("Service Unavailable", Some(503)));
        let planned = ResourceState::new("thing").with("name", "foo");
        let err = engine.apply_create("thing", &planned).unwrap_err();
        assert!(err.is_retryable());
        assert!(engine.client().record("Thing", "001").is_none());
    }

    #[test]
    fn test_destroy_deletes() {
        let engine = engine();
        engine.client().insert("Thing", "001", record(json!({"name": "foo"})));
        let outcome = engine.apply_destroy("thing", "001").unwrap();
        assert!(outcome.new_state.is_none());
        assert!(outcome.warnings.is_empty());
        assert!(engine.client().record("Thing", "001").is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let engine = engine();
        engine.client().insert("Thing", "001", record(json!({"name": "foo"})));
        engine.apply_destroy("thing", "001").unwrap();
        let again = engine.apply_destroy("thing", "001").unwrap();
        assert!(again.new_state.is_none());
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let engine = engine();

        let first = engine.apply_destroy("salesforce_user", "005").unwrap();
        let again = engine.apply_destroy("salesforce_user", "005").unwrap();

        for outcome in [first, again] {
            assert!(outcome.new_state.is_none());
            assert!(outcome.warnings.is_empty());
        }
        assert_eq!(engine.client().calls().len(), 2);
        assert!(engine.client().calls().iter().all(|c| matches!(c, Call::Patch { .. })));
    }

    fn new_user(reset_password: bool) -> ResourceState {
        ResourceState::new("salesforce_user")
            .with("last_name", "Smith")
            .with("is_active", TypedValue::Unknown)
            .with("reset_password", reset_password)
    }

    #[test]
    fn test_create_resets_password() {
        let engine = engine();
        let (id, outcome) = engine.apply_create("salesforce_user", &new_user(true)).unwrap();

        assert!(outcome.warnings.is_empty());
        assert_eq!(
            engine.client().calls().last(),
            Some(&Call::ResetPassword {
                api_name: "User".to_string(),
                id
            })
        );
    }

    #[test]
    fn test_create_without_reset_warns() {
        let engine = engine();
        let (_, outcome) = engine.apply_create("salesforce_user", &new_user(false)).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].summary, "No Password For User");
        assert!(outcome.warnings[0].detail.contains("reset_password = true"));
        assert!(
            !engine
                .client()
                .calls()
                .iter()
                .any(|c| matches!(c, Call::ResetPassword { .. }))
        );
    }

    #[test]
    fn test_failed_reset_is_warning() {
        let engine = engine();
        engine
            .client()
            .fail_next_reset(RemoteError::transient("Service Unavailable", Some(503)));

        let (id, outcome) = engine.apply_create("salesforce_user", &new_user(true)).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].summary, "Error Resetting Password");
        assert!(outcome.warnings[0].detail.contains("Service Unavailable"));
        assert_eq!(outcome.new_state.unwrap().require_id().unwrap(), id);
        assert!(engine.client().record("User", &id).is_some());
    }

    #[test]
    fn test_update_resets_password_on_transition() {
        let engine = engine();
        engine.client().insert("User", "005", record(json!({"LastName": "Smith"})));
        let prior = new_user(false).with("id", "005");
        let planned = prior.clone().with("reset_password", true);

        let outcome = engine.apply_update("salesforce_user", &prior, &planned).unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(matches!(engine.client().calls().last(), Some(Call::ResetPassword { .. })));

        // already set: no second reset
        let again = engine.apply_update("salesforce_user", &planned, &planned).unwrap();
        assert!(again.warnings.is_empty());
        assert!(matches!(engine.client().calls().last(), Some(Call::Patch { .. })));
    }

    #[test]
    fn test_destroy_deactivates_with_warning() {
        let engine = engine();
        engine
            .client()
            .insert("User", "005", record(json!({"LastName": "Smith", "IsActive": true})));

        let outcome = engine.apply_destroy("salesforce_user", "005").unwrap();

        assert!(outcome.new_state.is_none());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].summary, "User records cannot be deleted");
        assert_eq!(engine.client().last_patch(), Some(record(json!({"IsActive": false}))));
        assert_eq!(engine.client().record("User", "005").unwrap()["IsActive"], false);
    }

    #[test]
    fn test_destroy_remote_failure_propagates() {
        let engine = engine();
        engine.client().fail_next(RemoteError::rejected(
            r#"[{"errorCode":"DELETE_FAILED","message":"Cannot delete"}]"#,
            Some(400),
        ));
        let err = engine.apply_destroy("thing", "001").unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), r#"[{"errorCode":"DELETE_FAILED","message":"Cannot delete"}]"#);
    }

    #[test]
    fn test_apply_dispatch() {
        let engine = engine();
        let planned = ResourceState::new("thing").with("name", "foo");

        let created = engine.apply("thing", None, Some(&planned)).unwrap();
        let state = created.new_state.unwrap();

        let renamed = state.clone().with("name", "bar");
        let updated = engine.apply("thing", Some(&state), Some(&renamed)).unwrap();
        assert_eq!(updated.new_state.as_ref(), Some(&renamed));
        assert_eq!(engine.client().record("Thing", "001").unwrap()["name"], "bar");

        let destroyed = engine.apply("thing", Some(&renamed), None).unwrap();
        assert!(destroyed.new_state.is_none());
        assert!(engine.client().record("Thing", "001").is_none());
    }

    #[test]
    fn test_apply_destroy_without_id() {
        let engine = engine();
        let prior = ResourceState::new("thing").with("name", "foo");
        assert!(matches!(
            engine.apply("thing", Some(&prior), None),
            Err(Error::InvariantViolation(_))
        ));
    }
}
