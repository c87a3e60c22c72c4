//! Read engine - refreshes state from the remote

use crate::client::RemoteObjectClient;
use crate::codec::{decode_wire, encode_wire, project_remote};
use crate::engine::Engine;
use crate::error::{Error, RemoteError, Result};
use crate::schema::ResourceSchema;
use crate::types::{ReadOutcome, ResourceState};

/// Re-encode a stored state under `schema`. Needs no remote access.
pub fn upgrade_state(schema: &ResourceSchema, raw: &[u8]) -> Result<Vec<u8>> {
    let value = decode_wire(schema, raw)?;
    encode_wire(&value)
}

impl<C: RemoteObjectClient> Engine<C> {
    /// Fetch the object's current state.
    ///
    /// A missing object is [`ReadOutcome::NotFound`], not an error; the
    /// caller should drop it from state. Local attributes are carried over
    /// from `previous`.
    pub fn read(&self, type_name: &str, id: &str, previous: Option<&ResourceState>) -> Result<ReadOutcome> {
        self.fetch(self.schema(type_name)?, id, previous)
    }

    /// Read using the id stored in `previous`
    pub fn refresh(&self, previous: &ResourceState) -> Result<ReadOutcome> {
        self.read(&previous.type_name, previous.require_id()?, Some(previous))
    }

    /// Adopt an existing remote object by id.
    ///
    /// # Errors
    ///
    /// Unlike [`Engine::read`], a missing object is an error here.
    pub fn import(&self, type_name: &str, id: &str) -> Result<ResourceState> {
        match self.read(type_name, id, None)? {
            ReadOutcome::Found(state) => Ok(state),
            ReadOutcome::NotFound => Err(Error::Remote(RemoteError::not_found(format!(
                "cannot import non-existent remote object {type_name} {id}"
            )))),
        }
    }

    /// Re-encode a stored state under the current schema.
    ///
    /// Attributes the schema no longer declares fail to decode; newly added
    /// ones come back as null.
    pub fn upgrade_state(&self, type_name: &str, raw: &[u8]) -> Result<Vec<u8>> {
        upgrade_state(self.schema(type_name)?, raw)
    }

    pub(crate) fn fetch(
        &self,
        schema: &ResourceSchema,
        id: &str,
        previous: Option<&ResourceState>,
    ) -> Result<ReadOutcome> {
        log::debug!("Reading {} {id}", schema.api_name);
        match self.client().get(&schema.api_name, id) {
            Ok(record) => {
                log::trace!("GET {} {id} {}", schema.api_name, serde_json::Value::Object(record.clone()));
                Ok(ReadOutcome::Found(project_remote(schema, &record, id, previous)?))
            }
            Err(e) if e.is_not_found() => {
                log::info!("{} {id} not found remotely", schema.api_name);
                Ok(ReadOutcome::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockClient, Record};
    use crate::codec::encode_state;
    use crate::schema::{AttrType, AttributeSpec, SchemaRegistry};
    use crate::value::TypedValue;
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> Engine<MockClient> {
        let registry = SchemaRegistry::builder()
            .register(
                ResourceSchema::new("salesforce_user", "User")
                    .attribute(AttributeSpec::required("last_name", AttrType::String).remote("LastName"))
                    .attribute(AttributeSpec::optional("is_active", AttrType::Bool).and_computed().remote("IsActive"))
                    .attribute(AttributeSpec::optional("reset_password", AttrType::Bool).local()),
            )
            .build()
            .unwrap();
        Engine::new(Arc::new(registry), MockClient::new())
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_read_found() {
        let engine = engine();
        engine
            .client()
            .insert("User", "005", record(json!({"LastName": "Smith", "IsActive": true})));
        let previous = ResourceState::new("salesforce_user")
            .with("id", "005")
            .with("last_name", "Smyth")
            .with("reset_password", true);

        let state = engine.refresh(&previous).unwrap().into_state().unwrap();

        assert_eq!(state.get("last_name"), &TypedValue::from("Smith"));
        assert_eq!(state.get("is_active"), &TypedValue::Bool(true));
        assert_eq!(state.get("reset_password"), &TypedValue::Bool(true));
    }

    #[test]
    fn test_read_not_found_is_distinct() {
        let engine = engine();
        let outcome = engine.read("salesforce_user", "005", None).unwrap();
        assert!(outcome.is_not_found());
    }

    #[test]
    fn test_read_remote_error() {
        let engine = engine();
        engine
            .client()
            .fail_next(RemoteError::rejected(r#"[{"errorCode":"INVALID_SESSION_ID"}]"#, Some(401)));
        let err = engine.read("salesforce_user", "005", None).unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_import() {
        let engine = engine();
        engine.client().insert("User", "005", record(json!({"LastName": "Smith"})));

        let state = engine.import("salesforce_user", "005").unwrap();
        assert_eq!(state.require_id().unwrap(), "005");
        assert!(state.get("reset_password").is_null());

        let err = engine.import("salesforce_user", "006").unwrap_err();
        assert!(err.to_string().contains("non-existent"));
    }

    #[test]
    fn test_upgrade_state_fills_new_attributes() {
        let engine = engine();
        let old = ResourceState::new("salesforce_user")
            .with("id", "005")
            .with("last_name", "Smith");
        let raw = encode_state(Some(&old)).unwrap();

        let upgraded = engine.upgrade_state("salesforce_user", &raw).unwrap();
        let schema = engine.schema("salesforce_user").unwrap();
        let state = crate::codec::decode_state(schema, &upgraded).unwrap().unwrap();
        assert_eq!(state.get("last_name"), &TypedValue::from("Smith"));
        assert!(state.attributes.contains_key("is_active"));
        assert!(state.get("is_active").is_null());
    }

    #[test]
    fn test_upgrade_state_rejects_dropped_attribute() {
        let engine = engine();
        let raw = br#"{"kind":"object","value":{"nickname":{"kind":"string","value":"js"}}}"#;
        assert!(matches!(
            engine.upgrade_state("salesforce_user", raw),
            Err(Error::Decode(_))
        ));
    }
}
