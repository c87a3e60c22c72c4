//! Data sources - find an existing remote object by one of its fields
//!
//! A data source is described by an ordinary [`ResourceSchema`] registered
//! with [`Engine::with_data_sources`]. Lookups never write; the result is a
//! state the host can reference, e.g. a profile id to give a new user.

use crate::client::RemoteObjectClient;
use crate::codec::project_remote;
use crate::engine::Engine;
use crate::error::{Error, RemoteError, Result};
use crate::schema::{AttrType, AttributeSpec, ID_ATTRIBUTE, ResourceSchema};
use crate::types::ResourceState;
use serde_json::Value;

/// Quote a string as a SOQL literal
pub fn soql_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if matches!(c, '\'' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// `SELECT` every remote field of `schema` where `field` equals `value`
pub fn select_where(schema: &ResourceSchema, field: &AttributeSpec, value: &str) -> String {
    let fields: Vec<&str> = schema
        .attributes
        .iter()
        .filter(|a| !a.local)
        .map(|a| a.remote_name.as_str())
        .collect();
    format!(
        "SELECT {} FROM {} WHERE {} = {}",
        fields.join(", "),
        schema.api_name,
        field.remote_name,
        soql_literal(value)
    )
}

impl<C: RemoteObjectClient> Engine<C> {
    /// Find the object of data source `type_name` whose `attribute` equals
    /// `value`.
    ///
    /// # Errors
    ///
    /// No match is a `NotFound` remote error, unlike [`Engine::read`]: a
    /// lookup exists to resolve something the caller depends on.
    pub fn lookup(&self, type_name: &str, attribute: &str, value: &str) -> Result<ResourceState> {
        let schema = self.data_source(type_name)?;
        let field = schema
            .get(attribute)
            .filter(|a| a.name != ID_ATTRIBUTE && !a.local && a.ty == AttrType::String)
            .ok_or_else(|| {
                Error::schema(
                    type_name,
                    format!("{attribute:?} is not a string field that can be looked up"),
                )
            })?;

        let soql = select_where(schema, field, value);
        log::debug!("Query {soql}");
        let records = self.client().query(&soql)?;

        let filter = format!("{} = {}", field.remote_name, soql_literal(value));
        let Some(record) = records.first() else {
            return Err(Error::Remote(RemoteError::not_found(format!(
                "No {} where {filter}",
                schema.api_name
            ))));
        };
        if records.len() > 1 {
            log::warn!("{} {} records match {filter}, using the first", records.len(), schema.api_name);
        }

        let id = record.get("Id").and_then(Value::as_str).ok_or_else(|| {
            Error::Decode(format!("{type_name}: query result carries no Id"))
        })?;
        project_remote(schema, record, id, None)
    }
}
