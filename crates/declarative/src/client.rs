//! Remote object client abstraction.
//!
//! The engine talks to the remote API only through [`RemoteObjectClient`].
//! The HTTP implementation lives in the `sobject` crate; [`MockClient`] keeps
//! records in memory for tests.
//!
//! ```
//! use declarative::client::{MockClient, RemoteObjectClient};
//! use serde_json::json;
//!
//! let client = MockClient::new();
//! let body = json!({"Name": "Support"}).as_object().unwrap().clone();
//! let id = client.post("UserRole", &body).unwrap();
//! assert_eq!(id, "001");
//! assert_eq!(client.get("UserRole", &id).unwrap()["Name"], "Support");
//! ```

use crate::error::RemoteError;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Result type alias for remote calls.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// JSON object as sent to or received from the remote.
pub type Record = Map<String, Value>;

/// Describe metadata for one remote object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Remote object name, e.g. `User`
    pub name: String,
    /// Collection URL used for creates
    pub sobject_url: String,
    /// Per-record URL with an `{ID}` placeholder
    pub row_template: String,
}

impl ObjectMetadata {
    /// URL of a single record
    pub fn row_url(&self, id: &str) -> String {
        self.row_template.replacen("{ID}", id, 1)
    }
}

/// Client for the remote object API.
///
/// One resource per call, blocking. Implementations are shared across
/// threads working on different resources.
pub trait RemoteObjectClient: Send + Sync {
    /// Per-type URL metadata, keyed by remote object name.
    fn describe(&self) -> RemoteResult<Arc<HashMap<String, ObjectMetadata>>>;

    /// Fetch a record.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` [`RemoteError`] if the record does not exist.
    fn get(&self, api_name: &str, id: &str) -> RemoteResult<Record>;

    /// Create a record and return its id.
    fn post(&self, api_name: &str, body: &Record) -> RemoteResult<String>;

    /// Update fields of a record.
    fn patch(&self, api_name: &str, id: &str, body: &Record) -> RemoteResult<()>;

    /// Delete a record.
    fn delete(&self, api_name: &str, id: &str) -> RemoteResult<()>;

    /// Ask the remote to reset a record's password and notify its owner.
    fn reset_password(&self, api_name: &str, id: &str) -> RemoteResult<()>;

    /// Run a SOQL query and return the matching records.
    ///
    /// An empty result is `Ok(vec![])`, not an error.
    fn query(&self, soql: &str) -> RemoteResult<Vec<Record>>;
}

/// A call received by [`MockClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get { api_name: String, id: String },
    Post { api_name: String, body: Record },
    Patch { api_name: String, id: String, body: Record },
    Delete { api_name: String, id: String },
    ResetPassword { api_name: String, id: String },
    Query { soql: String },
}

#[derive(Debug, Default)]
struct MockState {
    records: HashMap<String, BTreeMap<String, Record>>,
    next_id: u32,
    calls: Vec<Call>,
    failures: VecDeque<RemoteError>,
    get_failures: VecDeque<RemoteError>,
    reset_failures: VecDeque<RemoteError>,
}

/// In-memory client for testing without network access.
///
/// Ids are assigned sequentially as `001`, `002`, ... Queued failures are
/// returned by the next calls, one each, before any record is touched.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    /// Create a new empty mock client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record directly, bypassing call recording.
    pub fn insert(&self, api_name: &str, id: &str, record: Record) {
        let mut state = self.state.lock().unwrap();
        state
            .records
            .entry(api_name.to_string())
            .or_default()
            .insert(id.to_string(), record);
    }

    /// Remove a record directly, as if deleted out of band.
    pub fn remove(&self, api_name: &str, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(records) = state.records.get_mut(api_name) {
            records.remove(id);
        }
    }

    /// Stored fields of a record, without the response envelope.
    pub fn record(&self, api_name: &str, id: &str) -> Option<Record> {
        let state = self.state.lock().unwrap();
        state.records.get(api_name).and_then(|r| r.get(id)).cloned()
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        self.state.lock().unwrap().failures.push_back(error);
    }

    /// Make the next `get` fail with `error`, leaving other calls alone.
    pub fn fail_next_get(&self, error: RemoteError) {
        self.state.lock().unwrap().get_failures.push_back(error);
    }

    /// Make the next `reset_password` fail with `error`.
    pub fn fail_next_reset(&self, error: RemoteError) {
        self.state.lock().unwrap().reset_failures.push_back(error);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Body of the most recent patch call.
    pub fn last_patch(&self) -> Option<Record> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::Patch { body, .. } => Some(body),
            _ => None,
        })
    }

    /// Body of the most recent post call.
    pub fn last_post(&self) -> Option<Record> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::Post { body, .. } => Some(body),
            _ => None,
        })
    }

    fn record_call(&self, call: Call) -> RemoteResult<std::sync::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let failure = state.failures.pop_front();
        match failure {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

/// Split `SELECT .. FROM {api} WHERE {field} = '{value}'`, the only query
/// shape the mock understands.
fn parse_query(soql: &str) -> Option<(&str, &str, String)> {
    let (_, rest) = soql.split_once(" FROM ")?;
    let (api_name, filter) = rest.split_once(" WHERE ")?;
    let (field, literal) = filter.split_once(" = ")?;
    let literal = literal.trim().strip_prefix('\'')?.strip_suffix('\'')?;

    let mut value = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.extend(chars.next()),
            c => value.push(c),
        }
    }
    Some((api_name.trim(), field.trim(), value))
}

/// Stored record as the remote returns it
fn envelope(api_name: &str, id: &str, stored: &Record) -> Record {
    let mut record = Record::new();
    record.insert(
        "attributes".to_string(),
        serde_json::json!({ "type": api_name }),
    );
    record.insert("Id".to_string(), Value::String(id.to_string()));
    record.extend(stored.clone());
    record
}

fn missing(api_name: &str, id: &str) -> RemoteError {
    RemoteError::not_found(format!(
        r#"[{{"errorCode":"NOT_FOUND","message":"The requested resource does not exist: {api_name} {id}"}}]"#
    ))
}

impl RemoteObjectClient for MockClient {
    fn describe(&self) -> RemoteResult<Arc<HashMap<String, ObjectMetadata>>> {
        let state = self.state.lock().unwrap();
        let metadata = state
            .records
            .keys()
            .map(|name| {
                let base = format!("/services/data/v53.0/sobjects/{name}");
                let meta = ObjectMetadata {
                    name: name.clone(),
                    row_template: format!("{base}/{{ID}}"),
                    sobject_url: base,
                };
                (name.clone(), meta)
            })
            .collect();
        Ok(Arc::new(metadata))
    }

    fn get(&self, api_name: &str, id: &str) -> RemoteResult<Record> {
        let mut state = self.record_call(Call::Get {
            api_name: api_name.to_string(),
            id: id.to_string(),
        })?;
        if let Some(error) = state.get_failures.pop_front() {
            return Err(error);
        }
        let stored = state
            .records
            .get(api_name)
            .and_then(|r| r.get(id))
            .ok_or_else(|| missing(api_name, id))?;
        Ok(envelope(api_name, id, stored))
    }

    fn post(&self, api_name: &str, body: &Record) -> RemoteResult<String> {
        let mut state = self.record_call(Call::Post {
            api_name: api_name.to_string(),
            body: body.clone(),
        })?;
        state.next_id += 1;
        let id = format!("{:03}", state.next_id);
        state
            .records
            .entry(api_name.to_string())
            .or_default()
            .insert(id.clone(), body.clone());
        Ok(id)
    }

    fn patch(&self, api_name: &str, id: &str, body: &Record) -> RemoteResult<()> {
        let mut state = self.record_call(Call::Patch {
            api_name: api_name.to_string(),
            id: id.to_string(),
            body: body.clone(),
        })?;
        let stored = state
            .records
            .get_mut(api_name)
            .and_then(|r| r.get_mut(id))
            .ok_or_else(|| missing(api_name, id))?;
        stored.extend(body.clone());
        Ok(())
    }

    fn delete(&self, api_name: &str, id: &str) -> RemoteResult<()> {
        let mut state = self.record_call(Call::Delete {
            api_name: api_name.to_string(),
            id: id.to_string(),
        })?;
        state
            .records
            .get_mut(api_name)
            .and_then(|r| r.remove(id))
            .map(|_| ())
            .ok_or_else(|| missing(api_name, id))
    }

    fn reset_password(&self, api_name: &str, id: &str) -> RemoteResult<()> {
        let mut state = self.record_call(Call::ResetPassword {
            api_name: api_name.to_string(),
            id: id.to_string(),
        })?;
        if let Some(error) = state.reset_failures.pop_front() {
            return Err(error);
        }
        state
            .records
            .get(api_name)
            .and_then(|r| r.get(id))
            .map(|_| ())
            .ok_or_else(|| missing(api_name, id))
    }

    fn query(&self, soql: &str) -> RemoteResult<Vec<Record>> {
        let state = self.record_call(Call::Query {
            soql: soql.to_string(),
        })?;
        let (api_name, field, value) = parse_query(soql).ok_or_else(|| {
            RemoteError::rejected(
                format!(r#"[{{"errorCode":"MALFORMED_QUERY","message":"unsupported query: {soql}"}}]"#),
                Some(400),
            )
        })?;

        let Some(records) = state.records.get(api_name) else {
            return Ok(Vec::new());
        };
        Ok(records
            .iter()
            .filter(|(id, stored)| match field {
                "Id" => **id == value,
                _ => stored.get(field).and_then(Value::as_str) == Some(value.as_str()),
            })
            .map(|(id, stored)| envelope(api_name, id, stored))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_row_url() {
        let meta = ObjectMetadata {
            name: "User".to_string(),
            sobject_url: "/services/data/v53.0/sobjects/User".to_string(),
            row_template: "/services/data/v53.0/sobjects/User/{ID}".to_string(),
        };
        assert_eq!(meta.row_url("005"), "/services/data/v53.0/sobjects/User/005");
    }

    #[test]
    fn test_mock_crud() {
        let client = MockClient::new();
        let id = client.post("Profile", &body(json!({"Name": "Support"}))).unwrap();

        client.patch("Profile", &id, &body(json!({"Description": "Tier 1"}))).unwrap();
        let record = client.get("Profile", &id).unwrap();
        assert_eq!(record["Id"], "001");
        assert_eq!(record["Name"], "Support");
        assert_eq!(record["Description"], "Tier 1");
        assert_eq!(record["attributes"]["type"], "Profile");

        client.delete("Profile", &id).unwrap();
        assert!(client.get("Profile", &id).unwrap_err().is_not_found());
        assert!(client.delete("Profile", &id).unwrap_err().is_not_found());
        assert_eq!(client.calls().len(), 6);
    }

    #[test]
    fn test_mock_queued_failure() {
        let client = MockClient::new();
        client.fail_next(RemoteError::transient("service unavailable", Some(503)));

        let err = client.post("Profile", &Record::new()).unwrap_err();
        assert!(err.is_retryable());
        assert!(client.post("Profile", &Record::new()).is_ok());
    }

    #[test]
    fn test_mock_reset_password() {
        let client = MockClient::new();
        client.insert("User", "005", Record::new());

        client.reset_password("User", "005").unwrap();
        assert!(client.reset_password("User", "006").unwrap_err().is_not_found());
        assert_eq!(
            client.calls()[0],
            Call::ResetPassword {
                api_name: "User".to_string(),
                id: "005".to_string()
            }
        );
    }

    #[test]
    fn test_mock_query() {
        let client = MockClient::new();
        client.insert("Profile", "00e1", body(json!({"Name": "Standard User"})));
        client.insert("Profile", "00e2", body(json!({"Name": "O'Brien's"})));

        let found = client
            .query("SELECT Id, Name FROM Profile WHERE Name = 'Standard User'")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["Id"], "00e1");

        let quoted = client
            .query(r"SELECT Id FROM Profile WHERE Name = 'O\'Brien\'s'")
            .unwrap();
        assert_eq!(quoted[0]["Id"], "00e2");

        assert!(client.query("SELECT Id FROM Profile WHERE Name = 'Nobody'").unwrap().is_empty());
        assert!(client.query("SELECT Id FROM UserLicense WHERE Id = 'x'").unwrap().is_empty());
        assert!(!client.query("SELECT Id FROM Profile").unwrap_err().is_retryable());
    }

    #[test]
    fn test_mock_describe() {
        let client = MockClient::new();
        client.insert("User", "005", Record::new());
        let describe = client.describe().unwrap();
        assert_eq!(describe["User"].row_url("005"), "/services/data/v53.0/sobjects/User/005");
    }
}
