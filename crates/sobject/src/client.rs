//! HTTP implementation of [`RemoteObjectClient`].

use crate::connection::Connection;
use crate::describe::{CreateResponse, GlobalDescribe, QueryResponse};
use crate::error::{ConfigError, from_status, from_transport};
use declarative::{ObjectMetadata, Record, RemoteError, RemoteObjectClient, RemoteResult};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use ureq::Body;
use ureq::http::Response;

const USER_AGENT: &str = concat!("sobject-provider/", env!("CARGO_PKG_VERSION"));

type Describe = Arc<HashMap<String, ObjectMetadata>>;

/// Blocking client for the sObject REST API.
///
/// Object URLs come from the global describe, fetched on first use and
/// cached. The client is `Send + Sync` and meant to be shared.
///
/// # Example
///
/// ```no_run
/// use declarative::RemoteObjectClient;
/// use sobject::{Connection, ForceClient};
///
/// let conn = Connection::new("https://example.my.salesforce.com", "token");
/// let client = ForceClient::new(conn).unwrap();
/// let role = client.get("UserRole", "00E000000000001").unwrap();
/// println!("{}", role["Name"]);
/// ```
pub struct ForceClient {
    agent: ureq::Agent,
    conn: Connection,
    describe: RwLock<Option<Describe>>,
}

impl ForceClient {
    /// Create a client for a validated connection.
    pub fn new(conn: Connection) -> Result<Self, ConfigError> {
        conn.validate()?;
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(conn.timeout))
            .http_status_as_error(false)
            .user_agent(USER_AGENT)
            .build()
            .into();
        Ok(Self {
            agent,
            conn,
            describe: RwLock::new(None),
        })
    }

    /// Settings this client was built with.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drop the cached describe; the next call fetches it again.
    pub fn invalidate(&self) {
        *self.describe.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.conn.access_token)
    }

    fn fetch_describe(&self) -> RemoteResult<Describe> {
        let url = self.conn.describe_url();
        log::debug!("GET {url}");
        let mut response = check(
            self.agent
                .get(&url)
                .header("Authorization", self.bearer())
                .header("Accept", "application/json")
                .call(),
        )?;
        let describe: GlobalDescribe = response.body_mut().read_json().map_err(from_transport)?;
        let metadata = Arc::new(describe.into_metadata());
        log::debug!("Describe returned {} object types", metadata.len());

        *self.describe.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&metadata));
        Ok(metadata)
    }

    /// URL metadata for one object type, refreshing the cache once if the
    /// name is not in it.
    fn metadata(&self, api_name: &str) -> RemoteResult<ObjectMetadata> {
        let cached = self
            .describe
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(meta) = cached.as_ref().and_then(|d| d.get(api_name)) {
            return Ok(meta.clone());
        }

        if cached.is_some() {
            log::debug!("{api_name} not in cached describe, refreshing");
        }
        self.fetch_describe()?
            .get(api_name)
            .cloned()
            .ok_or_else(|| {
                RemoteError::rejected(
                    format!("object type {api_name} is not available in this org"),
                    None,
                )
            })
    }

    fn row_url(&self, api_name: &str, id: &str) -> RemoteResult<String> {
        Ok(self.conn.absolute(&self.metadata(api_name)?.row_url(id)))
    }

    fn password_url(&self, api_name: &str, id: &str) -> RemoteResult<String> {
        Ok(format!("{}/password", self.row_url(api_name, id)?))
    }

    fn query_page(&self, url: &str, soql: Option<&str>) -> RemoteResult<QueryResponse> {
        log::debug!("GET {url}");
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", self.bearer())
            .header("Accept", "application/json");
        if let Some(soql) = soql {
            request = request.query("q", soql);
        }
        let mut response = check(request.call())?;
        response.body_mut().read_json().map_err(from_transport)
    }
}

/// Turn a raw response into a success or a classified error.
fn check(result: Result<Response<Body>, ureq::Error>) -> RemoteResult<Response<Body>> {
    let mut response = result.map_err(from_transport)?;
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    let body = error_body(status, response.body_mut().read_to_string());
    log::debug!("HTTP {status}: {body}");
    Err(from_status(status, body))
}

/// Message for a failed response; an unreadable body still says what happened.
fn error_body(status: u16, read: Result<String, ureq::Error>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => format!("HTTP {status}: error body could not be read: {e}"),
    }
}

impl RemoteObjectClient for ForceClient {
    fn describe(&self) -> RemoteResult<Describe> {
        let cached = self
            .describe
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match cached {
            Some(describe) => Ok(describe),
            None => self.fetch_describe(),
        }
    }

    fn get(&self, api_name: &str, id: &str) -> RemoteResult<Record> {
        let url = self.row_url(api_name, id)?;
        log::debug!("GET {url}");
        let mut response = check(
            self.agent
                .get(&url)
                .header("Authorization", self.bearer())
                .header("Accept", "application/json")
                .call(),
        )?;
        response.body_mut().read_json().map_err(from_transport)
    }

    fn post(&self, api_name: &str, body: &Record) -> RemoteResult<String> {
        let url = self.conn.absolute(&self.metadata(api_name)?.sobject_url);
        log::debug!("POST {url}");
        let mut response = check(
            self.agent
                .post(&url)
                .header("Authorization", self.bearer())
                .header("Accept", "application/json")
                .send_json(body),
        )?;
        let created: CreateResponse = response.body_mut().read_json().map_err(from_transport)?;
        Ok(created.id)
    }

    fn patch(&self, api_name: &str, id: &str, body: &Record) -> RemoteResult<()> {
        let url = self.row_url(api_name, id)?;
        log::debug!("PATCH {url}");
        check(
            self.agent
                .patch(&url)
                .header("Authorization", self.bearer())
                .header("Accept", "application/json")
                .send_json(body),
        )?;
        Ok(())
    }

    fn delete(&self, api_name: &str, id: &str) -> RemoteResult<()> {
        let url = self.row_url(api_name, id)?;
        log::debug!("DELETE {url}");
        check(
            self.agent
                .delete(&url)
                .header("Authorization", self.bearer())
                .call(),
        )?;
        Ok(())
    }

    fn reset_password(&self, api_name: &str, id: &str) -> RemoteResult<()> {
        let url = self.password_url(api_name, id)?;
        log::debug!("DELETE {url}");
        check(
            self.agent
                .delete(&url)
                .header("Authorization", self.bearer())
                .header("Accept", "application/json")
                .call(),
        )?;
        Ok(())
    }

    fn query(&self, soql: &str) -> RemoteResult<Vec<Record>> {
        let mut page = self.query_page(&self.conn.query_url(), Some(soql))?;
        let mut records = std::mem::take(&mut page.records);
        while let Some(next) = page.next_records_url.take() {
            page = self.query_page(&self.conn.absolute(&next), None)?;
            records.append(&mut page.records);
        }
        log::debug!("Query returned {} records", records.len());
        Ok(records)
    }
}
