//! Global describe response types.

use declarative::{ObjectMetadata, Record};
use serde::Deserialize;
use std::collections::HashMap;

/// Body of `GET /services/data/vXX.X/sobjects`
#[derive(Debug, Deserialize)]
pub(crate) struct GlobalDescribe {
    pub sobjects: Vec<SObjectDescribe>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SObjectDescribe {
    pub name: String,
    pub urls: SObjectUrls,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SObjectUrls {
    pub sobject: String,
    pub row_template: String,
}

/// Body of a successful create
#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    pub id: String,
}

/// One batch of `GET /services/data/vXX.X/query`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResponse {
    pub records: Vec<Record>,
    /// Set while more batches remain
    #[serde(default)]
    pub next_records_url: Option<String>,
}

impl GlobalDescribe {
    /// Index by object name
    pub fn into_metadata(self) -> HashMap<String, ObjectMetadata> {
        self.sobjects
            .into_iter()
            .map(|s| {
                let meta = ObjectMetadata {
                    name: s.name.clone(),
                    sobject_url: s.urls.sobject,
                    row_template: s.urls.row_template,
                };
                (s.name, meta)
            })
            .collect()
    }
}
