//! Engine - binds a schema registry to a remote client
//!
//! Every operation is self-contained: the engine keeps no per-resource
//! state between calls, so one engine can serve concurrent requests for
//! different resources.

use crate::client::RemoteObjectClient;
use crate::error::Result;
use crate::plan;
use crate::schema::{ResourceSchema, SchemaRegistry};
use crate::types::{PlanResult, ResourceState};
use std::sync::Arc;

pub struct Engine<C> {
    registry: Arc<SchemaRegistry>,
    data_sources: Arc<SchemaRegistry>,
    client: C,
}

impl<C: RemoteObjectClient> Engine<C> {
    pub fn new(registry: Arc<SchemaRegistry>, client: C) -> Self {
        Self {
            registry,
            data_sources: Arc::default(),
            client,
        }
    }

    /// Register read-only lookup types, see [`Engine::lookup`]
    pub fn with_data_sources(mut self, data_sources: Arc<SchemaRegistry>) -> Self {
        self.data_sources = data_sources;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn data_sources(&self) -> &SchemaRegistry {
        &self.data_sources
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Schema for a resource type
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownResourceType`] if the type is not registered.
    pub fn schema(&self, type_name: &str) -> Result<&ResourceSchema> {
        self.registry.lookup(type_name)
    }

    /// Schema for a data source type
    pub fn data_source(&self, type_name: &str) -> Result<&ResourceSchema> {
        self.data_sources.lookup(type_name)
    }

    /// Plan a change. Does not contact the remote.
    pub fn plan(
        &self,
        type_name: &str,
        prior: Option<&ResourceState>,
        proposed: Option<&ResourceState>,
    ) -> Result<PlanResult> {
        plan::plan(self.schema(type_name)?, prior, proposed)
    }
}
