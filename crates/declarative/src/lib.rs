//! # Declarative
//!
//! A schema-driven engine for managing remote objects from declared state.
//!
//! Resource types are described as data in a [`SchemaRegistry`]; one generic
//! engine plans, applies and reads every registered type against a
//! [`RemoteObjectClient`].
//!
//! ## Core Concepts
//!
//! - **TypedValue**: Dynamic attribute value, where `Unknown` ("known after
//!   apply") is distinct from `Null` ("no value")
//! - **ResourceSchema**: Attributes with their type and flags (required,
//!   optional, computed, immutable, local), plus remote naming and delete policy
//! - **ResourceState**: One snapshot of a resource - prior, proposed, planned or new
//! - **Engine**: Plan (pure), apply (create/update/destroy), read, and
//!   lookups of existing objects through registered data sources
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use declarative::{
//!     AttrType, AttributeSpec, Engine, MockClient, Operation, ResourceSchema,
//!     ResourceState, SchemaRegistry, TypedValue,
//! };
//!
//! let registry = SchemaRegistry::builder()
//!     .register(
//!         ResourceSchema::new("salesforce_user_role", "UserRole")
//!             .attribute(AttributeSpec::required("name", AttrType::String).remote("Name")),
//!     )
//!     .build()?;
//! let engine = Engine::new(Arc::new(registry), MockClient::new());
//!
//! let proposed = ResourceState::new("salesforce_user_role").with("name", "CEO");
//! let plan = engine.plan("salesforce_user_role", None, Some(&proposed))?;
//! assert_eq!(plan.op, Operation::Create);
//!
//! let planned = plan.planned.unwrap();
//! assert!(planned.id().is_unknown());
//!
//! let outcome = engine.apply("salesforce_user_role", None, Some(&planned))?;
//! assert_eq!(outcome.new_state.unwrap().id(), &TypedValue::from("001"));
//! # Ok::<(), declarative::Error>(())
//! ```
//!
//! ## Boundaries
//!
//! - [`codec::wire`]: tagged JSON exchanged with the host, carries `Unknown`
//! - [`codec::remote`]: plain JSON sent to the remote, never carries `Unknown`
//! - [`RemoteObjectClient`]: the only way the engine reaches the network

pub mod apply;
pub mod client;
pub mod codec;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod plan;
pub mod read;
pub mod schema;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use client::{Call, MockClient, ObjectMetadata, Record, RemoteObjectClient, RemoteResult};
pub use engine::Engine;
pub use error::{Error, ErrorCategory, RemoteError, RemoteErrorKind, Result};
pub use schema::{
    AttrType, AttributeSpec, DeletePolicy, ID_ATTRIBUTE, PasswordReset, ResourceSchema, SchemaRegistry,
    SchemaRegistryBuilder,
};
pub use types::{ApplyOutcome, Operation, PlanResult, ReadOutcome, ResourceState, Warning};
pub use value::{Attributes, TypedValue};
