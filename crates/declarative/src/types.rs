//! Core types for planning and applying resource changes

use crate::error::{Error, Result};
use crate::schema::ID_ATTRIBUTE;
use crate::value::{Attributes, TypedValue};
use std::fmt;

/// Snapshot of one resource: its type plus all attribute values
///
/// Used for every lifecycle stage (prior, proposed, planned, new). The
/// engine never retains these; persistence belongs to the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceState {
    pub type_name: String,
    pub attributes: Attributes,
}

impl ResourceState {
    /// Create an empty state with an unknown `id`
    pub fn new(type_name: impl Into<String>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(ID_ATTRIBUTE.to_string(), TypedValue::Unknown);
        Self {
            type_name: type_name.into(),
            attributes,
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get an attribute, `Null` if absent
    pub fn get(&self, name: &str) -> &TypedValue {
        const NULL: &TypedValue = &TypedValue::Null;
        self.attributes.get(name).unwrap_or(NULL)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<TypedValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// The `id` attribute
    pub fn id(&self) -> &TypedValue {
        self.get(ID_ATTRIBUTE)
    }

    /// The `id` as a string, failing if it is not yet known
    pub fn require_id(&self) -> Result<&str> {
        self.id().as_str().ok_or_else(|| {
            Error::InvariantViolation(format!(
                "{} has no known id (found {})",
                self.type_name,
                self.id()
            ))
        })
    }

    /// Convert from a decoded top-level value; `Null` means "no resource"
    pub fn from_value(type_name: &str, value: TypedValue) -> Result<Option<Self>> {
        match value {
            TypedValue::Null => Ok(None),
            TypedValue::Object(attributes) => Ok(Some(Self {
                type_name: type_name.to_string(),
                attributes,
            })),
            other => Err(Error::Decode(format!(
                "{type_name}: expected an object or null at top level, found {other}"
            ))),
        }
    }

    /// Convert an optional state into a top-level value
    pub fn to_value(state: Option<&Self>) -> TypedValue {
        state.map_or(TypedValue::Null, |s| TypedValue::Object(s.attributes.clone()))
    }
}

/// Intended change for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    NoOp,
    Create,
    Update,
    Destroy,
}

impl Operation {
    /// Check if the operation changes the remote system
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        };
        write!(f, "{name}")
    }
}

/// Non-fatal diagnostic attached to a successful outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub summary: String,
    pub detail: String,
}

impl Warning {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

/// Result of planning a change
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// Planned state; `None` when the resource is being destroyed
    pub planned: Option<ResourceState>,
    pub op: Operation,
    /// Immutable attributes whose planned value differs from prior
    pub requires_replace: Vec<String>,
}

/// Result of applying a change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplyOutcome {
    /// Authoritative new state; `None` after destroy
    pub new_state: Option<ResourceState>,
    pub warnings: Vec<Warning>,
}

impl ApplyOutcome {
    pub fn with_state(state: ResourceState) -> Self {
        Self {
            new_state: Some(state),
            warnings: Vec::new(),
        }
    }

    pub fn removed() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Result of reading a resource
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The object exists; this is its refreshed state
    Found(ResourceState),
    /// The remote reports the object as missing
    NotFound,
}

impl ReadOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// The refreshed state, if the object exists
    pub fn into_state(self) -> Option<ResourceState> {
        match self {
            Self::Found(state) => Some(state),
            Self::NotFound => None,
        }
    }
}
