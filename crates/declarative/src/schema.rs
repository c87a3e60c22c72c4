//! Schema registry
//!
//! A [`SchemaRegistry`] maps resource type names to their [`ResourceSchema`].
//! It is built once at startup through [`SchemaRegistryBuilder`] and is
//! read-only afterwards, so it can be shared freely between threads.
//!
//! Everything that differs between resource kinds lives here as data: remote
//! field names, creation-only attributes, defaults, and whether the remote
//! allows deletion at all.

use crate::error::{Error, Result};
use crate::value::TypedValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name of the identity attribute every schema must declare
pub const ID_ATTRIBUTE: &str = "id";

/// Declared type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Bool,
    Number,
    String,
    Object,
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Object => "object",
        };
        write!(f, "{name}")
    }
}

/// Specification of a single attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub name: String,
    pub ty: AttrType,
    /// Field name on the remote API
    pub remote_name: String,
    pub required: bool,
    pub optional: bool,
    /// Value is determined by the remote system
    pub computed: bool,
    /// Settable at create time only
    pub immutable: bool,
    /// No remote counterpart; never sent, carried forward on read
    pub local: bool,
    /// Substituted at plan time when an optional attribute is left null
    pub default: Option<TypedValue>,
}

impl AttributeSpec {
    fn new(name: impl Into<String>, ty: AttrType) -> Self {
        let name = name.into();
        Self {
            remote_name: name.clone(),
            name,
            ty,
            required: false,
            optional: false,
            computed: false,
            immutable: false,
            local: false,
            default: None,
        }
    }

    /// A required attribute
    pub fn required(name: impl Into<String>, ty: AttrType) -> Self {
        Self {
            required: true,
            ..Self::new(name, ty)
        }
    }

    /// An optional attribute
    pub fn optional(name: impl Into<String>, ty: AttrType) -> Self {
        Self {
            optional: true,
            ..Self::new(name, ty)
        }
    }

    /// An attribute only the remote system sets
    pub fn computed(name: impl Into<String>, ty: AttrType) -> Self {
        Self {
            computed: true,
            ..Self::new(name, ty)
        }
    }

    /// The computed string `id` attribute
    pub fn id() -> Self {
        Self::computed(ID_ATTRIBUTE, AttrType::String).remote("Id")
    }

    /// Mark as computed as well (optional + computed)
    pub fn and_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Set the remote field name
    pub fn remote(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = remote_name.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<TypedValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Computed and never settable by the caller
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// Short flag summary, e.g. `optional, computed`
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.required {
            flags.push("required");
        }
        if self.optional {
            flags.push("optional");
        }
        if self.computed {
            flags.push("computed");
        }
        if self.immutable {
            flags.push("immutable");
        }
        if self.local {
            flags.push("local");
        }
        flags.join(", ")
    }
}

/// How a resource kind is removed on destroy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePolicy {
    /// A real delete call
    Delete,
    /// The remote forbids deletion; set `field` to false instead
    Deactivate { field: String },
}

/// Password reset requested through a local bool attribute.
///
/// After a create with `trigger` set, or an update that turns it on, the
/// engine asks the remote to reset the record's password. A create without
/// it yields a warning, since the new account has no way to sign in yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub trigger: String,
}

/// Schema of one resource kind
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    /// Host-facing type name, e.g. `salesforce_user`
    pub type_name: String,
    /// Remote object name, e.g. `User`
    pub api_name: String,
    pub attributes: Vec<AttributeSpec>,
    pub delete_policy: DeletePolicy,
    /// Issue a follow-up read after create/update to settle computed attributes
    pub refresh_after_write: bool,
    pub password_reset: Option<PasswordReset>,
}

impl ResourceSchema {
    /// Start a schema with the mandatory `id` attribute
    pub fn new(type_name: impl Into<String>, api_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            api_name: api_name.into(),
            attributes: vec![AttributeSpec::id()],
            delete_policy: DeletePolicy::Delete,
            refresh_after_write: false,
            password_reset: None,
        }
    }

    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.retain(|a| a.name != spec.name);
        self.attributes.push(spec);
        self
    }

    pub fn deactivate_with(mut self, field: impl Into<String>) -> Self {
        self.delete_policy = DeletePolicy::Deactivate {
            field: field.into(),
        };
        self
    }

    pub fn refresh_after_write(mut self) -> Self {
        self.refresh_after_write = true;
        self
    }

    /// Reset the password after writes that set `trigger`
    pub fn reset_password_with(mut self, trigger: impl Into<String>) -> Self {
        self.password_reset = Some(PasswordReset {
            trigger: trigger.into(),
        });
        self
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Look up an attribute by its remote field name
    pub fn by_remote_name(&self, remote_name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.remote_name == remote_name)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for attr in &self.attributes {
            if !seen.insert(attr.name.as_str()) {
                return Err(Error::schema(
                    &self.type_name,
                    format!("attribute {:?} declared twice", attr.name),
                ));
            }
            if attr.required && (attr.optional || attr.computed) {
                return Err(Error::schema(
                    &self.type_name,
                    format!("attribute {:?} cannot be both required and optional/computed", attr.name),
                ));
            }
            if let Some(default) = &attr.default
                && (!attr.optional || !default.conforms_to(attr.ty) || !default.is_fully_known())
            {
                return Err(Error::schema(
                    &self.type_name,
                    format!("attribute {:?} has an invalid default", attr.name),
                ));
            }
        }

        if let Some(reset) = &self.password_reset {
            match self.get(&reset.trigger) {
                Some(attr) if attr.ty == AttrType::Bool && attr.local => {}
                _ => {
                    return Err(Error::schema(
                        &self.type_name,
                        format!("password reset trigger {:?} must be a local bool attribute", reset.trigger),
                    ));
                }
            }
        }

        match self.get(ID_ATTRIBUTE) {
            Some(id) if id.ty == AttrType::String && id.is_computed_only() => Ok(()),
            _ => Err(Error::schema(
                &self.type_name,
                "schema must declare a computed string \"id\" attribute",
            )),
        }
    }
}

/// Immutable lookup table of resource schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Find the schema registered for a resource type
    pub fn lookup(&self, type_name: &str) -> Result<&ResourceSchema> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Collects schemas and validates them into a [`SchemaRegistry`]
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: Vec<ResourceSchema>,
}

impl SchemaRegistryBuilder {
    pub fn register(mut self, schema: ResourceSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn build(self) -> Result<SchemaRegistry> {
        let mut schemas = HashMap::with_capacity(self.schemas.len());
        for schema in self.schemas {
            schema.validate()?;
            let name = schema.type_name.clone();
            if schemas.insert(name.clone(), schema).is_some() {
                return Err(Error::schema(name, "resource type registered twice"));
            }
        }
        Ok(SchemaRegistry { schemas })
    }
}
