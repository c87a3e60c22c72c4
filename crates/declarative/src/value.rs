//! Dynamic value model
//!
//! [`TypedValue`] represents any attribute of any resource kind without a
//! per-kind Rust type. `Unknown` and `Null` are distinct: the first means
//! "decided by the remote during apply", the second means "no value".

use crate::schema::AttrType;
use std::collections::BTreeMap;
use std::fmt;

/// Attributes of an object value, ordered by name.
pub type Attributes = BTreeMap<String, TypedValue>;

/// Tagged runtime value for resource attributes
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// No value
    Null,
    /// Value will be known after apply
    Unknown,
    Bool(bool),
    Number(f64),
    String(String),
    Object(Attributes),
}

impl TypedValue {
    /// Build a string value
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Build an object value from name/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypedValue)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// True when neither this value nor anything nested in it is `Unknown`
    pub fn is_fully_known(&self) -> bool {
        match self {
            Self::Unknown => false,
            Self::Object(attrs) => attrs.values().all(Self::is_fully_known),
            _ => true,
        }
    }

    /// Runtime kind of a concrete value; `None` for `Null` and `Unknown`
    pub fn kind(&self) -> Option<AttrType> {
        match self {
            Self::Null | Self::Unknown => None,
            Self::Bool(_) => Some(AttrType::Bool),
            Self::Number(_) => Some(AttrType::Number),
            Self::String(_) => Some(AttrType::String),
            Self::Object(_) => Some(AttrType::Object),
        }
    }

    /// Whether this value may be stored in an attribute of the given type
    pub fn conforms_to(&self, ty: AttrType) -> bool {
        self.kind().is_none_or(|kind| kind == ty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Attributes> {
        match self {
            Self::Object(attrs) => Some(attrs),
            _ => None,
        }
    }
}

impl Default for TypedValue {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for TypedValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Unknown => write!(f, "(known after apply)"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Object(attrs) => {
                write!(f, "{{")?;
                for (i, (name, value)) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} = {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
