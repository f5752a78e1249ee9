//! Decoded parameter values
//!
//! [`decode`] maps one wire [`Parameter`] to exactly one [`DecodedValue`].
//! Decoding is pure and total: shapes it does not recognize become
//! [`DecodedValue::Null`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::parameter::Parameter;

/// Extension marking a value as absent
pub const DATA_ABSENT_REASON_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/data-absent-reason";

/// Extension marking a CQL result as an empty list
pub const CQF_IS_EMPTY_LIST_URL: &str = "http://hl7.org/fhir/StructureDefinition/cqf-isEmptyList";

/// The normalized value of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum DecodedValue {
    /// `valueBoolean`
    Boolean(bool),
    /// `valueInteger`
    Integer(i64),
    /// `valueString`
    String(String),
    /// Explicitly absent, or a shape the decoder does not recognize
    Null,
    /// CQL empty list (`cqf-isEmptyList`)
    #[serde(rename = "empty-list")]
    EmptyList,
    /// Embedded resource or array of resources, passed through unmodified
    Resource(Value),
}

impl DecodedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, Self::EmptyList)
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    /// True for values that carry no information (`null` or empty list)
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Null | Self::EmptyList)
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Embedded resources; an array contributes each of its elements
    pub fn resources(&self) -> Vec<&Value> {
        match self {
            Self::Resource(Value::Array(items)) => items.iter().collect(),
            Self::Resource(resource) => vec![resource],
            _ => Vec::new(),
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(true) => "true",
            Self::Boolean(false) => "false",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Null => "null",
            Self::EmptyList => "empty-list",
            Self::Resource(_) => "resource",
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "{}", s),
            Self::Null => write!(f, "null"),
            Self::EmptyList => write!(f, "[]"),
            Self::Resource(Value::Array(items)) => write!(f, "[{} resources]", items.len()),
            Self::Resource(resource) => {
                let resource_type = resource
                    .get("resourceType")
                    .and_then(Value::as_str)
                    .unwrap_or("Resource");
                match resource.get("id").and_then(Value::as_str) {
                    Some(id) => write!(f, "{}/{}", resource_type, id),
                    None => write!(f, "{}", resource_type),
                }
            }
        }
    }
}

/// A parameter name paired with its decoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: DecodedValue,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: DecodedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Decode one parameter. First matching rule wins:
///
/// 1. `valueBoolean` holding a JSON boolean
/// 2. `valueInteger` holding an integral number
/// 3. `valueString` holding a string
/// 4. `resource` holding an object or array
/// 5. `_valueBoolean.extension` (with `valueBoolean` absent): data-absent-reason
///    gives `Null`, `cqf-isEmptyList = true` gives `EmptyList`
/// 6. otherwise `Null`
pub fn decode(param: &Parameter) -> DecodedValue {
    if let Some(b) = param.value_boolean.as_ref().and_then(Value::as_bool) {
        return DecodedValue::Boolean(b);
    }

    if let Some(i) = param.value_integer.as_ref().and_then(integral) {
        return DecodedValue::Integer(i);
    }

    if let Some(s) = param.value_string.as_ref().and_then(Value::as_str) {
        return DecodedValue::String(s.to_string());
    }

    if let Some(resource) = param
        .resource
        .as_ref()
        .filter(|r| r.is_object() || r.is_array())
    {
        return DecodedValue::Resource(resource.clone());
    }

    if param.value_boolean.is_none() {
        if let Some(decoded) = decode_boolean_extensions(param) {
            return decoded;
        }
    }

    log::debug!("parameter '{}' has no recognized value shape, decoding as null", param.name);
    DecodedValue::Null
}

fn decode_boolean_extensions(param: &Parameter) -> Option<DecodedValue> {
    let extensions = param
        .value_boolean_element
        .as_ref()?
        .get("extension")?
        .as_array()?;

    for ext in extensions {
        let Some(url) = ext.get("url").and_then(Value::as_str) else {
            continue;
        };
        if is_data_absent_reason(url) {
            return Some(DecodedValue::Null);
        }
        if is_empty_list_marker(url) && ext.get("valueBoolean").and_then(Value::as_bool) == Some(true) {
            return Some(DecodedValue::EmptyList);
        }
    }
    None
}

fn is_data_absent_reason(url: &str) -> bool {
    url == DATA_ABSENT_REASON_URL || url.ends_with("/data-absent-reason")
}

fn is_empty_list_marker(url: &str) -> bool {
    url == CQF_IS_EMPTY_LIST_URL || url.ends_with("/cqf-isEmptyList")
}

fn integral(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
