//! FHIR `Parameters` wire model
//!
//! Evaluation engines do not guarantee the shape of each parameter, so every
//! value slot is kept as raw JSON and interpreted later by [`crate::decode`].
//! Reading a bundle never fails on a malformed entry; only a payload that is
//! not a `Parameters` resource at all is rejected by [`Parameters::from_resource`].

use octofhir_qm_diagnostics::{QmError, Result, QM0001, QM0002};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::{decode, DecodedValue};

/// One `Parameters.parameter` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameter {
    /// CQL statement name; drives classification
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<Value>,
    /// Embedded resource, or an array of resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
    /// Primitive extension shadow of `valueBoolean`
    #[serde(rename = "_valueBoolean", skip_serializing_if = "Option::is_none")]
    pub value_boolean_element: Option<Value>,
}

impl Parameter {
    /// Create a parameter with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_boolean(mut self, value: bool) -> Self {
        self.value_boolean = Some(Value::Bool(value));
        self
    }

    pub fn with_integer(mut self, value: i64) -> Self {
        self.value_integer = Some(Value::from(value));
        self
    }

    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.value_string = Some(Value::String(value.into()));
        self
    }

    pub fn with_resource(mut self, resource: Value) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Read a parameter from arbitrary JSON.
    ///
    /// Non-object input yields an unnamed, empty parameter. JSON `null` in a
    /// value slot counts as absent.
    pub fn from_value(value: &Value) -> Self {
        let slot = |key: &str| value.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            value_boolean: slot("valueBoolean"),
            value_integer: slot("valueInteger"),
            value_string: slot("valueString"),
            resource: slot("resource"),
            value_boolean_element: slot("_valueBoolean"),
        }
    }

    /// Decode this parameter's value
    pub fn decode(&self) -> DecodedValue {
        decode(self)
    }

    /// `resourceType` of the embedded resource (first element for arrays)
    pub fn resource_type(&self) -> Option<&str> {
        let resource = self.resource.as_ref()?;
        let first = match resource {
            Value::Array(items) => items.first()?,
            other => other,
        };
        first.get("resourceType").and_then(Value::as_str)
    }
}

/// A FHIR `Parameters` resource: an ordered list of named values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub parameter: Vec<Parameter>,
}

impl Parameters {
    pub fn new(parameter: Vec<Parameter>) -> Self {
        Self { id: None, parameter }
    }

    /// Lenient read: a missing or non-array `parameter` yields an empty bundle
    pub fn from_value(value: &Value) -> Self {
        let parameter = value
            .get("parameter")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(Parameter::from_value).collect())
            .unwrap_or_default();
        Self {
            id: value.get("id").and_then(Value::as_str).map(str::to_string),
            parameter,
        }
    }

    /// Read a resource that must be a `Parameters`.
    ///
    /// An `OperationOutcome` (or any other resource type) is rejected with its
    /// diagnostics text when present.
    pub fn from_resource(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(QmError::input(QM0001, "expected a JSON object"));
        }
        match value.get("resourceType").and_then(Value::as_str) {
            None | Some("Parameters") => Ok(Self::from_value(value)),
            Some("OperationOutcome") => {
                let detail = value
                    .pointer("/issue/0/diagnostics")
                    .or_else(|| value.pointer("/issue/0/details/text"))
                    .and_then(Value::as_str)
                    .unwrap_or("no diagnostics provided");
                Err(QmError::input(
                    QM0002,
                    format!("server returned an OperationOutcome: {}", detail),
                ))
            }
            Some(other) => Err(QmError::input(
                QM0002,
                format!("expected a Parameters resource, found {}", other),
            )),
        }
    }

    /// Parse JSON text into a `Parameters` resource
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| QmError::input(QM0001, format!("invalid JSON: {}", e)))?;
        Self::from_resource(&value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameter.iter()
    }

    pub fn len(&self) -> usize {
        self.parameter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameter.is_empty()
    }

    /// First parameter with the given name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameter.iter().find(|p| p.name == name)
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameter.iter()
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
