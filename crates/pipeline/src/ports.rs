//! Typed component ports.
//!
//! A hosting workflow engine moves values between components as
//! [`PortValue`]s addressed by port name. Inside a component each port is a
//! statically typed [`InArg<T>`] or [`OutArg<T>`]; the [`PortData`] trait
//! converts between the two representations and is the single place port
//! types are checked.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ForgeSession, NodeId, PipelineError, RawRecord};

/// The type of value a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    String,
    Integer,
    ListOfString,
    FieldMapping,
    Boolean,
    /// An authenticated forge session.
    Client,
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::ListOfString => "list of string",
            Self::FieldMapping => "field mapping",
            Self::Boolean => "boolean",
            Self::Client => "client",
        };
        f.write_str(name)
    }
}

/// A value travelling between ports.
#[derive(Debug, Clone)]
pub enum PortValue {
    String(String),
    Integer(i64),
    ListOfString(Vec<String>),
    FieldMapping(RawRecord),
    Boolean(bool),
    Client(ForgeSession),
}

impl PortValue {
    /// The [`PortType`] of this value.
    pub fn port_type(&self) -> PortType {
        match self {
            Self::String(_) => PortType::String,
            Self::Integer(_) => PortType::Integer,
            Self::ListOfString(_) => PortType::ListOfString,
            Self::FieldMapping(_) => PortType::FieldMapping,
            Self::Boolean(_) => PortType::Boolean,
            Self::Client(_) => PortType::Client,
        }
    }

    /// Renders the value as JSON for display or hand-off to a non-Rust host.
    ///
    /// Client handles have no data representation and render as a fixed
    /// placeholder string.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::ListOfString(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            Self::FieldMapping(record) => Value::Object(record.as_map().clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Client(_) => Value::String("<client>".to_owned()),
        }
    }
}

impl PartialEq for PortValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::ListOfString(a), Self::ListOfString(b)) => a == b,
            (Self::FieldMapping(a), Self::FieldMapping(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            // Sessions compare by identity.
            (Self::Client(a), Self::Client(b)) => std::sync::Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// A Rust type that can sit behind a port.
pub trait PortData: Sized {
    /// The port type this Rust type maps to.
    const TYPE: PortType;

    fn into_value(self) -> PortValue;

    /// Extracts the Rust value, handing the original back on a type mismatch.
    fn from_value(value: PortValue) -> Result<Self, PortValue>;
}

macro_rules! port_data {
    ($ty:ty, $variant:ident) => {
        impl PortData for $ty {
            const TYPE: PortType = PortType::$variant;

            fn into_value(self) -> PortValue {
                PortValue::$variant(self)
            }

            fn from_value(value: PortValue) -> Result<Self, PortValue> {
                match value {
                    PortValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

port_data!(String, String);
port_data!(i64, Integer);
port_data!(Vec<String>, ListOfString);
port_data!(RawRecord, FieldMapping);
port_data!(bool, Boolean);
port_data!(ForgeSession, Client);

// ---------------------------------------------------------------------------
// Port slots
// ---------------------------------------------------------------------------

/// Static description of one port, as published to a hosting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSpec {
    pub name: &'static str,
    pub port_type: PortType,
    pub required: bool,
}

/// A typed input slot.
#[derive(Debug, Clone)]
pub struct InArg<T> {
    name: &'static str,
    required: bool,
    value: Option<T>,
}

impl<T: PortData + Clone> InArg<T> {
    /// An input that must be set before the component executes.
    pub const fn required(name: &'static str) -> Self {
        Self { name, required: true, value: None }
    }

    /// An input that may be left unset.
    pub const fn optional(name: &'static str) -> Self {
        Self { name, required: false, value: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spec(&self) -> PortSpec {
        PortSpec { name: self.name, port_type: T::TYPE, required: self.required }
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns the value, or [`PipelineError::MissingInput`] naming `node`.
    pub fn require(&self, node: &NodeId) -> Result<&T, PipelineError> {
        self.value.as_ref().ok_or_else(|| PipelineError::MissingInput {
            node: node.clone(),
            port: self.name,
        })
    }

    /// Stores a dynamically typed value after checking its type.
    pub fn accept(&mut self, value: PortValue) -> Result<(), PipelineError> {
        match T::from_value(value) {
            Ok(v) => {
                self.value = Some(v);
                Ok(())
            }
            Err(other) => Err(PipelineError::PortTypeMismatch {
                port: self.name.to_owned(),
                expected: T::TYPE,
                actual: other.port_type(),
            }),
        }
    }
}

/// A typed output slot, written once by `execute`.
#[derive(Debug, Clone)]
pub struct OutArg<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T: PortData + Clone> OutArg<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, value: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spec(&self) -> PortSpec {
        PortSpec { name: self.name, port_type: T::TYPE, required: false }
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Forgets the written value; components call this before each run.
    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The current value as a [`PortValue`], if one has been written.
    pub fn to_port_value(&self) -> Option<PortValue> {
        self.value.clone().map(T::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> NodeId {
        NodeId::new("list-issues").unwrap()
    }

    #[test]
    fn accept_checks_the_port_type() {
        let mut repo: InArg<String> = InArg::required("repo_name");
        let err = repo.accept(PortValue::Integer(5)).unwrap_err();
        assert_eq!(err.to_string(), "Port 'repo_name' expects string, got integer");
        assert!(repo.value().is_none());

        repo.accept(PortValue::String("octo/hello".into())).unwrap();
        assert_eq!(repo.value().map(String::as_str), Some("octo/hello"));
    }

    #[test]
    fn require_reports_the_missing_port() {
        let number: InArg<i64> = InArg::required("issue_number");
        let err = number.require(&node()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { port: "issue_number", .. }));
    }

    #[test]
    fn specs_carry_type_and_requiredness() {
        let token: InArg<String> = InArg::optional("token");
        assert_eq!(
            token.spec(),
            PortSpec { name: "token", port_type: PortType::String, required: false }
        );
        let titles: OutArg<Vec<String>> = OutArg::new("issues");
        assert_eq!(titles.spec().port_type, PortType::ListOfString);
    }

    #[test]
    fn unset_outputs_have_no_port_value() {
        let mut success: OutArg<bool> = OutArg::new("success");
        assert!(success.to_port_value().is_none());
        success.set(true);
        assert_eq!(success.to_port_value(), Some(PortValue::Boolean(true)));
        success.clear();
        assert!(success.to_port_value().is_none());
    }

    #[test]
    fn json_rendering_of_lists_and_mappings() {
        let list = PortValue::ListOfString(vec!["a".into(), "b".into()]);
        assert_eq!(list.to_json(), serde_json::json!(["a", "b"]));

        let record = RawRecord::from_value(serde_json::json!({"number": 1})).unwrap();
        assert_eq!(PortValue::FieldMapping(record).to_json()["number"], 1);
    }
}
