//! Read-only view over one decoded metrics snapshot.
//!
//! Values are only typed when read: `as_f64`/`as_str` return a `FieldError`
//! instead of assuming the upstream shape, which is what lets the translator
//! skip one bad metric and keep going.

use serde_json::Value;
use thiserror::Error;

use crate::error::{ChronexError, Result};

/// Failure to read a field with the expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing field {0:?}")]
    Missing(String),
    #[error("field {field:?}: expected {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },
}

/// A whole snapshot document. The root must be a JSON object.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Value,
}

impl Snapshot {
    /// Decode a snapshot from raw response bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|e| ChronexError::BadSnapshot(format!("invalid json: {e}")))?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(ChronexError::BadSnapshot(format!(
                "expected an object at the root, found {}",
                type_name(&root)
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            key: "",
            value: &self.root,
        }
    }
}

/// A node in the snapshot tree, remembering the key it was reached by.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    key: &'a str,
    value: &'a Value,
}

impl<'a> Node<'a> {
    pub fn key(self) -> &'a str {
        self.key
    }

    /// Underlying JSON value.
    pub fn value(self) -> &'a Value {
        self.value
    }

    /// Child by key, if this node is an object holding it.
    pub fn get(self, key: &str) -> Option<Node<'a>> {
        let (key, value) = self.value.as_object()?.get_key_value(key)?;
        Some(Node {
            key: key.as_str(),
            value,
        })
    }

    /// Child by key, failing with `FieldError::Missing`.
    pub fn path(self, key: &str) -> std::result::Result<Node<'a>, FieldError> {
        self.get(key).ok_or_else(|| FieldError::Missing(key.to_string()))
    }

    /// Children as `(name, node)` pairs. Empty for anything but an object.
    pub fn children(self) -> Vec<(&'a str, Node<'a>)> {
        match self.value.as_object() {
            Some(map) => map
                .iter()
                .map(|(k, v)| (k.as_str(), Node { key: k.as_str(), value: v }))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn as_f64(self) -> std::result::Result<f64, FieldError> {
        self.value.as_f64().ok_or_else(|| self.wrong_type("number"))
    }

    pub fn as_str(self) -> std::result::Result<&'a str, FieldError> {
        self.value.as_str().ok_or_else(|| self.wrong_type("string"))
    }

    /// Required numeric child.
    pub fn number(self, key: &str) -> std::result::Result<f64, FieldError> {
        self.path(key)?.as_f64()
    }

    /// Required string child.
    pub fn string(self, key: &str) -> std::result::Result<&'a str, FieldError> {
        self.path(key)?.as_str()
    }

    fn wrong_type(self, expected: &'static str) -> FieldError {
        let found = match self.value {
            Value::Object(_) | Value::Array(_) => type_name(self.value).to_string(),
            other => format!("{} {}", type_name(other), other),
        };
        FieldError::WrongType {
            field: self.key.to_string(),
            expected,
            found,
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
