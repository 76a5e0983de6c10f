use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::handler::HandlerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDoc {
    #[serde(default)]
    pub name: Option<String>,
    pub nodes: Vec<NodeDoc>,
    /// Kept verbatim; node order, not the connection graph, drives emission.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub connections: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl NodeDoc {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key).filter(|v| !v.is_null())
    }

    pub fn require(&self, key: &str) -> Result<&Value, HandlerError> {
        self.param(key).ok_or_else(|| HandlerError::missing(key))
    }

    pub fn require_str(&self, key: &str) -> Result<&str, HandlerError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| HandlerError::invalid(key, "a string"))
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, HandlerError> {
        match self.param(key) {
            None => Ok(default),
            Some(value) => value
                .as_str()
                .ok_or_else(|| HandlerError::invalid(key, "a string")),
        }
    }

    /// Numbers may be given as JSON numbers or numeric strings.
    pub fn require_number(&self, key: &str) -> Result<f64, HandlerError> {
        let value = self.require(key)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|n| n.is_finite())
            .ok_or_else(|| HandlerError::invalid(key, "a number"))
    }
}
