//! The contract every node handler satisfies.
//!
//! A handler turns one [`NodeDoc`] into a block of Python statements. Handlers
//! are pure: no I/O, no shared state, the same node always yields the same
//! code. A handler that cannot produce code returns a [`HandlerError`]; it
//! never returns an empty body in place of an error.

use thiserror::Error;

use crate::model::NodeDoc;
use crate::python;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("missing required parameter '{key}'")]
    MissingParameter { key: String },
    #[error("parameter '{key}' must be {expected}")]
    InvalidParameter { key: String, expected: String },
    #[error("template render failed: {message}")]
    Render { message: String },
}

impl HandlerError {
    pub fn missing(key: &str) -> Self {
        HandlerError::MissingParameter {
            key: key.to_string(),
        }
    }

    pub fn invalid(key: &str, expected: &str) -> Self {
        HandlerError::InvalidParameter {
            key: key.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Signature of a handler function registered with [`register_handler!`](crate::register_handler).
pub type HandlerFn = fn(&NodeDoc) -> Result<String, HandlerError>;

pub trait Handler: Send + Sync {
    fn generate(&self, node: &NodeDoc) -> Result<String, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&NodeDoc) -> Result<String, HandlerError> + Send + Sync,
{
    fn generate(&self, node: &NodeDoc) -> Result<String, HandlerError> {
        self(node)
    }
}

/// Generated code for one node, headed by the node's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub comment: String,
    pub body: String,
}

impl Fragment {
    pub fn new(node_name: &str, body: impl Into<String>) -> Self {
        Self {
            comment: python::comment_text(node_name),
            body: body.into(),
        }
    }

    pub fn render(&self) -> String {
        let body = self.body.trim_end_matches('\n');
        if body.is_empty() {
            format!("# {}", self.comment)
        } else {
            format!("# {}\n{body}", self.comment)
        }
    }
}
