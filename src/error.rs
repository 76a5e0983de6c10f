use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::handler::HandlerError;
use crate::pipeline::{FormatError, ValidateError};

/// Where in the input a load diagnostic points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadLocation {
    pub path: Option<String>,
    pub source_path: Option<PathBuf>,
    pub line: Option<usize>,
    pub col: Option<usize>,
    pub json_pointer: Option<String>,
}

impl LoadLocation {
    pub fn at_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn at_path_with_position(
        path: impl Into<String>,
        line: Option<usize>,
        col: Option<usize>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            line,
            col,
            ..Self::default()
        }
    }

    pub fn with_source_path(mut self, source_path: Option<&Path>) -> Self {
        self.source_path = source_path.map(Path::to_path_buf);
        self
    }

    pub fn with_json_pointer(mut self, pointer: Option<String>) -> Self {
        self.json_pointer = pointer;
        self
    }

    /// Human-readable `path:line:col` form, if there is anything to show.
    pub fn describe(&self) -> Option<String> {
        let base = self
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| self.path.clone())?;
        Some(match (self.line, self.col) {
            (Some(line), Some(col)) => format!("{base}:{line}:{col}"),
            (Some(line), None) => format!("{base}:{line}"),
            _ => base,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SchemaErrorDetail {
    pub message: String,
    pub location: LoadLocation,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {message}", .location.describe().unwrap_or_default())]
    Read {
        message: String,
        location: LoadLocation,
    },
    #[error("JSON parse error at {}: {message}", .location.describe().unwrap_or_default())]
    Json {
        message: String,
        location: LoadLocation,
    },
    #[error("Workflow schema validation failed:\n{message}")]
    Schema {
        message: String,
        details: Vec<SchemaErrorDetail>,
        location: LoadLocation,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        location: LoadLocation,
    },
}

impl LoadError {
    pub fn location(&self) -> &LoadLocation {
        match self {
            LoadError::Read { location, .. }
            | LoadError::Json { location, .. }
            | LoadError::Schema { location, .. }
            | LoadError::Internal { location, .. } => location,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read pipeline config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported pipeline config format in {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum TranspileError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("node #{index} ('{node_name}', type '{node_type}') could not be generated: {source}")]
    Generation {
        index: usize,
        node_name: String,
        node_type: String,
        #[source]
        source: HandlerError,
    },
    #[error("formatting failed; unformatted code written to {}: {source}", .output.display())]
    Format {
        output: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("generated Python code in {} is invalid: {source}", .output.display())]
    Validation {
        output: PathBuf,
        #[source]
        source: ValidateError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TranspileError>;
