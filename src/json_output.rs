use crate::{
    Outcome,
    error::{LoadError, LoadLocation, TranspileError},
    pipeline::ValidateError,
    transpile::Warning,
};
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
pub struct JsonDiagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl JsonDiagnostic {
    pub fn from_location(message: String, location: &LoadLocation) -> Self {
        JsonDiagnostic {
            message,
            source_path: location
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .or_else(|| location.path.clone()),
            line: location.line,
            col: location.col,
            json_pointer: location.json_pointer.clone(),
            node_index: None,
            node_name: None,
        }
    }

    pub fn from_message(message: String, source_path: Option<String>) -> Self {
        JsonDiagnostic {
            message,
            source_path,
            line: None,
            col: None,
            json_pointer: None,
            node_index: None,
            node_name: None,
        }
    }
}

/// Machine-readable summary of one run, printed by `--json`.
#[derive(Serialize, Clone, Debug)]
pub struct RunJsonOutput {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reformatted: Option<bool>,
    /// Whether Python compiled the program, as opposed to a structural check only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonDiagnostic>,
}

impl RunJsonOutput {
    pub fn success(outcome: &Outcome) -> Self {
        RunJsonOutput {
            ok: true,
            output: Some(outcome.output.display().to_string()),
            reformatted: Some(outcome.reformatted),
            compiled: Some(outcome.compiled()),
            warnings: outcome.warnings.clone(),
            errors: Vec::new(),
        }
    }

    pub fn failure(err: &TranspileError) -> Self {
        RunJsonOutput {
            ok: false,
            output: written_output(err),
            reformatted: None,
            compiled: None,
            warnings: Vec::new(),
            errors: diagnostics_for(err),
        }
    }
}

fn written_output(err: &TranspileError) -> Option<String> {
    match err {
        TranspileError::Format { output, .. } | TranspileError::Validation { output, .. } => {
            Some(output.display().to_string())
        }
        _ => None,
    }
}

fn diagnostics_for(err: &TranspileError) -> Vec<JsonDiagnostic> {
    match err {
        TranspileError::Load(LoadError::Schema { details, .. }) => details
            .iter()
            .map(|detail| JsonDiagnostic::from_location(detail.message.clone(), &detail.location))
            .collect(),
        TranspileError::Load(load) => {
            vec![JsonDiagnostic::from_location(load.to_string(), load.location())]
        }
        TranspileError::Generation {
            index,
            node_name,
            source,
            ..
        } => {
            let mut diag = JsonDiagnostic::from_message(source.to_string(), None);
            diag.node_index = Some(*index);
            diag.node_name = Some(node_name.clone());
            vec![diag]
        }
        TranspileError::Validation {
            output,
            source: ValidateError::Syntax(syntax),
        } => {
            let mut diag = JsonDiagnostic::from_message(
                syntax.message.clone(),
                Some(output.display().to_string()),
            );
            diag.line = syntax.line;
            vec![diag]
        }
        other => vec![JsonDiagnostic::from_message(other.to_string(), None)],
    }
}
