use crate::{
    error::{LoadError, LoadLocation, SchemaErrorDetail},
    model::WorkflowDoc,
};
use jsonschema::Draft;
use serde_json::Value;
use std::{fs, path::Path};

const INLINE_SOURCE: &str = "<inline>";
const EMBEDDED_SCHEMA_LABEL: &str = "<embedded workflow schema>";
const EMBEDDED_SCHEMA: &str = include_str!("../schemas/workflow.schema.json");

/// Load a workflow document from a JSON string.
pub fn load_workflow_from_str(json: &str) -> Result<WorkflowDoc, LoadError> {
    load_with_schema_text(json, EMBEDDED_SCHEMA, EMBEDDED_SCHEMA_LABEL, INLINE_SOURCE, None)
}

/// Load a workflow document from a file.
pub fn load_workflow_from_path(path: &Path) -> Result<WorkflowDoc, LoadError> {
    let content = fs::read_to_string(path).map_err(|e| LoadError::Read {
        message: e.to_string(),
        location: LoadLocation::at_path(path.display().to_string()).with_source_path(Some(path)),
    })?;
    load_with_schema_text(
        &content,
        EMBEDDED_SCHEMA,
        EMBEDDED_SCHEMA_LABEL,
        path.display().to_string(),
        Some(path),
    )
}

pub(crate) fn load_with_schema_text(
    json: &str,
    schema_text: &str,
    schema_label: &str,
    source_label: impl Into<String>,
    source_path: Option<&Path>,
) -> Result<WorkflowDoc, LoadError> {
    let source_label = source_label.into();
    let doc: Value = serde_json::from_str(json).map_err(|e| LoadError::Json {
        message: e.to_string(),
        location: LoadLocation::at_path_with_position(
            source_label.clone(),
            Some(e.line()),
            Some(e.column()),
        )
        .with_source_path(source_path),
    })?;
    validate_json(&doc, schema_text, schema_label, &source_label, source_path)?;

    let workflow: WorkflowDoc = serde_json::from_value(doc).map_err(|e| LoadError::Internal {
        message: format!("workflow decode: {e}"),
        location: LoadLocation::at_path(source_label.clone()).with_source_path(source_path),
    })?;
    tracing::debug!(source = %source_label, nodes = workflow.nodes.len(), "workflow loaded");
    Ok(workflow)
}

fn validate_json(
    doc: &Value,
    schema_text: &str,
    schema_label: &str,
    source_label: &str,
    source_path: Option<&Path>,
) -> Result<(), LoadError> {
    let schema: Value = serde_json::from_str(schema_text).map_err(|e| LoadError::Internal {
        message: format!("schema parse for {schema_label}: {e}"),
        location: LoadLocation::at_path(schema_label.to_string()),
    })?;
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| LoadError::Internal {
            message: format!("schema compile for {schema_label}: {e}"),
            location: LoadLocation::at_path(schema_label.to_string()),
        })?;
    let details: Vec<SchemaErrorDetail> = validator
        .iter_errors(doc)
        .map(|e| {
            let pointer = e.instance_path().to_string();
            let pointer = if pointer.is_empty() {
                "/".to_string()
            } else {
                pointer
            };
            SchemaErrorDetail {
                message: e.to_string(),
                location: LoadLocation::at_path(format!("{source_label}{pointer}"))
                    .with_json_pointer(Some(pointer.clone())),
            }
        })
        .collect();
    if !details.is_empty() {
        let message = details
            .iter()
            .map(|detail| {
                let where_str = detail
                    .location
                    .describe()
                    .unwrap_or_else(|| source_label.to_string());
                format!("{where_str}: {}", detail.message)
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Err(LoadError::Schema {
            message,
            details,
            location: LoadLocation::at_path(source_label.to_string())
                .with_source_path(source_path),
        });
    }
    Ok(())
}
