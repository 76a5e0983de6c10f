//! Transpile n8n-style workflow documents into standalone Python scripts.
//!
//! The run is one linear sequence: load the document, look up a handler for
//! each node in listed order, concatenate the fragments, then format, write
//! and validate the program. See [`transpile_file`].

pub mod config;
pub mod error;
pub mod handler;
mod handlers;
pub mod json_output;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod python;
pub mod registry;
pub mod template;
pub mod transpile;

#[doc(hidden)]
pub use inventory;

pub use config::PipelineConfig;
pub use handler::{Fragment, Handler, HandlerError};
pub use model::{NodeDoc, WorkflowDoc};
pub use registry::HandlerRegistry;
pub use transpile::{Transpiled, Transpiler, Warning};

use std::path::{Path, PathBuf};

use crate::{
    error::Result,
    pipeline::{Pipeline, Validation},
};

/// A successful run: the validated program and what was noticed on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: PathBuf,
    pub code: String,
    pub reformatted: bool,
    pub validation: Validation,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    /// True when Python itself compiled the written program.
    pub fn compiled(&self) -> bool {
        self.validation == Validation::Compiled
    }
}

/// Transpile an already loaded workflow and run it through the pipeline.
pub fn transpile_workflow(
    workflow: &WorkflowDoc,
    registry: &HandlerRegistry,
    pipeline: &Pipeline,
    header: Option<String>,
    output: &Path,
) -> Result<Outcome> {
    let transpiled = Transpiler::new(registry)
        .with_header(header)
        .transpile(workflow)?;
    let report = pipeline.run(&transpiled.code(), output)?;
    let mut warnings = transpiled.warnings;
    warnings.extend(report.warnings);
    Ok(Outcome {
        output: report.output,
        code: report.code,
        reformatted: report.reformatted,
        validation: report.validation,
        warnings,
    })
}

/// Load `input`, transpile it with the discovered handlers and write `output`.
pub fn transpile_file(input: &Path, output: &Path, config: &PipelineConfig) -> Result<Outcome> {
    let workflow = loader::load_workflow_from_path(input)?;
    tracing::info!(input = %input.display(), nodes = workflow.nodes.len(), "transpiling workflow");
    transpile_workflow(
        &workflow,
        HandlerRegistry::global(),
        &Pipeline::from_config(config),
        config.header.clone(),
        output,
    )
}
