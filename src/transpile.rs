//! Node list → raw Python program.
//!
//! Nodes are emitted strictly in listed order. A node whose type has a handler
//! becomes `# <name>` followed by the handler's code; a handler error stops the
//! whole run. A node whose type has no handler becomes a comment-only
//! placeholder and the walk continues.

use serde::Serialize;

use crate::{
    error::{Result, TranspileError},
    handler::Fragment,
    model::{NodeDoc, WorkflowDoc},
    python,
    registry::{HandlerRegistry, KeyCollision},
};

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Non-fatal conditions recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    UnsupportedType {
        index: usize,
        node_name: String,
        node_type: String,
    },
    KeyCollision(KeyCollision),
    FormatNoop,
    /// Python was unavailable; the program passed only the structural check.
    StructuralCheckOnly,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnsupportedType {
                index,
                node_name,
                node_type,
            } => write!(
                f,
                "node #{index} ('{node_name}') has unsupported type '{node_type}'; placeholder emitted"
            ),
            Warning::KeyCollision(collision) => write!(
                f,
                "handler key '{}' registered twice; '{}' replaced '{}'",
                collision.key, collision.replacement, collision.replaced
            ),
            Warning::FormatNoop => f.write_str("formatter left the code unchanged"),
            Warning::StructuralCheckOnly => f.write_str(
                "Python syntax was not verified; only strings, brackets and indentation were checked",
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transpiled {
    pub header: Option<String>,
    pub fragments: Vec<Fragment>,
    pub warnings: Vec<Warning>,
}

impl Transpiled {
    /// The raw program: header, then fragments separated by a blank line.
    pub fn code(&self) -> String {
        self.header
            .iter()
            .cloned()
            .chain(self.fragments.iter().map(Fragment::render))
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR)
    }
}

pub struct Transpiler<'r> {
    registry: &'r HandlerRegistry,
    header: Option<String>,
}

impl<'r> Transpiler<'r> {
    pub fn new(registry: &'r HandlerRegistry) -> Self {
        Self {
            registry,
            header: None,
        }
    }

    /// Comment text placed before the first node.
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn transpile(&self, workflow: &WorkflowDoc) -> Result<Transpiled> {
        let mut out = Transpiled {
            header: self.header.as_deref().map(python::comment_block),
            fragments: Vec::with_capacity(workflow.nodes.len()),
            warnings: self
                .registry
                .collisions()
                .iter()
                .cloned()
                .map(Warning::KeyCollision)
                .collect(),
        };
        for (index, node) in workflow.nodes.iter().enumerate() {
            let fragment = self.transpile_node(index, node, &mut out.warnings)?;
            out.fragments.push(fragment);
        }
        tracing::info!(
            nodes = workflow.nodes.len(),
            warnings = out.warnings.len(),
            "workflow transpiled"
        );
        Ok(out)
    }

    fn transpile_node(
        &self,
        index: usize,
        node: &NodeDoc,
        warnings: &mut Vec<Warning>,
    ) -> Result<Fragment> {
        let Some(handler) = self.registry.lookup(&node.node_type) else {
            tracing::warn!(
                index,
                node = %node.name,
                node_type = %node.node_type,
                "unsupported node type"
            );
            warnings.push(Warning::UnsupportedType {
                index,
                node_name: node.name.clone(),
                node_type: node.node_type.clone(),
            });
            let placeholder = format!(
                "# Unsupported node type: {}",
                python::comment_text(&node.node_type)
            );
            return Ok(Fragment::new(&node.name, placeholder));
        };

        tracing::debug!(index, node = %node.name, node_type = %node.node_type, "generating node");
        let body = handler
            .generate(node)
            .map_err(|source| TranspileError::Generation {
                index,
                node_name: node.name.clone(),
                node_type: node.node_type.clone(),
                source,
            })?;
        Ok(Fragment::new(&node.name, body))
    }
}
