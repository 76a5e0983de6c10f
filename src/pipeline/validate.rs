use regex::Regex;
use std::{
    io::ErrorKind,
    path::Path,
    process::{Command, Stdio},
};

use super::{LexicalValidator, SyntaxError, SyntaxValidator, ValidateError, Validation};

/// Shell convention for "command not found", used by wrappers and shims.
const EXIT_COMMAND_NOT_FOUND: i32 = 127;

lazy_static::lazy_static! {
    static ref LINE_RE: Regex = Regex::new(r"line (\d+)").unwrap();
}

/// Runs an external checker with the output path appended as the last argument.
/// The default command compiles the file with Python without executing it.
#[derive(Debug, Clone)]
pub struct ExternalValidator {
    command: Vec<String>,
    label: String,
}

impl ExternalValidator {
    pub fn new(command: Vec<String>) -> Self {
        let label = command.first().cloned().unwrap_or_default();
        Self { command, label }
    }

    fn unavailable(&self, message: impl Into<String>) -> ValidateError {
        ValidateError::Unavailable {
            command: self.label.clone(),
            message: message.into(),
        }
    }
}

impl SyntaxValidator for ExternalValidator {
    fn name(&self) -> &str {
        &self.label
    }

    fn validate(&self, path: &Path, _source: &str) -> Result<Validation, ValidateError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| self.unavailable("empty validator command"))?;
        let output = Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => self.unavailable(e.to_string()),
                _ => self.unavailable(format!("spawn failed: {e}")),
            })?;
        if output.status.success() {
            return Ok(Validation::Compiled);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.code() == Some(EXIT_COMMAND_NOT_FOUND) {
            return Err(self.unavailable(format!("interpreter not found: {stderr}")));
        }
        Err(syntax_error_from_output(&stderr).into())
    }
}

/// The reported line is the last `line N` in the output; tracebacks list the
/// offending file last.
fn syntax_error_from_output(stderr: &str) -> SyntaxError {
    let line = LINE_RE
        .captures_iter(stderr)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok());
    let message = if stderr.is_empty() {
        "validator reported an error without output".to_string()
    } else {
        stderr.to_string()
    };
    SyntaxError { line, message }
}

/// External validator when it can be run, [`LexicalValidator`] otherwise.
#[derive(Debug, Clone)]
pub struct AutoValidator {
    external: ExternalValidator,
}

impl AutoValidator {
    pub fn new(external: ExternalValidator) -> Self {
        Self { external }
    }
}

impl SyntaxValidator for AutoValidator {
    fn name(&self) -> &str {
        "auto"
    }

    fn validate(&self, path: &Path, source: &str) -> Result<Validation, ValidateError> {
        match self.external.validate(path, source) {
            Err(ValidateError::Unavailable { command, message }) => {
                tracing::warn!(%command, %message, "validator unavailable; using lexical check");
                LexicalValidator.validate(path, source)
            }
            other => other,
        }
    }
}
