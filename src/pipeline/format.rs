use std::{
    io::{ErrorKind, Write},
    process::{Command, Stdio},
    thread,
};

use super::{FormatError, FormatOutcome, Formatter, lexical::lines_ending_in_string};

const MAX_BLANK_LINES: usize = 2;

/// Whitespace-only canonical form: no trailing whitespace, at most two blank
/// lines in a row, no leading blank lines, exactly one final newline. Lines
/// inside multi-line string literals are left as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFormatter;

impl BasicFormatter {
    pub fn normalize(source: &str) -> String {
        let ends_in_string = lines_ending_in_string(source);
        let mut out: Vec<&str> = Vec::new();
        let mut blank_run = 0;
        for (idx, line) in source.lines().enumerate() {
            let starts_in_string = idx > 0 && ends_in_string.get(idx - 1).copied().unwrap_or(false);
            let line = if ends_in_string.get(idx).copied().unwrap_or(false) {
                line
            } else {
                line.trim_end()
            };
            if starts_in_string || !line.is_empty() {
                blank_run = 0;
                out.push(line);
                continue;
            }
            if out.is_empty() {
                continue;
            }
            blank_run += 1;
            if blank_run <= MAX_BLANK_LINES {
                out.push(line);
            }
        }
        while out.last().is_some_and(|line| line.is_empty()) {
            out.pop();
        }
        if out.is_empty() {
            String::new()
        } else {
            let mut code = out.join("\n");
            code.push('\n');
            code
        }
    }
}

impl Formatter for BasicFormatter {
    fn name(&self) -> &str {
        "basic"
    }

    fn format(&self, source: &str) -> Result<FormatOutcome, FormatError> {
        let formatted = Self::normalize(source);
        if formatted == source {
            Ok(FormatOutcome::Unchanged)
        } else {
            Ok(FormatOutcome::Reformatted(formatted))
        }
    }
}

/// Pipes the code through an external formatter (black by default) on stdin.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    command: Vec<String>,
    label: String,
}

impl ExternalFormatter {
    pub fn new(command: Vec<String>) -> Self {
        let label = command.join(" ");
        Self { command, label }
    }

    fn unavailable(&self, message: impl Into<String>) -> FormatError {
        FormatError::Unavailable {
            command: self.label.clone(),
            message: message.into(),
        }
    }

    fn rejected(&self, message: impl Into<String>) -> FormatError {
        FormatError::Rejected {
            command: self.label.clone(),
            message: message.into(),
        }
    }
}

impl Formatter for ExternalFormatter {
    fn name(&self) -> &str {
        &self.label
    }

    fn format(&self, source: &str) -> Result<FormatOutcome, FormatError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| self.unavailable("empty formatter command"))?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => self.unavailable(e.to_string()),
                _ => self.rejected(format!("spawn failed: {e}")),
            })?;
        // Fed from its own thread so a formatter streaming to stdout cannot
        // block on a full pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_owned();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child
            .wait_with_output()
            .map_err(|e| self.rejected(format!("waiting for formatter: {e}")))?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The formatter may exit before reading everything; its status decides.
                Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(self.rejected(format!("writing stdin: {e}"))),
                Err(_) => return Err(self.rejected("stdin writer panicked")),
            }
        }
        if !output.status.success() {
            return Err(self.rejected(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        let formatted = String::from_utf8(output.stdout)
            .map_err(|e| self.rejected(format!("formatter output is not UTF-8: {e}")))?;
        if formatted == source {
            Ok(FormatOutcome::Unchanged)
        } else {
            Ok(FormatOutcome::Reformatted(formatted))
        }
    }
}

/// External formatter when it can be run, [`BasicFormatter`] otherwise.
#[derive(Debug, Clone)]
pub struct AutoFormatter {
    external: ExternalFormatter,
}

impl AutoFormatter {
    pub fn new(external: ExternalFormatter) -> Self {
        Self { external }
    }
}

impl Formatter for AutoFormatter {
    fn name(&self) -> &str {
        "auto"
    }

    fn format(&self, source: &str) -> Result<FormatOutcome, FormatError> {
        match self.external.format(source) {
            Err(FormatError::Unavailable { command, message }) => {
                tracing::warn!(%command, %message, "formatter unavailable; using basic formatting");
                BasicFormatter.format(source)
            }
            other => other,
        }
    }
}
