//! Format → write → validate.
//!
//! The formatted program is written before it is validated so a program that
//! fails validation stays on disk for inspection.

mod format;
mod lexical;
mod validate;

pub use format::{AutoFormatter, BasicFormatter, ExternalFormatter};
pub use lexical::LexicalValidator;
pub use validate::{AutoValidator, ExternalValidator};

use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    config::{FormatterKind, PipelineConfig, ValidatorKind},
    error::{Result, TranspileError},
    transpile::Warning,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Reformatted(String),
    /// Nothing to change; the input stands as is.
    Unchanged,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("formatter `{command}` is not available: {message}")]
    Unavailable { command: String, message: String },
    #[error("formatter `{command}` rejected the code: {message}")]
    Rejected { command: String, message: String },
}

pub trait Formatter {
    fn name(&self) -> &str;
    fn format(&self, source: &str) -> std::result::Result<FormatOutcome, FormatError>;
}

/// A syntax error reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", .line.map(|l| format!("line {l}: ")).unwrap_or_default())]
pub struct SyntaxError {
    pub line: Option<usize>,
    pub message: String,
}

impl SyntaxError {
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("validator `{command}` is not available: {message}")]
    Unavailable { command: String, message: String },
}

/// How thoroughly a passing program was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Compiled by Python itself.
    Compiled,
    /// Only strings, brackets and indentation were checked.
    Structural,
}

pub trait SyntaxValidator {
    fn name(&self) -> &str;
    /// Parse-check `source`, already written at `path`, without running it.
    fn validate(
        &self,
        path: &Path,
        source: &str,
    ) -> std::result::Result<Validation, ValidateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub output: PathBuf,
    pub code: String,
    pub reformatted: bool,
    pub validation: Validation,
    pub warnings: Vec<Warning>,
}

pub struct Pipeline {
    formatter: Box<dyn Formatter>,
    validator: Box<dyn SyntaxValidator>,
}

impl Pipeline {
    pub fn new(formatter: Box<dyn Formatter>, validator: Box<dyn SyntaxValidator>) -> Self {
        Self {
            formatter,
            validator,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let external_formatter = ExternalFormatter::new(config.formatter.command.clone());
        let formatter: Box<dyn Formatter> = match config.formatter.kind {
            FormatterKind::Auto => Box::new(AutoFormatter::new(external_formatter)),
            FormatterKind::External => Box::new(external_formatter),
            FormatterKind::Basic => Box::new(BasicFormatter),
        };
        let external_validator = ExternalValidator::new(config.validator.command.clone());
        let validator: Box<dyn SyntaxValidator> = match config.validator.kind {
            ValidatorKind::Auto => Box::new(AutoValidator::new(external_validator)),
            ValidatorKind::External => Box::new(external_validator),
            ValidatorKind::Lexical => Box::new(LexicalValidator),
        };
        Self::new(formatter, validator)
    }

    pub fn run(&self, raw: &str, output: &Path) -> Result<PipelineReport> {
        let mut warnings = Vec::new();
        let (code, reformatted) = match self.formatter.format(raw) {
            Ok(FormatOutcome::Reformatted(code)) => (code, true),
            Ok(FormatOutcome::Unchanged) => {
                tracing::debug!(formatter = self.formatter.name(), "nothing to reformat");
                warnings.push(Warning::FormatNoop);
                (raw.to_string(), false)
            }
            Err(source) => {
                write_output(output, raw)?;
                return Err(TranspileError::Format {
                    output: output.to_path_buf(),
                    source,
                });
            }
        };

        write_output(output, &code)?;

        let validation = self
            .validator
            .validate(output, &code)
            .map_err(|source| TranspileError::Validation {
                output: output.to_path_buf(),
                source,
            })?;
        if validation == Validation::Structural {
            tracing::warn!(
                validator = self.validator.name(),
                "Python did not compile the program; only a structural check was applied"
            );
            warnings.push(Warning::StructuralCheckOnly);
        }
        tracing::info!(
            output = %output.display(),
            formatter = self.formatter.name(),
            validator = self.validator.name(),
            ?validation,
            "program formatted and checked"
        );

        Ok(PipelineReport {
            output: output.to_path_buf(),
            code,
            reformatted,
            validation,
            warnings,
        })
    }
}

fn write_output(path: &Path, code: &str) -> Result<()> {
    fs::write(path, code).map_err(|source| TranspileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct Fixed(Option<&'static str>);

    impl Formatter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn format(&self, _: &str) -> std::result::Result<FormatOutcome, FormatError> {
            Ok(match self.0 {
                Some(code) => FormatOutcome::Reformatted(code.to_string()),
                None => FormatOutcome::Unchanged,
            })
        }
    }

    struct Failing;

    impl Formatter for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn format(&self, _: &str) -> std::result::Result<FormatOutcome, FormatError> {
            Err(FormatError::Rejected {
                command: "failing".to_string(),
                message: "cannot parse".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: RefCell<Vec<String>>,
        fail: bool,
    }

    impl SyntaxValidator for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn validate(
            &self,
            path: &Path,
            source: &str,
        ) -> std::result::Result<Validation, ValidateError> {
            let on_disk = fs::read_to_string(path).expect("written before validation");
            assert_eq!(on_disk, source);
            self.seen.borrow_mut().push(source.to_string());
            if self.fail {
                Err(SyntaxError::at(1, "invalid syntax").into())
            } else {
                Ok(Validation::Compiled)
            }
        }
    }

    #[test]
    fn unchanged_format_keeps_the_input_code() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.py");
        let pipeline = Pipeline::new(Box::new(Fixed(None)), Box::new(Recording::default()));
        let report = pipeline.run("x = 1\n", &out).unwrap();
        assert_eq!(report.code, "x = 1\n");
        assert!(!report.reformatted);
        assert_eq!(report.validation, Validation::Compiled);
        assert_eq!(report.warnings, vec![Warning::FormatNoop]);
        assert_eq!(fs::read_to_string(&out).unwrap(), "x = 1\n");
    }

    #[test]
    fn formatted_code_is_what_gets_validated() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.py");
        let pipeline = Pipeline::new(
            Box::new(Fixed(Some("x = 1\n"))),
            Box::new(Recording::default()),
        );
        let report = pipeline.run("x=1", &out).unwrap();
        assert!(report.reformatted);
        assert_eq!(fs::read_to_string(&out).unwrap(), "x = 1\n");
    }

    #[test]
    fn invalid_program_is_kept_on_disk() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.py");
        let validator = Recording {
            fail: true,
            ..Recording::default()
        };
        let pipeline = Pipeline::new(Box::new(Fixed(None)), Box::new(validator));
        let err = pipeline.run("if x\n", &out).unwrap_err();
        assert!(matches!(err, TranspileError::Validation { .. }));
        assert!(err.to_string().contains("line 1: invalid syntax"), "{err}");
        assert_eq!(fs::read_to_string(&out).unwrap(), "if x\n");
    }

    #[test]
    fn formatter_failure_writes_raw_code() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.py");
        let pipeline = Pipeline::new(Box::new(Failing), Box::new(Recording::default()));
        let err = pipeline.run("x = (\n", &out).unwrap_err();
        assert!(matches!(err, TranspileError::Format { .. }));
        assert_eq!(fs::read_to_string(&out).unwrap(), "x = (\n");
    }

    #[test]
    fn structural_check_is_reported_as_a_warning() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.py");
        let pipeline = Pipeline::new(Box::new(BasicFormatter), Box::new(LexicalValidator));
        let report = pipeline.run("x = = 1\n", &out).unwrap();
        assert_eq!(report.validation, Validation::Structural);
        assert_eq!(
            report.warnings,
            vec![Warning::FormatNoop, Warning::StructuralCheckOnly]
        );
    }

    #[test]
    fn unwritable_output_is_an_io_error() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("missing-dir").join("out.py");
        let pipeline = Pipeline::new(Box::new(BasicFormatter), Box::new(LexicalValidator));
        let err = pipeline.run("x = 1\n", &out).unwrap_err();
        assert!(matches!(err, TranspileError::Io { .. }));
    }
}
