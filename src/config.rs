use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::ConfigError;

pub const DEFAULT_OUTPUT: &str = "generated_workflow.py";

const PY_COMPILE_SCRIPT: &str =
    "import sys; compile(open(sys.argv[1], encoding='utf-8').read(), sys.argv[1], 'exec')";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    /// External formatter, basic formatting when it is not installed.
    #[default]
    Auto,
    External,
    Basic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    /// External checker, lexical check when it is not installed.
    #[default]
    Auto,
    External,
    Lexical,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    pub kind: FormatterKind,
    /// Program and arguments; source is fed on stdin, formatted code read from stdout.
    pub command: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            kind: FormatterKind::default(),
            command: vec!["black".into(), "--quiet".into(), "-".into()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub kind: ValidatorKind,
    /// Program and arguments; the output path is appended.
    pub command: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            kind: ValidatorKind::default(),
            command: vec!["python3".into(), "-c".into(), PY_COMPILE_SCRIPT.into()],
        }
    }
}

/// Settings for the post-generation pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Comment text emitted at the top of the generated program.
    pub header: Option<String>,
    pub formatter: FormatterConfig,
    pub validator: ValidatorConfig,
}

impl PipelineConfig {
    /// Load a config from disk, accepting JSON by default and TOML when the `toml` feature is enabled.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let txt = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let json_err = match serde_json::from_str::<Self>(&txt) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        #[cfg(feature = "toml")]
        {
            match toml::from_str::<Self>(&txt) {
                Ok(value) => Ok(value),
                Err(toml_err) => Err(ConfigError::Format {
                    path: path_ref.to_path_buf(),
                    message: format!("not valid JSON ({json_err}) or TOML ({toml_err})"),
                }),
            }
        }

        #[cfg(not(feature = "toml"))]
        {
            Err(ConfigError::Format {
                path: path_ref.to_path_buf(),
                message: format!(
                    "expected JSON (enable `toml` feature for TOML support): {json_err}"
                ),
            })
        }
    }
}
