use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::{
    io,
    path::PathBuf,
    process::ExitCode,
};
use tracing::Level;

use flow2py::{
    HandlerRegistry,
    config::{DEFAULT_OUTPUT, FormatterKind, PipelineConfig, ValidatorKind},
    json_output::RunJsonOutput,
    transpile_file,
};

#[derive(Parser, Debug)]
#[command(
    name = "flow2py",
    about = "Transpile an n8n JSON workflow to a Python script."
)]
struct Cli {
    /// Path to the n8n workflow JSON file.
    #[arg(required_unless_present = "list_handlers")]
    workflow: Option<PathBuf>,
    /// Output Python file path.
    #[arg(long, short, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Pipeline config file (JSON; TOML when built with the `toml` feature).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Formatter to run on the generated code.
    #[arg(long, value_enum)]
    formatter: Option<FormatterArg>,
    /// Syntax validator to run on the written file.
    #[arg(long, value_enum)]
    validator: Option<ValidatorArg>,
    /// Comment placed at the top of the generated program.
    #[arg(long)]
    header: Option<String>,
    /// Print a machine-readable JSON report on stdout.
    #[arg(long)]
    json: bool,
    /// List the supported node types and exit.
    #[arg(long)]
    list_handlers: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatterArg {
    Auto,
    External,
    Basic,
}

impl From<FormatterArg> for FormatterKind {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::Auto => FormatterKind::Auto,
            FormatterArg::External => FormatterKind::External,
            FormatterArg::Basic => FormatterKind::Basic,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ValidatorArg {
    Auto,
    External,
    Lexical,
}

impl From<ValidatorArg> for ValidatorKind {
    fn from(arg: ValidatorArg) -> Self {
        match arg {
            ValidatorArg::Auto => ValidatorKind::Auto,
            ValidatorArg::External => ValidatorKind::External,
            ValidatorArg::Lexical => ValidatorKind::Lexical,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list_handlers {
        list_handlers();
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let workflow = cli
        .workflow
        .as_deref()
        .context("a workflow path is required")?;

    match transpile_file(workflow, &cli.output, &config) {
        Ok(outcome) => {
            if cli.json {
                print_json(&RunJsonOutput::success(&outcome))?;
            } else if outcome.compiled() {
                println!(
                    "Workflow transpiled, formatted, and validated to {}",
                    outcome.output.display()
                );
            } else {
                println!(
                    "Workflow transpiled and formatted to {} (structural check only; Python syntax not verified)",
                    outcome.output.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            if cli.json {
                print_json(&RunJsonOutput::failure(&err))?;
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(formatter) = cli.formatter {
        config.formatter.kind = formatter.into();
    }
    if let Some(validator) = cli.validator {
        config.validator.kind = validator.into();
    }
    if cli.header.is_some() {
        config.header = cli.header.clone();
    }
    Ok(config)
}

fn list_handlers() {
    let registry = HandlerRegistry::global();
    let mut keys: Vec<&str> = registry.keys().collect();
    keys.sort_unstable();
    for key in keys {
        println!("{key}");
    }
}

fn print_json(report: &RunJsonOutput) -> Result<()> {
    let text = serde_json::to_string_pretty(report).context("serialize JSON report")?;
    println!("{text}");
    Ok(())
}
