use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn python3_available() -> bool {
    Command::new("python3")
        .args(["-c", "pass"])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Runs with the default validator, which compiles the program with Python.
fn flow2py_compiled() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flow2py"));
    cmd.args(["--formatter", "basic"]);
    cmd
}

fn flow2py() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flow2py"));
    cmd.args(["--formatter", "basic", "--validator", "lexical"]);
    cmd
}

#[test]
fn transpiles_example_workflow() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("workflow.py");

    flow2py()
        .arg(fixture("example_workflow.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("structural check only"))
        .stdout(predicate::str::contains("validated").not());

    let code = fs::read_to_string(&out).unwrap();
    assert!(code.starts_with("# Set Name\nname = \"Alice\"\n\n# If Name Check\n"));
    assert!(code.contains("time.sleep(2)"));
    assert!(code.ends_with("# Sticky Note\n# This is a test comment.\n"));
}

#[test]
fn default_output_path_is_generated_workflow_py() {
    let dir = tempdir().unwrap();

    flow2py()
        .current_dir(dir.path())
        .arg(fixture("example_workflow.json"))
        .assert()
        .success();

    assert!(dir.path().join("generated_workflow.py").is_file());
}

#[test]
fn unsupported_type_is_not_fatal() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");

    flow2py()
        .arg(fixture("unknown_type.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "# Mystery\n# Unsupported node type: Unknown Type\n"
    );
}

#[test]
fn missing_parameter_aborts_and_names_the_node() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");

    flow2py()
        .arg(fixture("missing_param.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::contains("validated").not())
        .stderr(predicate::str::contains("'Set Name'"))
        .stderr(predicate::str::contains("missing required parameter 'value'"));

    assert!(!out.exists(), "no program is written when generation fails");
}

#[test]
fn invalid_generated_code_fails_but_is_kept() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");

    flow2py()
        .arg(fixture("invalid_code.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is invalid"))
        .stderr(predicate::str::contains("unexpected indent"));

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "# Broken\nif True\n    pass\n"
    );
}

#[test]
fn empty_workflow_yields_header_only_program() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");

    flow2py()
        .arg(fixture("empty.json"))
        .arg("-o")
        .arg(&out)
        .arg("--header")
        .arg("Auto-generated from n8n workflow")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "# Auto-generated from n8n workflow\n"
    );
}

#[test]
fn json_report_lists_warnings() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");

    let output = flow2py()
        .arg(fixture("unknown_type.json"))
        .arg("-o")
        .arg(&out)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["warnings"][0]["kind"], "unsupported_type");
    assert_eq!(report["warnings"][0]["node_name"], "Mystery");
    assert_eq!(report["warnings"][0]["node_type"], "Unknown Type");
}

#[test]
fn json_report_on_generation_failure() {
    let dir = tempdir().unwrap();

    let output = flow2py()
        .arg(fixture("missing_param.json"))
        .arg("-o")
        .arg(dir.path().join("out.py"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ok"], false);
    assert_eq!(report["errors"][0]["node_index"], 1);
    assert_eq!(report["errors"][0]["node_name"], "Set Name");
}

#[test]
fn missing_input_is_a_load_error() {
    let dir = tempdir().unwrap();

    flow2py()
        .arg(dir.path().join("nope.json"))
        .arg("-o")
        .arg(dir.path().join("out.py"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn config_file_sets_the_header() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");
    let config = dir.path().join("flow2py.json");
    fs::write(
        &config,
        r#"{"header": "Exported workflow", "formatter": {"kind": "basic"}, "validator": {"kind": "lexical"}}"#,
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("flow2py"))
        .arg(fixture("unknown_type.json"))
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(
        fs::read_to_string(&out)
            .unwrap()
            .starts_with("# Exported workflow\n\n# Mystery\n")
    );
}

#[test]
fn bad_config_file_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("flow2py.json");
    fs::write(&config, r#"{"formater": {}}"#).unwrap();

    flow2py()
        .arg(fixture("unknown_type.json"))
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(dir.path().join("out.py"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported pipeline config format"));
}

#[test]
fn lists_builtin_handlers() {
    Command::new(assert_cmd::cargo::cargo_bin!("flow2py"))
        .arg("--list-handlers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Send Slack Message\n"))
        .stdout(predicate::str::contains("Sticky Note\n"));
}

#[test]
fn structural_check_does_not_claim_validation() {
    let dir = tempdir().unwrap();
    let workflow = dir.path().join("workflow.json");
    fs::write(
        &workflow,
        r#"{"nodes": [{"name": "Odd", "type": "Code", "parameters": {"pythonCode": "x = = 1\nelse:\n    pass"}}]}"#,
    )
    .unwrap();

    let output = flow2py()
        .arg(&workflow)
        .arg("-o")
        .arg(dir.path().join("out.py"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["compiled"], false);
    assert_eq!(report["warnings"][0]["kind"], "structural_check_only");
}

#[test]
fn json_failure_is_also_reported_on_stderr() {
    let dir = tempdir().unwrap();

    let output = flow2py()
        .arg(fixture("invalid_code.json"))
        .arg("-o")
        .arg(dir.path().join("out.py"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is invalid"), "{stderr}");
    assert!(stderr.contains("unexpected indent"), "{stderr}");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ok"], false);
    assert_eq!(report["errors"][0]["line"], 3);
}

#[test]
fn python_compiles_the_example_workflow() {
    if !python3_available() {
        eprintln!("python3 not found; skipping");
        return;
    }
    let dir = tempdir().unwrap();
    let out = dir.path().join("workflow.py");

    flow2py_compiled()
        .arg(fixture("example_workflow.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("formatted, and validated to"));

    assert!(out.is_file());
    assert!(!dir.path().join("__pycache__").exists());
}

#[test]
fn python_rejects_invalid_generated_code() {
    if !python3_available() {
        eprintln!("python3 not found; skipping");
        return;
    }
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.py");

    flow2py_compiled()
        .arg(fixture("invalid_code.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is invalid"))
        .stderr(predicate::str::contains("SyntaxError"));

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "# Broken\nif True\n    pass\n"
    );
}
