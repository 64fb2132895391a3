use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::tempdir;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn mapping_dir() -> PathBuf {
    fixture("tests/rules-mapping")
}

fn parse_stderr_json_lines(stderr: &[u8]) -> Vec<Value> {
    let text = String::from_utf8(stderr.to_vec()).expect("stderr utf8");
    text.lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("stderr json line"))
        .collect()
}

fn storelist_target_with(edit: impl FnOnce(&mut Value)) -> (tempfile::TempDir, PathBuf) {
    let raw = fs::read_to_string(fixture("tests/fixtures/storelist/target.json")).expect("read target");
    let mut target: Value = serde_json::from_str(&raw).expect("target json");
    edit(&mut target);
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("target.json");
    fs::write(&path, serde_json::to_string(&target).expect("serialize")).expect("write target");
    (dir, path)
}

#[test]
fn storelist_fixtures_match() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["pipeline"], json!("storelist"));
    assert_eq!(payload["status"], json!("completed"));
    assert_eq!(payload["directives"], json!(4));
    assert_eq!(payload["rules_evaluated"], json!(4));
    assert_eq!(payload["values_compared"], json!(8));
    assert_eq!(payload["reported_failures"], json!(0));
    assert!(output.stderr.is_empty());
}

#[test]
fn default_mapping_dir_is_used_when_none_given() {
    assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--pipeline",
            "storelist",
            "--source",
            "tests/fixtures/storelist/source.json",
            "--target",
            "tests/fixtures/storelist/target.json",
        ])
        .assert()
        .code(0);
}

#[test]
fn value_mismatch_exits_two_with_failure_payload() {
    let (_dir, target) = storelist_target_with(|target| {
        target["stores"][1]["displayName"] = json!("Elm Court");
    });
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(&target)
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["status"], json!("failed"));
    assert_eq!(payload["aborted"], json!(true));
    assert_eq!(payload["failure_count"], json!(1));
    assert_eq!(payload["failures"][0]["kind"], json!("value_mismatch"));
    let message = payload["failures"][0]["message"].as_str().expect("message");
    assert!(message.contains("`$[1]`"));
    assert!(message.contains("Elm Court"));
}

#[test]
fn length_mismatch_exits_two() {
    let (_dir, target) = storelist_target_with(|target| {
        if let Some(stores) = target["stores"].as_array_mut() {
            stores.pop();
        }
    });
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(&target)
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["failures"][0]["kind"], json!("length_mismatch"));
    assert!(
        payload["failures"][0]["message"]
            .as_str()
            .expect("message")
            .contains("source has 2 items, target has 1")
    );
}

#[test]
fn collect_reports_every_value_mismatch() {
    let (_dir, target) = storelist_target_with(|target| {
        target["stores"][0]["displayName"] = json!("Main St");
        target["stores"][1]["phoneNumber"] = json!("5559999");
    });
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--collect", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(&target)
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["aborted"], json!(false));
    assert_eq!(payload["failure_count"], json!(2));
}

#[test]
fn unknown_pipeline_is_input_usage_error() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "shipments", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let lines = parse_stderr_json_lines(&output.stderr);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["error"], json!("input_usage_error"));
    assert_eq!(lines[0]["kind"], json!("configuration_error"));
}

#[test]
fn mapping_and_mapping_dir_conflict() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--mapping")
        .arg(fixture("tests/rules-mapping/storelist_rules_mapping.json"))
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(3));
    let lines = parse_stderr_json_lines(&output.stderr);
    assert_eq!(lines[0]["details"]["kind"], json!("cli_parse_error"));
}

#[test]
fn explicit_mapping_file_serves_any_pipeline_key() {
    let dir = tempdir().expect("tempdir");
    let mapping = dir.path().join("custom.yaml");
    fs::write(
        &mapping,
        "mapping:\n  stores:\n    - method: pathbasedcompare\n      source_path: name|path\n      target_path: $.stores[*].displayName|jsonpath\n      rules:\n        - ruleName: equalValue\n",
    )
    .expect("write mapping");

    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "stores", "--mapping"])
        .arg(&mapping)
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["values_compared"], json!(2));
}

#[test]
fn emit_pipeline_describes_inputs() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--emit-pipeline", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(fixture("tests/fixtures/storelist/source.json"))
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let lines = parse_stderr_json_lines(&output.stderr);
    let report = lines.last().expect("pipeline report");
    assert_eq!(report["command"], json!("run"));
    let sources = report["input"]["sources"].as_array().expect("sources");
    let labels: Vec<&str> = sources
        .iter()
        .map(|source| source["label"].as_str().expect("label"))
        .collect();
    assert_eq!(labels, vec!["pipeline", "mapping_dir", "source", "target"]);
    assert_eq!(sources[2]["format"], json!("json"));
    assert_eq!(
        report["steps"],
        json!([
            "load_source",
            "load_target",
            "resolve_mapping",
            "extract_values",
            "apply_transformations",
            "compare_values"
        ])
    );
}

#[test]
fn unsupported_source_extension_is_input_usage_error() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("stores.txt");
    fs::write(&source, "[]").expect("write source");

    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "storelist", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(3));

    let output = assert_cmd::cargo::cargo_bin_cmd!("mapcheck")
        .args(["run", "--pipeline", "storelist", "--source-format", "json", "--mapping-dir"])
        .arg(mapping_dir())
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(fixture("tests/fixtures/storelist/target.json"))
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(2));
}
