// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn millcert() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_millcert"));
    cmd.env_remove("MILLCERT_CONFIG")
        .env_remove("MILLCERT_LOG_LEVEL")
        .env_remove("MILLCERT_DEFAULT_COMPANY")
        .env_remove("MILLCERT_ARTIFACT_PREFIX");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

fn stderr_error(output: &std::process::Output) -> Value {
    let text = String::from_utf8_lossy(&output.stderr);
    let last = text
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    serde_json::from_str(last).expect("stderr ends with a json error")
}

fn parse_commands_from_help(text: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut in_commands = false;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed == "Commands:" {
            in_commands = true;
            continue;
        }
        if in_commands {
            if trimmed.is_empty() {
                break;
            }
            let name = trimmed.split_whitespace().next().unwrap_or("");
            if !name.is_empty() && name != "help" {
                commands.push(name.to_string());
            }
        }
    }
    commands.sort();
    commands
}

#[test]
fn help_command_surface_is_stable() {
    let output = millcert().arg("--help").output().expect("run help");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8 help");
    let expected = include_str!("snapshots/help.commands.txt")
        .lines()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(parse_commands_from_help(&text), expected);
}

#[test]
fn version_output_contains_crate_version() {
    let output = millcert().args(["--json", "version"]).output().expect("run version");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn unknown_flag_returns_usage_exit_code_with_machine_error() {
    let output = millcert()
        .args(["--json", "--unknown-flag"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let err = stderr_error(&output);
    assert_eq!(err["code"], "usage_error");
}

#[test]
fn aggregate_keeps_first_value_and_collapses_impact_keys() {
    let output = millcert()
        .args(["--json", "aggregate", "--records"])
        .arg(fixture("records.json"))
        .output()
        .expect("run aggregate");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let payload = stdout_json(&output);
    let h1 = &payload["lots"]["H1"];
    assert_eq!(h1["chemical_composition"][0]["element"], "C");
    assert_eq!(h1["chemical_composition"][0]["value"], "0.21");
    assert_eq!(h1["chemical_composition"].as_array().map(Vec::len), Some(2));
    assert_eq!(h1["impact_tests"].as_array().map(Vec::len), Some(1));
    assert_eq!(h1["impact_tests"][0]["value1"], "45");
    assert_eq!(h1["lab_name"], "Metallab");
    assert_eq!(h1["lab_report_date"], "2024-07-15");

    let h3 = &payload["lots"]["H3"];
    assert_eq!(h3["lab_name"], "");
    assert_eq!(h3["impact_tests"].as_array().map(Vec::len), Some(1));
}

#[test]
fn aggregate_single_lot_and_unknown_lot() {
    let output = millcert()
        .args(["--json", "aggregate", "--lot", "H3", "--records"])
        .arg(fixture("records.json"))
        .output()
        .expect("run aggregate");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["lot"]["lot_id"], "H3");

    let output = millcert()
        .args(["--json", "aggregate", "--lot", "H404", "--records"])
        .arg(fixture("records.json"))
        .output()
        .expect("run aggregate");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn columns_follow_arrival_order_and_drop_blank_names() {
    let output = millcert()
        .args(["--json", "columns", "--kind", "chemical", "--records"])
        .arg(fixture("records.json"))
        .output()
        .expect("run columns");
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output)["columns"],
        serde_json::json!(["C", "Mn", "Si"])
    );
}

#[test]
fn render_writes_named_pdf_into_out_dir() {
    let out = tempdir().expect("tempdir");
    let output = millcert()
        .args(["--json", "render", "--certificate"])
        .arg(fixture("certificate.json"))
        .arg("--records")
        .arg(fixture("records.json"))
        .arg("--out-dir")
        .arg(out.path())
        .output()
        .expect("run render");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let payload = stdout_json(&output);
    assert_eq!(payload["file_name"], "MTC_MTC_2024_0042.pdf");
    assert_eq!(payload["page_count"], 1);
    assert_eq!(payload["warnings"], serde_json::json!([]));
    let bytes = std::fs::read(out.path().join("MTC_MTC_2024_0042.pdf")).expect("pdf written");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn render_survives_unreachable_parameter_store() {
    let out = tempdir().expect("tempdir");
    let output = millcert()
        .args(["--json", "render", "--certificate"])
        .arg(fixture("certificate.json"))
        .arg("--records")
        .arg(out.path().join("missing.json"))
        .arg("--out-dir")
        .arg(out.path())
        .output()
        .expect("run render");
    assert!(output.status.success());
    let warnings = stdout_json(&output)["warnings"].clone();
    assert_eq!(warnings.as_array().map(Vec::len), Some(1));
}

#[test]
fn render_without_document_number_is_a_validation_error() {
    let dir = tempdir().expect("tempdir");
    let certificate = dir.path().join("certificate.json");
    std::fs::write(&certificate, r#"{"header": {"customer_name": "X"}}"#).expect("write");
    let output = millcert()
        .args(["--json", "render", "--certificate"])
        .arg(&certificate)
        .arg("--records")
        .arg(fixture("records.json"))
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .expect("run render");
    assert_eq!(output.status.code(), Some(3));
    let err = stderr_error(&output);
    assert_eq!(err["code"], "validation_error");
}

#[test]
fn render_requires_exactly_one_record_source() {
    let dir = tempdir().expect("tempdir");
    let output = millcert()
        .args(["render", "--certificate"])
        .arg(fixture("certificate.json"))
        .arg("--records")
        .arg(fixture("records.json"))
        .arg("--sqlite")
        .arg(dir.path().join("db.sqlite"))
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .expect("run render");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_reports_source_and_env_overrides() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("render.toml");
    std::fs::write(&config, "item_rows = 6\n[companies]\nPUNE = \"Acme Pune\"\n").expect("write");
    let output = millcert()
        .current_dir(dir.path())
        .env("MILLCERT_DEFAULT_COMPANY", "Acme Forge Ltd")
        .args(["--json", "--config"])
        .arg(&config)
        .arg("config")
        .output()
        .expect("run config");
    assert!(output.status.success());
    let payload = stdout_json(&output);
    assert_eq!(payload["source"]["source"], "flag");
    assert_eq!(payload["config"]["item_rows"], 6);
    assert_eq!(payload["config"]["default_company"], "Acme Forge Ltd");

    let output = millcert()
        .current_dir(dir.path())
        .args(["--json", "config"])
        .output()
        .expect("run config");
    assert_eq!(stdout_json(&output)["source"]["source"], "defaults");
}
