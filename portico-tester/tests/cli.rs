use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "portico-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_portico-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("unsaved-form"));
}

#[test]
fn cli_runs_catalog_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_portico-tester");
    let output_path = temp_path("run");
    let status = Command::new(exe)
        .args(["--report", "json", "--scenarios", "all", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = value.as_array().expect("array of results");
    assert!(results.iter().all(|r| r["passed"] == true));
    assert!(results.iter().any(|r| r["scenario_name"] == "oauth"));
}

#[test]
fn cli_paths_run_honours_config_file() {
    let exe = env!("CARGO_BIN_EXE_portico-tester");
    let config_path = temp_path("config");
    std::fs::write(&config_path, r#"{"features":{"oauth":true}}"#).expect("write config");
    let output_path = temp_path("paths");
    let status = Command::new(exe)
        .args(["--report", "markdown", "--paths", "/settings", "--config"])
        .arg(&config_path)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("completed at /log-in via /log-in"));
}

#[test]
fn cli_rejects_invalid_config() {
    let exe = env!("CARGO_BIN_EXE_portico-tester");
    let config_path = temp_path("bad-config");
    std::fs::write(&config_path, r#"{"base":"relative"}"#).expect("write config");
    let output = Command::new(exe)
        .args(["--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}
