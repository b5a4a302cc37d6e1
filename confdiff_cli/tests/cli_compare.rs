use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Temp directory holding documents and an isolated config file
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fx = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        fs::write(fx.config_path(), "").expect("Failed to write config");
        fx
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("confdiff.toml")
    }

    fn run(&self, args: &[&str]) -> Output {
        let exe = env!("CARGO_BIN_EXE_confdiff_cli");
        Command::new(exe)
            .args(args)
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("APPDATA", self.dir.path())
            .env("HOME", self.dir.path())
            .output()
            .expect("failed to run confdiff_cli")
    }

    fn compare(&self, left: &Path, right: &Path, flags: &[&str]) -> Output {
        let config = self.config_path();
        let mut args = vec![
            "compare",
            left.to_str().unwrap(),
            right.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ];
        args.extend_from_slice(flags);
        self.run(&args)
    }

    fn compare_json(&self, left: &Path, right: &Path, flags: &[&str]) -> (i32, Value) {
        let mut all = vec!["--json"];
        all.extend_from_slice(flags);
        let output = self.compare(left, right, &all);
        let code = output.status.code().unwrap_or(-1);
        assert!(
            code == 0 || code == 2,
            "command failed: {} (expected 0 or 2)\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8(output.stdout).expect("stdout not utf-8");
        (code, serde_json::from_str(&stdout).expect("invalid json output"))
    }
}

#[test]
fn test_identical_documents_exit_zero() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"name": "app", "maxconn": 100}"#);
    let right = fx.write("right.json", r#"{"maxconn": 100, "name": "app"}"#);

    let (code, report) = fx.compare_json(&left, &right, &[]);
    assert_eq!(code, 0);
    assert_eq!(report["equal"], json!(true));
    assert_eq!(report["changed_paths"], json!(0));
    assert_eq!(report["diff"], json!({}));
}

#[test]
fn test_changed_value_exit_two() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"name": "app", "maxconn": 100}"#);
    let right = fx.write("right.json", r#"{"name": "app", "maxconn": 200}"#);

    let (code, report) = fx.compare_json(&left, &right, &[]);
    assert_eq!(code, 2);
    assert_eq!(report["equal"], json!(false));
    assert_eq!(report["diff"], json!({"maxconn": [100, 200]}));
}

#[test]
fn test_absent_as_empty_flag() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"name": "app", "timeout": 0}"#);
    let right = fx.write("right.json", r#"{"name": "app"}"#);

    let (code, report) = fx.compare_json(&left, &right, &[]);
    assert_eq!(code, 2);
    assert_eq!(report["diff"], json!({"timeout": [0, null]}));

    let (code, report) = fx.compare_json(&left, &right, &["--absent-as-empty"]);
    assert_eq!(code, 0);
    assert_eq!(report["equal"], json!(true));
}

#[test]
fn test_ignore_identity_flag() {
    let fx = Fixture::new();
    let left = fx.write(
        "left.yaml",
        "acls:\n  - index: 0\n    acl_name: is_api\n  - index: 1\n    acl_name: is_web\n",
    );
    let right = fx.write(
        "right.yaml",
        "acls:\n  - index: 4\n    acl_name: is_api\n  - index: 5\n    acl_name: is_web\n",
    );

    let (code, report) = fx.compare_json(&left, &right, &[]);
    assert_eq!(code, 2);
    assert_eq!(report["changed_paths"], json!(2));

    let (code, _) = fx.compare_json(&left, &right, &["--ignore-identity"]);
    assert_eq!(code, 0);
}

#[test]
fn test_custom_identity_field() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"rules": [{"seq": 1, "action": "allow"}]}"#);
    let right = fx.write("right.json", r#"{"rules": [{"seq": 9, "action": "allow"}]}"#);

    let (code, _) = fx.compare_json(&left, &right, &["-i"]);
    assert_eq!(code, 2);

    let (code, _) = fx.compare_json(&left, &right, &["-i", "--identity-field", "seq"]);
    assert_eq!(code, 0);
}

#[test]
fn test_list_element_diff() {
    let fx = Fixture::new();
    let left = fx.write(
        "left.json",
        r#"{"items": [{"name": "a", "port": 80}, {"name": "b", "port": 80}, {"name": "c", "port": 80}]}"#,
    );
    let right = fx.write(
        "right.json",
        r#"{"items": [{"name": "a", "port": 80}, {"name": "b", "port": 81}, {"name": "c", "port": 80}]}"#,
    );

    let (_, report) = fx.compare_json(&left, &right, &[]);
    assert_eq!(report["diff"], json!({"items": {"1": {"port": [80, 81]}}}));

    let (_, report) = fx.compare_json(&left, &right, &["--whole-collections"]);
    assert!(report["diff"]["items"].is_array());
}

#[test]
fn test_policy_from_config_file() {
    let fx = Fixture::new();
    fs::write(fx.config_path(), "[policy]\ntreat_absent_as_empty = true\n").unwrap();
    let left = fx.write("left.json", r#"{"mode": ""}"#);
    let right = fx.write("right.json", r#"{}"#);

    let (code, _) = fx.compare_json(&left, &right, &[]);
    assert_eq!(code, 0);

    let (code, _) = fx.compare_json(&left, &right, &["--strict-absent"]);
    assert_eq!(code, 2);
}

#[test]
fn test_mixed_formats() {
    let fx = Fixture::new();
    let left = fx.write("left.toml", "[frontend]\nmode = \"http\"\nmaxconn = 100\n");
    let right = fx.write("right.json", r#"{"frontend": {"mode": "http", "maxconn": 100}}"#);

    let (code, _) = fx.compare_json(&left, &right, &[]);
    assert_eq!(code, 0);
}

#[test]
fn test_text_output() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"bind": {"port": 80}}"#);
    let right = fx.write("right.json", r#"{"bind": {}}"#);

    let output = fx.compare(&left, &right, &["--no-color"]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bind.port: 80 -> (absent)"), "{stdout}");
    assert!(stdout.contains("Changed paths:   1"), "{stdout}");
    assert!(!stdout.contains("\x1b["));
}

#[test]
fn test_invalid_document_exit_one() {
    let fx = Fixture::new();
    let left = fx.write("left.json", "{not json");
    let right = fx.write("right.json", "{}");

    let output = fx.compare(&left, &right, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse"));
}

#[test]
fn test_missing_file_exit_one() {
    let fx = Fixture::new();
    let right = fx.write("right.json", "{}");
    let missing = fx.dir.path().join("missing.json");

    let output = fx.compare(&missing, &right, &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_usage_errors_exit_one() {
    let fx = Fixture::new();
    let left = fx.write("left.json", "{}");
    let right = fx.write("right.json", "{}");

    let output = fx.run(&["compare", left.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));

    let output = fx.compare(&left, &right, &["--absent-as-empty", "--strict-absent"]);
    assert_eq!(output.status.code(), Some(1));

    let output = fx.compare(&left, &right, &["--no-such-flag"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_zero() {
    let fx = Fixture::new();
    let output = fx.run(&["compare", "--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--absent-as-empty"));
}

#[test]
fn test_missing_config_file_exit_one() {
    let fx = Fixture::new();
    let left = fx.write("left.json", "{}");
    let right = fx.write("right.json", "{}");
    let missing = fx.dir.path().join("nope.toml");

    let output = fx.run(&[
        "compare",
        left.to_str().unwrap(),
        right.to_str().unwrap(),
        "--config",
        missing.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Config file not found"));
}

#[test]
fn test_config_init_writes_default() {
    let fx = Fixture::new();
    let output = fx.run(&["config", "--init"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Config file:"));
    assert!(stdout.contains("identity_fields"));
}
