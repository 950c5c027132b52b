use assert_cmd::Command;
use predicates::prelude::*;

fn sqlbench() -> Command {
    let mut cmd = Command::cargo_bin("sqlbench").unwrap();
    cmd.env_remove("OPENAI_KEY")
        .env_remove("ANY_SCALE_API_KEY")
        .env_remove("SQLBENCH_TARGET_DIR");
    cmd
}

fn write_dataset(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("dev.json");
    std::fs::write(
        &path,
        r#"[{"db_id":"pets","context":"CREATE TABLE pets(age int)","question":"How many pets?","query":"SELECT count(*) FROM pets","hardness":"easy"}]"#,
    )
    .unwrap();
    path
}

#[test]
fn models_lists_aliases_and_providers() {
    sqlbench()
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("cl-70"))
        .stdout(predicate::str::contains("gpt-3.5-turbo-16k"))
        .stdout(predicate::str::contains("https://api.endpoints.anyscale.com/v1"));
}

#[test]
fn models_json_is_parseable() {
    let out = sqlbench()
        .args(["models", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let gpt4 = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["alias"] == "gpt-4")
        .unwrap();
    assert_eq!(gpt4["provider"], "openai");
}

#[test]
fn unknown_alias_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path());
    sqlbench()
        .args(["run", "--models", "gpt-5", "--dataset"])
        .arg(&dataset)
        .arg("--target-dir")
        .arg(dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown model alias 'gpt-5'"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_api_key_exits_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path());
    sqlbench()
        .args(["run", "--models", "gpt-4", "--inf-length", "1", "--dataset"])
        .arg(&dataset)
        .arg("--target-dir")
        .arg(dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OPENAI_KEY"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unreadable_dataset_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    sqlbench()
        .env("ANY_SCALE_API_KEY", "test-key")
        .args(["run", "--models", "mistral", "--dataset"])
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read dataset"));
}

#[test]
fn version_prints_package_version() {
    sqlbench()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
