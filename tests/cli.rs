//
//  devops-client
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dvo(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dvo").unwrap();
    cmd.env("DVO_CONFIG_DIR", config_dir.path())
        .env_remove("DVO_CONNECTION")
        .env_remove("DVO_PROJECT")
        .env_remove("DVO_DEBUG")
        .env("DVO_NO_PROMPT", "true");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("api"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("--connection"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("dvo version "));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();

    dvo(&dir)
        .args(["config", "set", "fabrikam.url", "https://dev.azure.com/fabrikam/"])
        .assert()
        .success();
    dvo(&dir)
        .args(["config", "set", "fabrikam.default_project", "Fiber"])
        .assert()
        .success();

    dvo(&dir)
        .args(["config", "get", "fabrikam.url"])
        .assert()
        .success()
        .stdout("https://dev.azure.com/fabrikam\n");

    dvo(&dir)
        .args(["--json", "config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fabrikam.default_project\": \"Fiber\""));

    assert!(dir.path().join("config.toml").is_file());
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .args(["config", "set", "nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_path_honours_override() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(
            dir.path().to_string_lossy().into_owned(),
        ));
}

#[test]
fn test_completion_script() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_dvo"));
}

#[test]
fn test_api_without_connection_fails() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .args(["api", "core", "projects"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No connection selected"));
}

#[test]
fn test_api_unknown_type_fails_before_connecting() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .args(["api", "build", "builds", "--type", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown type 'Nope'"));
}

#[test]
fn test_collection_requires_type() {
    let dir = TempDir::new().unwrap();
    dvo(&dir)
        .args(["api", "build", "builds", "--collection"])
        .assert()
        .failure()
        .code(2);
}
