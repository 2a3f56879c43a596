// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::predicate;
use serde_json::{json, Value};

use common::{parse_json, FakeTools, FS, MOUNT_POINT};

mod common;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn run_module(tools: &FakeTools, args: &Value) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("fsquota").unwrap();
    cmd.env("PATH", tools.search_path())
        .arg(tools.args_file(args))
        .assert()
}

fn alice(extra: Value) -> Value {
    let mut args = json!({"name": "alice", "type": "user", "filesystem": FS});
    if let (Some(args), Value::Object(extra)) = (args.as_object_mut(), extra) {
        args.extend(extra);
    }
    args
}

#[test]
// Test fsquota -V produces version string.
fn test_fsquota_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("fsquota")?;
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
    Ok(())
}

#[test]
// Test fsquota when no arguments file is given.
fn test_fsquota_no_args_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("fsquota")?;
    cmd.assert().failure().code(2);
    Ok(())
}

#[test]
// Test that an unreadable arguments file is reported as a module failure.
fn test_fsquota_missing_args_file() {
    let mut cmd = Command::cargo_bin("fsquota").unwrap();
    cmd.arg(Path::new("/nonexistent/args.json"));
    let output = cmd.assert().failure().code(1).get_output().clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["failed"], json!(true));
    assert!(result["msg"]
        .as_str()
        .unwrap()
        .contains("cannot read module arguments"));
}

#[test]
// Test that a bad subject type fails before any tool is run.
fn test_fsquota_bad_type() {
    let tools = FakeTools::with_limits(0, 0, 0, 0);
    let output = run_module(&tools, &alice(json!({"type": "project", "blocks_hard": "2K"})))
        .failure()
        .code(1)
        .get_output()
        .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["failed"], json!(true));
    assert_eq!(
        result["msg"],
        json!("Invalid request: value of type must be one of: user, group, got: project")
    );
    assert!(tools.setquota_calls().is_empty());
}

#[test]
// Test that a malformed limit names the offending field.
fn test_fsquota_bad_magnitude() {
    let tools = FakeTools::with_limits(0, 0, 0, 0);
    let output = run_module(&tools, &alice(json!({"blocks_soft": "5Xb"})))
        .failure()
        .code(1)
        .get_output()
        .clone();
    assert_eq!(
        parse_json(&output.stdout)["msg"],
        json!("Unsupported value \"5Xb\" in blocks_soft")
    );
}

#[test]
// Test that a query reports the record as it is.
fn test_fsquota_get() {
    let tools = FakeTools::with_limits(100, 200, 10, 20);
    let output = run_module(&tools, &alice(json!({})))
        .success()
        .get_output()
        .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(false));
    assert_eq!(result["type"], json!("user"));
    assert_eq!(result["name"], json!("alice"));
    assert_eq!(result["filesystem"], json!(FS));
    assert_eq!(result["blocks_used"], json!(8));
    assert_eq!(result["blocks_soft"], json!(100));
    assert_eq!(result["blocks_hard"], json!(200));
    assert_eq!(result["inodes_used"], json!(2));
    assert_eq!(result["inodes_soft"], json!(10));
    assert_eq!(result["inodes_hard"], json!(20));
    assert_eq!(result["changes"], json!([]));
    assert!(tools.setquota_calls().is_empty());
}

#[test]
// Test that a subject without a record reads as all zero.
fn test_fsquota_get_no_record() {
    let tools = FakeTools::new();
    let output = run_module(&tools, &alice(json!({})))
        .success()
        .get_output()
        .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(false));
    for key in [
        "blocks_used",
        "blocks_soft",
        "blocks_hard",
        "blocks_grace",
        "inodes_used",
        "inodes_soft",
        "inodes_hard",
        "inodes_grace",
    ] {
        assert_eq!(result[key], json!(0), "{key}");
    }
}

#[test]
// Test that a subject over its limits is still reported.
fn test_fsquota_get_over_quota() {
    let tools = FakeTools::new();
    tools.set_state("300* 100 200 1700000000 2 10 20 0");
    tools.over_quota();
    let output = run_module(&tools, &alice(json!({})))
        .success()
        .get_output()
        .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["blocks_used"], json!(300));
    assert_eq!(result["blocks_grace"], json!(1_700_000_000));
}

#[test]
// Test that setting a limit keeps the others, and that repeating the
// request changes nothing.
fn test_fsquota_set_idempotent() {
    let tools = FakeTools::with_limits(100, 0, 10, 20);
    let args = alice(json!({"blocks_hard": "2K"}));

    let output = run_module(&tools, &args).success().get_output().clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(true));
    assert_eq!(result["blocks_hard"], json!(2));
    assert_eq!(result["changes"], json!(["blocks_hard"]));
    assert_eq!(tools.setquota_calls(), vec![format!("-u alice 100 2 10 20 {FS}")]);

    let output = run_module(&tools, &args).success().get_output().clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(false));
    assert_eq!(result["blocks_hard"], json!(2));
    assert_eq!(tools.setquota_calls().len(), 1);
}

#[test]
// Test that bare numbers are accepted as limits.
fn test_fsquota_set_numbers() {
    let tools = FakeTools::new();
    let output = run_module(
        &tools,
        &alice(json!({"blocks_soft": 1024, "inodes_hard": "1.5K"})),
    )
    .success()
    .get_output()
    .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(true));
    assert_eq!(result["blocks_soft"], json!(1024));
    assert_eq!(result["inodes_hard"], json!(1500));
    assert_eq!(result["changes"], json!(["blocks_soft", "inodes_hard"]));
    assert_eq!(tools.setquota_calls(), vec![format!("-u alice 1024 0 0 1500 {FS}")]);
}

#[test]
// Test that check mode reports the change without making it.
fn test_fsquota_check_mode() {
    let tools = FakeTools::with_limits(100, 0, 10, 20);
    let before = tools.state();
    let output = run_module(
        &tools,
        &alice(json!({"blocks_hard": "2K", "_ansible_check_mode": true})),
    )
    .success()
    .get_output()
    .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(true));
    assert_eq!(result["blocks_hard"], json!(2));
    assert!(tools.setquota_calls().is_empty());
    assert_eq!(tools.state(), before);
}

#[test]
// Test that a privilege failure from setquota is reported with its details.
fn test_fsquota_set_denied() {
    let tools = FakeTools::with_limits(0, 0, 0, 0);
    tools.deny();
    let output = run_module(&tools, &alice(json!({"inodes_soft": "5"})))
        .failure()
        .code(1)
        .get_output()
        .clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["failed"], json!(true));
    assert!(result["msg"]
        .as_str()
        .unwrap()
        .starts_with("Permission denied running"));
    assert!(result["cmd"]
        .as_str()
        .unwrap()
        .ends_with(&format!("setquota -u alice 0 0 5 0 {FS}")));
    assert!(result["stderr"]
        .as_str()
        .unwrap()
        .contains("Operation not permitted"));
}

#[test]
// Test that a record is found when the filesystem is named by its mount
// point, and that setting one limit there keeps the others.
fn test_fsquota_mount_point() {
    let tools = FakeTools::with_limits(100, 200, 10, 20);
    let get = json!({"name": "alice", "type": "user", "filesystem": MOUNT_POINT});
    let output = run_module(&tools, &get).success().get_output().clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(false));
    assert_eq!(result["filesystem"], json!(MOUNT_POINT));
    assert_eq!(result["blocks_soft"], json!(100));
    assert_eq!(result["blocks_hard"], json!(200));
    assert_eq!(result["inodes_soft"], json!(10));
    assert_eq!(result["inodes_hard"], json!(20));

    let set = json!({
        "name": "alice",
        "type": "user",
        "filesystem": MOUNT_POINT,
        "blocks_hard": "300",
    });
    let output = run_module(&tools, &set).success().get_output().clone();
    let result = parse_json(&output.stdout);
    assert_eq!(result["changed"], json!(true));
    assert_eq!(result["blocks_soft"], json!(100));
    assert_eq!(result["blocks_hard"], json!(300));
    assert_eq!(result["inodes_soft"], json!(10));
    assert_eq!(result["inodes_hard"], json!(20));

    let output = run_module(&tools, &set).success().get_output().clone();
    assert_eq!(parse_json(&output.stdout)["changed"], json!(false));
    assert_eq!(
        tools.setquota_calls(),
        vec![format!("-u alice 100 300 10 20 {MOUNT_POINT}")]
    );
}
