//! End-to-end tests for the `bzlfix` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use bzlfix_syntax::{Expr, File};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn bzlfix() -> Command {
    Command::cargo_bin("bzlfix").expect("bzlfix binary")
}

fn legacy_tree() -> File {
    File::new(
        "pkg/BUILD",
        vec![
            Expr::call(
                Expr::literal("load"),
                vec![
                    Expr::string("@io_bazel_rules_go//go:def.bzl"),
                    Expr::string("cgo_library"),
                    Expr::string("go_library"),
                ],
            ),
            Expr::call(
                Expr::literal("cgo_library"),
                vec![
                    Expr::keyword("name", Expr::string("cgo_default_library")),
                    Expr::keyword("srcs", Expr::list(vec![Expr::string("cgo.go")])),
                ],
            ),
            Expr::call(
                Expr::literal("go_library"),
                vec![
                    Expr::keyword("name", Expr::string("go_default_library")),
                    Expr::keyword("srcs", Expr::list(vec![Expr::string("pure.go")])),
                    Expr::keyword("library", Expr::string(":cgo_default_library")),
                ],
            ),
        ],
    )
}

fn current_tree() -> File {
    File::new(
        "lib/BUILD",
        vec![
            Expr::call(
                Expr::literal("load"),
                vec![
                    Expr::string("@io_bazel_rules_go//go:def.bzl"),
                    Expr::string("go_library"),
                ],
            ),
            Expr::call(
                Expr::literal("go_library"),
                vec![Expr::keyword("name", Expr::string("go_default_library"))],
            ),
        ],
    )
}

fn write_tree(path: &Path, tree: &File) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(tree).unwrap()).unwrap();
}

fn read_tree(path: &Path) -> File {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn workspace() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    write_tree(&td.path().join("trees/pkg/BUILD.json"), &legacy_tree());
    write_tree(&td.path().join("trees/lib/BUILD.json"), &current_tree());
    td
}

fn kinds(tree: &File) -> Vec<&str> {
    tree.stmts.iter().filter_map(|s| s.call_name()).collect()
}

#[test]
fn test_list_fixes_text() {
    bzlfix()
        .arg("list-fixes")
        .assert()
        .success()
        .stdout(predicate::str::contains("cgo-library"))
        .stdout(predicate::str::contains("loads"));
}

#[test]
fn test_list_fixes_json() {
    let output = bzlfix()
        .args(["list-fixes", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let keys: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["cgo-library", "loads"]);
}

#[test]
fn test_explain_known_fix() {
    bzlfix()
        .args(["explain", "loads"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reconcile load statements"))
        .stdout(predicate::str::contains("REMEDIATION GUIDANCE"));
}

#[test]
fn test_explain_unknown_fix_fails() {
    bzlfix()
        .args(["explain", "resolver-v2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown fix key"));
}

#[test]
fn test_fix_rewrites_trees_in_place() {
    let temp = workspace();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fixed"))
        .stdout(predicate::str::contains("cgo-library, loads"));

    let fixed = read_tree(&temp.path().join("trees/pkg/BUILD.json"));
    assert_eq!(kinds(&fixed), vec!["load", "go_library"]);
    assert_eq!(
        *fixed.stmts[0],
        Expr::call(
            Expr::literal("load"),
            vec![
                Expr::string("@io_bazel_rules_go//go:def.bzl"),
                Expr::string("go_library"),
            ],
        )
    );

    let untouched = read_tree(&temp.path().join("trees/lib/BUILD.json"));
    assert_eq!(untouched, current_tree());
}

#[test]
fn test_fix_twice_is_a_noop() {
    let temp = workspace();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees"])
        .assert()
        .success();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees", "--check"])
        .assert()
        .success();
}

#[test]
fn test_check_exits_2_and_writes_nothing() {
    let temp = workspace();
    let input = temp.path().join("trees/pkg/BUILD.json");
    let before = fs::read_to_string(&input).unwrap();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees", "--check"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("would fix"))
        .stderr(predicate::str::contains("would be changed"));

    assert_eq!(fs::read_to_string(&input).unwrap(), before);
}

#[test]
fn test_out_dir_receives_trees_and_report() {
    let temp = workspace();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees", "--out-dir", "out"])
        .assert()
        .success();

    let out = temp.path().join("out");
    assert!(out.join("trees/pkg/BUILD.json").exists());
    assert!(!out.join("trees/lib/BUILD.json").exists());
    assert!(out.join("summary.md").exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["schema"], "bzlfix.report.v1");
    assert_eq!(report["verdict"]["counts"]["fixed"], 1);
    assert_eq!(report["verdict"]["counts"]["unchanged"], 1);

    // Inputs stay as they were.
    assert_eq!(
        read_tree(&temp.path().join("trees/pkg/BUILD.json")),
        legacy_tree()
    );
}

#[test]
fn test_out_dir_inside_input_is_not_ingested() {
    let temp = workspace();

    for _ in 0..2 {
        bzlfix()
            .current_dir(temp.path())
            .args(["fix", "trees", "--out-dir", "trees/out"])
            .assert()
            .success();
    }

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("trees/out/report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_out_dir_under_current_dir_is_not_ingested() {
    let temp = workspace();

    for _ in 0..2 {
        bzlfix()
            .current_dir(temp.path())
            .args(["fix", ".", "--out-dir", "out"])
            .assert()
            .success();
    }

    let out = temp.path().join("out");
    assert!(out.join("trees/trees/pkg/BUILD.json").exists());
    assert!(!out.join("trees/out").exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
    assert_eq!(report["verdict"]["counts"]["failed"], 0);
}

#[test]
fn test_stray_json_is_reported_as_failed() {
    let temp = workspace();
    fs::write(temp.path().join("trees/package.json"), r#"{"name":"web"}"#).unwrap();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed"))
        .stdout(predicate::str::contains("package.json"));
}

#[test]
fn test_disable_flag_skips_fixer() {
    let temp = workspace();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees/pkg/BUILD.json", "--disable", "loads"])
        .assert()
        .success();

    let fixed = read_tree(&temp.path().join("trees/pkg/BUILD.json"));
    // The stale cgo_library symbol stays loaded.
    assert_eq!(kinds(&fixed), vec!["load", "go_library"]);
    assert_eq!(*fixed.stmts[0], *legacy_tree().stmts[0]);
}

#[test]
fn test_config_file_disables_fixer() {
    let temp = workspace();
    fs::write(
        temp.path().join("bzlfix.toml"),
        "[fixers]\ndisable = [\"cgo-library\"]\n",
    )
    .unwrap();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees/pkg/BUILD.json"])
        .assert()
        .success();

    let fixed = read_tree(&temp.path().join("trees/pkg/BUILD.json"));
    // Only loads ran: cgo_library is still called, so its symbol stays.
    assert_eq!(kinds(&fixed), vec!["load", "cgo_library", "go_library"]);
}

#[test]
fn test_explicit_config_with_custom_registry() {
    let temp = workspace();
    let config = temp.path().join("custom.toml");
    fs::write(
        &config,
        "[[loads]]\nfile = \"//tools:go.bzl\"\nsymbols = [\"go_library\"]\n",
    )
    .unwrap();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees/lib/BUILD.json", "--config", "custom.toml"])
        .assert()
        .success();

    let fixed = read_tree(&temp.path().join("trees/lib/BUILD.json"));
    // The rules_go load is no longer managed, so it is kept and go_library counts as
    // loaded externally.
    assert_eq!(fixed, current_tree());
}

#[test]
fn test_unknown_disable_key_fails() {
    let temp = workspace();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees", "--disable", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown fixer key"));
}

#[test]
fn test_invalid_tree_fails_but_others_are_fixed() {
    let temp = workspace();
    fs::write(temp.path().join("trees/broken.json"), "{ nope").unwrap();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "trees"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed"));

    let fixed = read_tree(&temp.path().join("trees/pkg/BUILD.json"));
    assert_eq!(kinds(&fixed), vec!["load", "go_library"]);
}

#[test]
fn test_missing_input_fails() {
    let temp = tempfile::tempdir().unwrap();

    bzlfix()
        .current_dir(temp.path())
        .args(["fix", "does-not-exist"])
        .assert()
        .code(1);
}
