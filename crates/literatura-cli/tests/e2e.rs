//! E2E tests for the `lit` binary: build, render and report.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

const EDGES: &str = "\
src/cli/main.js\tsrc/core/engine.js
src/cli/main.js\tsrc/cli/args.js
src/core/engine.js\tsrc/core/graph.js
src/core/graph.js\tsrc/core/engine.js\ttype
src/core/engine.js\tsrc/util.js
test/engine.test.js\tsrc/core/engine.js
";

fn lit_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lit"));
    cmd.current_dir(dir);
    cmd.arg("--base-dir").arg(dir);
    cmd.env("LITERATURA_LOG", "error");
    cmd
}

fn build_project(dir: &Path) {
    std::fs::write(dir.join("deps.tsv"), EDGES).expect("write edges");
    lit_cmd(dir)
        .args(["build", "--edges", "deps.tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 modules, 6 references (5 runtime)"));
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

// ---------------------------------------------------------------------------
// lit build
// ---------------------------------------------------------------------------

#[test]
fn build_writes_default_store() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());

    let store: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(".literatura-store.json")).expect("store exists"),
    )
    .expect("store is JSON");
    assert_eq!(store["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(store["files"].as_array().map(Vec::len), Some(6));
    assert!(store["files"][0].as_str().is_some_and(|f| !f.starts_with('/')));
}

#[test]
fn build_reads_json_from_stdin() {
    let dir = TempDir::new().expect("tempdir");
    lit_cmd(dir.path())
        .args(["build", "--format", "json"])
        .write_stdin(r#"[["a/x.js", "b/y.js"], {"tail": "b/y.js", "head": "b/z.js", "runtime": false}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"references\": 2"));

    let plain = stdout_of(lit_cmd(dir.path()).arg("render"));
    assert_eq!(plain, "a/x.js\tb/y.js\nb/y.js\tb/z.js\n");
}

#[test]
fn build_rejects_malformed_edges() {
    let dir = TempDir::new().expect("tempdir");
    lit_cmd(dir.path())
        .arg("build")
        .write_stdin("lonely-tail\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed edge at entry 1"));
    assert!(!dir.path().join(".literatura-store.json").exists());
}

// ---------------------------------------------------------------------------
// lit render
// ---------------------------------------------------------------------------

#[test]
fn render_without_entries_prints_plain_edges() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());

    let plain = stdout_of(lit_cmd(dir.path()).arg("render"));
    assert_eq!(plain.lines().count(), 6);
    assert!(plain.starts_with("src/cli/main.js\tsrc/cli/args.js\n"));

    let runtime = stdout_of(lit_cmd(dir.path()).args(["render", "--runtime-only"]));
    assert_eq!(runtime.lines().count(), 5);
    assert!(!runtime.contains("src/core/graph.js\tsrc/core/engine.js"));
}

#[test]
fn render_entry_uses_templates() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());

    let text = stdout_of(lit_cmd(dir.path()).args([
        "render", "src", "--node", "%c %s", "--edge", "%s -> %d (%w)",
    ]));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], dir.path().join("src").display().to_string());
    assert_eq!(&lines[1..], [":1: cli/", ":2: core/", ":3: util.js", "cli/ -> core/ (1)", "core/ -> util.js (1)"]);
}

#[test]
fn render_rejects_oversized_template_width() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());
    lit_cmd(dir.path())
        .args(["render", "src", "--node", "%70000s"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("exceeds the maximum of 65535"));
}

#[test]
fn render_reads_templates_from_config() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());
    std::fs::write(
        dir.path().join(".literatura.toml"),
        "[render]\nnode = \"node %s\"\nedge = \"edge %s %d\"\n",
    )
    .expect("write config");

    let text = stdout_of(lit_cmd(dir.path()).args(["render", "src/core"]));
    assert!(text.contains("node engine.js\nnode graph.js\n"));
    assert!(text.contains("edge engine.js graph.js\nedge graph.js engine.js\n"));
}

// ---------------------------------------------------------------------------
// lit report
// ---------------------------------------------------------------------------

#[test]
fn report_markdown_follows_directories() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());

    let text = stdout_of(lit_cmd(dir.path()).arg("report"));
    let headings: Vec<&str> = text.lines().filter(|l| l.starts_with("# ")).collect();
    assert_eq!(headings, ["# src/cli", "# src/core", "# src", "# ."]);
    assert!(text.contains("- *engine.js* (!)"));
}

#[test]
fn report_json_has_sections() {
    let dir = TempDir::new().expect("tempdir");
    build_project(dir.path());

    let text = stdout_of(lit_cmd(dir.path()).args(["report", "--format", "json", "--runtime-only"]));
    let report: Value = serde_json::from_str(&text).expect("report JSON");
    let sections = report["sections"].as_array().expect("sections array");
    assert_eq!(sections.len(), 4);
    // Without the type-only edge the core directory has no cycle left.
    let core = &sections[1]["components"][0]["sccs"];
    assert_eq!(core[0]["nodes"], serde_json::json!(["engine.js"]));
    assert_eq!(core[0]["is_cyclic"], false);
}

#[test]
fn report_without_store_fails() {
    let dir = TempDir::new().expect("tempdir");
    lit_cmd(dir.path())
        .arg("report")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("run `lit build` first"));
}

#[test]
fn report_rejects_store_from_other_version() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join(".literatura-store.json"),
        r#"{"version":"0.0.1","files":[],"refs":[],"runtimeRefs":[]}"#,
    )
    .expect("write store");
    lit_cmd(dir.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("version mismatch"));
}

// ---------------------------------------------------------------------------
// lit completions
// ---------------------------------------------------------------------------

#[test]
fn completions_work_outside_a_project() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join(".literatura.toml"), "not = [valid").expect("write config");
    lit_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_lit()"));
}
