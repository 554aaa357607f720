#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn prakter(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("prakter").unwrap();
    cmd.current_dir(dir.path()).env("PRAKTER_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    prakter(dir).arg("init").assert().success();
}

fn read_json(dir: &TempDir, name: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.path().join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn add_task(dir: &TempDir, title: &str, category: &str) -> String {
    let out = prakter(dir)
        .args(["--json", "todo", "add", "--title", title])
        .args(["--description", "details", "--category", category])
        .output()
        .unwrap();
    assert!(out.status.success());
    let item: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    item["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// prakter init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_three_files() {
    let dir = TempDir::new().unwrap();
    prakter(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: README.md"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "# Project Name\n\nProject description goes here.\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("TODO.json")).unwrap(),
        "[]"
    );
    let log = read_json(&dir, "CHANGELOG.json");
    assert_eq!(log[0]["version"], "0.1.0");
    assert_eq!(log[0]["changes"][0]["type"], "feature");
    assert_eq!(log[0]["changes"][0]["description"], "Initial release");
}

#[test]
fn init_with_existing_files_cancels_without_prompt() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README.md"), "keep me").unwrap();
    prakter(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));
    assert!(!dir.path().join("TODO.json").exists());
}

#[test]
fn init_missing_only_keeps_existing_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README.md"), "keep me").unwrap();
    prakter(&dir)
        .args(["init", "--missing-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  README.md"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "keep me"
    );
    assert!(dir.path().join("TODO.json").exists());
    assert!(dir.path().join("CHANGELOG.json").exists());
}

#[test]
fn init_replace_all_overwrites() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("TODO.json"), r#"[{"bogus": true}]"#).unwrap();
    prakter(&dir)
        .args(["init", "--replace-all"])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("TODO.json")).unwrap(),
        "[]"
    );
}

#[test]
fn init_flags_conflict() {
    let dir = TempDir::new().unwrap();
    prakter(&dir)
        .args(["init", "--replace-all", "--missing-only"])
        .assert()
        .failure();
}

#[test]
fn missing_workspace_fails() {
    let dir = TempDir::new().unwrap();
    let gone = dir.path().join("nope");
    Command::cargo_bin("prakter")
        .unwrap()
        .env("PRAKTER_ROOT", &gone)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: no workspace folder found"));
}

// ---------------------------------------------------------------------------
// prakter todo
// ---------------------------------------------------------------------------

#[test]
fn todo_add_and_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let id = add_task(&dir, "Fix login", "Bugs");

    let todos = read_json(&dir, "TODO.json");
    assert_eq!(todos[0]["id"], id.as_str());
    assert_eq!(todos[0]["relatedFiles"], serde_json::json!([]));
    assert!(todos[0].get("completedAt").is_none());

    prakter(&dir)
        .args(["todo", "list", "--category", "Bugs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix login"))
        .stdout(predicate::str::contains("0/1 completed"));
}

#[test]
fn rust_log_overrides_default_level() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    prakter(&dir)
        .env("RUST_LOG", "debug")
        .args(["todo", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"))
        .stderr(predicate::str::contains("loaded"));

    prakter(&dir)
        .env_remove("RUST_LOG")
        .args(["todo", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG").not());
}

#[test]
fn todo_add_without_title_is_cancelled() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["todo", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));
    assert_eq!(read_json(&dir, "TODO.json"), serde_json::json!([]));
}

#[test]
fn todo_add_rejects_unknown_category() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["todo", "add", "--title", "x", "--description", "y"])
        .args(["--category", "Someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category 'Someday'"));
}

#[test]
fn todo_create_in_category() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["todo", "create-in", "Ideas", "--title", "Dark mode"])
        .args(["--description", "night", "--file", "src/ui.rs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task"));
    let todos = read_json(&dir, "TODO.json");
    assert_eq!(todos[0]["category"], "Ideas");
    assert_eq!(todos[0]["relatedFiles"][0], "src/ui.rs");
}

#[test]
fn todo_delete_requires_yes_without_terminal() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let id = add_task(&dir, "Doomed", "Ideas");

    prakter(&dir)
        .args(["todo", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));
    assert_eq!(read_json(&dir, "TODO.json").as_array().unwrap().len(), 1);

    prakter(&dir)
        .args(["todo", "delete", &id, "--yes"])
        .assert()
        .success();
    assert_eq!(read_json(&dir, "TODO.json"), serde_json::json!([]));
}

#[test]
fn todo_rename_complete_show() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let id = add_task(&dir, "Old", "Features");

    prakter(&dir)
        .args(["todo", "rename", &id, "Brand", "new"])
        .assert()
        .success();
    prakter(&dir)
        .args(["todo", "complete", &id])
        .assert()
        .success();
    prakter(&dir)
        .args(["todo", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Brand new"))
        .stdout(predicate::str::contains("Completed:"));
}

#[test]
fn todo_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["todo", "complete", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task not found: 123"));
}

#[test]
fn todo_invalid_file_fails_without_write() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(dir.path().join("TODO.json"), "not json").unwrap();
    prakter(&dir)
        .args(["todo", "add", "--title", "x", "--description", "y"])
        .args(["--category", "Bugs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("TODO.json")).unwrap(),
        "not json"
    );
}

// ---------------------------------------------------------------------------
// prakter changelog
// ---------------------------------------------------------------------------

#[test]
fn changelog_add_merges_existing_version() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["changelog", "add", "--version", "0.1.0", "--type", "fix"])
        .args(["--description", "bug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added to version 0.1.0"));

    let log = read_json(&dir, "CHANGELOG.json");
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["changes"][1]["type"], "fix");
}

#[test]
fn changelog_add_creates_new_version() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["changelog", "add", "--version", "0.2.0", "--type", "chore"])
        .args(["--description", "deps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created version 0.2.0"));
    prakter(&dir)
        .args(["changelog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2.0"))
        .stdout(predicate::str::contains("[chore] deps"));
}

#[test]
fn changelog_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .args(["changelog", "add", "--version", "1", "--type", "perf"])
        .args(["--description", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid change type 'perf'"));
}

// ---------------------------------------------------------------------------
// prakter tree / refresh / config
// ---------------------------------------------------------------------------

#[test]
fn tree_shows_placeholder_when_missing() {
    let dir = TempDir::new().unwrap();
    prakter(&dir)
        .args(["tree", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TODO.json not found. Create one?"));
}

#[test]
fn tree_lists_categories_and_tasks() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_task(&dir, "Fix login", "Bugs");
    prakter(&dir)
        .args(["tree", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bugs"))
        .stdout(predicate::str::contains("Improvements"))
        .stdout(predicate::str::contains("Fix login"));
    prakter(&dir)
        .args(["tree", "changelog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0 ("))
        .stdout(predicate::str::contains("Initial release"));
}

#[test]
fn tree_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("CHANGELOG.json"), "{").unwrap();
    prakter(&dir)
        .args(["tree", "changelog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Error reading CHANGELOG.json"));
}

#[test]
fn refresh_summarises_files() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prakter(&dir)
        .arg("refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/0 completed"))
        .stdout(predicate::str::contains("1 versions"));
}

#[test]
fn config_init_and_custom_categories() {
    let dir = TempDir::new().unwrap();
    prakter(&dir)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(dir.path().join(".prakter/config.yaml").exists());

    std::fs::write(
        dir.path().join(".prakter/config.yaml"),
        "todo_categories: [Now, Later]\n",
    )
    .unwrap();
    prakter(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Later"));

    init_project(&dir);
    prakter(&dir)
        .args(["tree", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Now"))
        .stdout(predicate::str::contains("Bugs").not());
}
