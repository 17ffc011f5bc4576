use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tyrozen::storage::Store;

fn tyrozen_cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tyrozen").expect("Failed to find tyrozen binary");
    cmd.env_remove("TYROZEN_DATA_DIR")
        .arg("--data-dir")
        .arg(data_dir.path());
    cmd
}

fn first_section_id(data_dir: &TempDir, view: &str) -> String {
    Store::new(data_dir.path()).load(view).expect("stored view")[0]
        .id
        .clone()
}

#[test]
fn test_list_shows_default_sections() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("View: daily"))
        .stdout(predicate::str::contains("monday"))
        .stdout(predicate::str::contains("Math Revision (high)"))
        .stdout(predicate::str::contains("due 2025-11-27"))
        .stdout(predicate::str::contains("(No tasks yet)"));
}

fn listed_section_id(stdout: &str, title: &str) -> String {
    let prefix = format!("{} [", title);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.strip_suffix(']'))
        .expect("section line in list output")
        .to_string()
}

#[test]
fn test_ids_from_list_work_on_fresh_view() {
    let tmp = TempDir::new().unwrap();
    let output = tyrozen_cmd(&tmp).arg("list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let monday = listed_section_id(&stdout, "monday");

    tyrozen_cmd(&tmp)
        .args(["add", &monday, "--title", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task"));

    let doc = Store::new(tmp.path()).load("daily").unwrap();
    assert_eq!(doc[0].id, monday);
    assert_eq!(doc[0].tasks.len(), 2);
    assert_eq!(doc[0].tasks[1].title, "x");
}

#[test]
fn test_list_is_stable_across_runs() {
    let tmp = TempDir::new().unwrap();
    let first = tyrozen_cmd(&tmp).arg("list").output().unwrap();
    let second = tyrozen_cmd(&tmp).arg("list").output().unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_section_then_add_task() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp)
        .args(["section", "friday"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created section"));

    let doc = Store::new(tmp.path()).load("daily").unwrap();
    let friday = doc.last().unwrap().id.clone();

    tyrozen_cmd(&tmp)
        .args([
            "add",
            &friday,
            "--title",
            "Laundry",
            "--priority",
            "low",
            "--deadline",
            "2026-03-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task"));

    tyrozen_cmd(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Laundry (low)"))
        .stdout(predicate::str::contains("due 2026-03-01"));
}

#[test]
fn test_blank_section_name_fails() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp)
        .args(["section", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("section name is empty"));
    assert!(Store::new(tmp.path()).load("daily").is_none());
}

#[test]
fn test_toggle_and_edit() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp).args(["section", "chores"]).assert().success();
    let section_id = first_section_id(&tmp, "daily");
    let task_id = Store::new(tmp.path()).load("daily").unwrap()[0].tasks[0]
        .id
        .clone();

    tyrozen_cmd(&tmp)
        .args(["toggle", &section_id, &task_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));

    tyrozen_cmd(&tmp)
        .args([
            "edit",
            &section_id,
            &task_id,
            "--title",
            "Math exam",
            "--clear-deadline",
        ])
        .assert()
        .success();

    let task = Store::new(tmp.path()).load("daily").unwrap()[0].tasks[0].clone();
    assert!(task.completed);
    assert_eq!(task.title, "Math exam");
    assert_eq!(task.deadline, None);
}

#[test]
fn test_unknown_ids_fail_without_writing() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp)
        .args(["toggle", "nope", "nada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    tyrozen_cmd(&tmp)
        .args(["add", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("section nope not found"));
    assert!(Store::new(tmp.path()).load("daily").is_none());
}

#[test]
fn test_invalid_priority_is_rejected() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp)
        .args(["add", "whatever", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid priority"));
}

#[test]
fn test_views_are_stored_separately() {
    let tmp = TempDir::new().unwrap();
    tyrozen_cmd(&tmp)
        .args(["--view", "weekly", "section", "sprint"])
        .assert()
        .success();
    let store = Store::new(tmp.path());
    assert_eq!(store.load("weekly").unwrap().len(), 5);
    assert!(store.load("daily").is_none());
    assert!(tmp
        .path()
        .join("tyrozen-section-view-weekly.yml")
        .exists());
}
