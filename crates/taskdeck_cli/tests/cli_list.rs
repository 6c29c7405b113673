use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
}

fn taskdeck(store_path: &PathBuf) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskdeck"));
    cmd.env("TASKDECK_STORE_PATH", store_path)
        .env("TASKDECK_CONFIG_PATH", store_path.with_extension("config.json"))
        .env(
            "TASKDECK_SESSION_PATH",
            store_path.with_extension("session.json"),
        );
    cmd
}

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 2,
        "tasks": tasks
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

#[test]
fn list_json_intersects_search_and_status() {
    let store_path = temp_path("cli-list-filter.json");
    write_store(
        &store_path,
        serde_json::json!([
            { "id": "1", "title": "Tarea 1", "completed": true },
            { "id": "2", "title": "Tarea 2", "completed": false }
        ]),
    );

    let output = taskdeck(&store_path)
        .args(["list", "--search", "tarea", "--status", "completed", "--json"])
        .output()
        .expect("failed to run list command");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let view: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    let view = view.as_array().unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0]["id"], "1");
}

#[test]
fn list_status_starred_returns_starred_tasks_only() {
    let store_path = temp_path("cli-list-starred.json");
    write_store(
        &store_path,
        serde_json::json!([
            { "id": "1", "title": "plain" },
            { "id": "2", "title": "important", "starred": true }
        ]),
    );

    let output = taskdeck(&store_path)
        .args(["list", "--status", "starred", "--json"])
        .output()
        .expect("failed to run list command");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let view: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    let view = view.as_array().unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0]["id"], "2");
}

#[test]
fn list_renders_a_table_with_titles() {
    let store_path = temp_path("cli-list-table.json");
    write_store(
        &store_path,
        serde_json::json!([
            { "id": "1", "title": "Tarea 1", "start_date": "2025-12-13" }
        ]),
    );

    let output = taskdeck(&store_path)
        .args(["list"])
        .output()
        .expect("failed to run list command");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TITLE"));
    assert!(stdout.contains("Tarea 1"));
    assert!(stdout.contains("2025-12-13"));
}

#[test]
fn list_with_no_matches_prints_a_message() {
    let store_path = temp_path("cli-list-empty.json");
    write_store(&store_path, serde_json::json!([]));

    let output = taskdeck(&store_path)
        .args(["list"])
        .output()
        .expect("failed to run list command");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks found."));
}

#[test]
fn list_keeps_store_order() {
    let store_path = temp_path("cli-list-order.json");
    write_store(
        &store_path,
        serde_json::json!([
            { "id": "z", "title": "first in" },
            { "id": "a", "title": "second in" }
        ]),
    );

    let output = taskdeck(&store_path)
        .args(["list", "--json"])
        .output()
        .expect("failed to run list command");

    std::fs::remove_file(&store_path).ok();

    let view: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    let ids: Vec<&str> = view
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["z", "a"]);
}
