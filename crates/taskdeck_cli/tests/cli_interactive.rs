use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
}

fn run_script(store_path: &PathBuf, script: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_taskdeck"))
        .env("TASKDECK_STORE_PATH", store_path)
        .env("TASKDECK_CONFIG_PATH", store_path.with_extension("config.json"))
        .env(
            "TASKDECK_SESSION_PATH",
            store_path.with_extension("session.json"),
        )
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    child
        .stdin
        .as_mut()
        .expect("stdin not piped")
        .write_all(script.as_bytes())
        .expect("failed to write script");

    child
        .wait_with_output()
        .expect("failed to wait for interactive session")
}

#[test]
fn interactive_session_keeps_state_between_commands() {
    let store_path = temp_path("cli-interactive.json");

    let output = run_script(
        &store_path,
        "add \"Tarea 1\" --start 2025-12-13\nlist --json\nexit\n",
    );

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Tarea 1"));

    let view_line = stdout
        .lines()
        .find(|line| line.starts_with('['))
        .expect("list output missing");
    let view: serde_json::Value = serde_json::from_str(view_line).unwrap();
    let view = view.as_array().unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0]["title"], "Tarea 1");
}

#[test]
fn interactive_session_survives_command_errors() {
    let store_path = temp_path("cli-interactive-errors.json");

    let output = run_script(&store_path, "done task-missing\nadd \"Tarea 1\"\nexit\n");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Tarea 1"));
}

#[test]
fn interactive_session_rejects_unterminated_quotes() {
    let store_path = temp_path("cli-interactive-quotes.json");

    let output = run_script(&store_path, "add \"Tarea 1\nexit\n");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unterminated quote"));
}

#[test]
fn interactive_session_ends_on_eof() {
    let store_path = temp_path("cli-interactive-eof.json");

    let output = run_script(&store_path, "stats\n");

    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 0"));
}
