#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("WORKOUT_SCHEDULE_MIN_DURATION")
        .env_remove("WORKOUT_SCHEDULE_MAX_DURATION")
        .write_stdin(script.to_string())
        .assert()
}

fn program_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(
        file,
        r#"{{"weeks":[{{"week":1,"sessions":[{{"session":1,"goal":"Squat"}},{{"session":2,"goal":"Bench"}}]}},{{"week":2,"sessions":[{{"session":1,"goal":"Deadlift"}}]}}]}}"#
    )
    .expect("write program");
    file
}

fn escaped(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().replace('\\', "\\\\")
}

#[test]
fn cli_prints_banner_and_help() {
    run_cli("help\nquit\n")
        .success()
        .stdout(str_contains("Workout Schedule (CLI)"))
        .stdout(str_contains("resize <uid> <minutes>"));
}

#[test]
fn cli_imports_and_schedules_program() {
    let program = program_file();
    let script = format!(
        "import {}\nschedule 2025-01-06 mon,wed,fri 06:30\nquit\n",
        escaped(&program)
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Program imported from"))
        .stdout(str_contains(
            "Scheduled: sessions=3, scheduled=3, first=2025-01-06T06:30, last=2025-01-10T06:30",
        ))
        .stdout(str_contains("w2s1"));
}

#[test]
fn cli_shift_move_and_resize() {
    let program = program_file();
    let script = format!(
        "import {}\nschedule 2025-01-06\nshift 1 30\nmove w1s2 2025-01-09T18:00\nresize w2s1 45\nsummary\nquit\n",
        escaped(&program)
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Shifted 3 sessions."))
        .stdout(str_contains("Session w1s2 starts at 2025-01-09T18:00."))
        .stdout(str_contains("Session w2s1 lasts 45 minutes."))
        .stdout(str_contains("first=2025-01-07T08:30"));
}

#[test]
fn cli_reports_unknown_sessions_and_bad_durations() {
    let program = program_file();
    let script = format!(
        "import {}\nresize nope 30\nresize w1s1 500\nquit\n",
        escaped(&program)
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Session nope not found."))
        .stdout(str_contains("Error: duration 500 minutes is outside the allowed range"));
}

#[test]
fn cli_save_and_load_csv_round_trip() {
    let program = program_file();
    let saved = NamedTempFile::new().expect("create temp file");
    let script = format!(
        "import {}\nschedule 2025-01-06 2,4\nsave csv {}\nload csv {}\nprefs\nquit\n",
        escaped(&program),
        escaped(&saved),
        escaped(&saved)
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Program saved to"), "missing save message:\n{output}");
    let after_reload = output
        .split("Program loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("2025-01-07T08:00"),
        "reloaded program should keep its schedule:\n{after_reload}"
    );
    assert!(
        after_reload.contains("Tuesday, Thursday"),
        "reloaded preferences should be listed:\n{after_reload}"
    );
}

#[test]
fn cli_rejects_invalid_start_date() {
    let program = program_file();
    let script = format!("import {}\nschedule 2025-02-30\nquit\n", escaped(&program));
    run_cli(&script)
        .success()
        .stdout(str_contains("Error: invalid start date"));
}

#[test]
fn cli_nudge_reports_unknown_session() {
    let program = program_file();
    let script = format!(
        "import {}\nschedule 2025-01-06\nnudge nope 15\nnudge w1s1 15\nquit\n",
        escaped(&program)
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Session nope not found."))
        .stdout(str_contains("Session w1s1 starts at 2025-01-06T08:15."));
}
