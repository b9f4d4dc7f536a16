use chrono::NaiveDateTime;
use serde_json::json;
use workout_schedule::{
    Program, Session, Week, schedule_program, shift_program_schedule, update_session_duration,
    update_session_start,
};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

fn single_session_program() -> Program {
    serde_json::from_value(json!({
        "weeks": [{
            "week": 1,
            "sessions": [{
                "session": 1,
                "uid": "w1s1",
                "goal": "Strength",
                "start_at": "2025-01-02T08:00",
                "duration_minutes": 60
            }]
        }]
    }))
    .unwrap()
}

fn scheduled_program() -> Program {
    let program = Program::new(vec![
        Week::new(1, vec![Session::new(1, "A"), Session::new(2, "B")]),
        Week::new(2, vec![Session::new(1, "C"), Session::new(2, "D")]),
    ]);
    schedule_program(&program, "2025-01-06", None).unwrap().updated
}

#[test]
fn resize_changes_only_the_duration() {
    let program = single_session_program();
    let update = update_session_duration(&program, "w1s1", 75);
    assert_eq!(update.updated_count, 1);
    assert!(update.found());

    let session = &update.updated.weeks[0].sessions[0];
    assert_eq!(session.duration_minutes, Some(75));
    assert_eq!(session.start_at, Some(at("2025-01-02T08:00")));
    assert_eq!(session.goal, "Strength");
    assert_eq!(program.weeks[0].sessions[0].duration_minutes, Some(60));
}

#[test]
fn move_changes_only_the_start() {
    let program = single_session_program();
    let update = update_session_start(&program, "w1s1", at("2025-01-03T10:30"));
    assert_eq!(update.updated_count, 1);

    let session = &update.updated.weeks[0].sessions[0];
    assert_eq!(session.start_at, Some(at("2025-01-03T10:30")));
    assert_eq!(session.duration_minutes, Some(60));
}

#[test]
fn move_drops_seconds() {
    let program = single_session_program();
    let with_seconds =
        NaiveDateTime::parse_from_str("2025-01-03T10:30:45", "%Y-%m-%dT%H:%M:%S").unwrap();
    let update = update_session_start(&program, "w1s1", with_seconds);
    assert_eq!(
        update.updated.weeks[0].sessions[0].start_at,
        Some(at("2025-01-03T10:30"))
    );
}

#[test]
fn shift_by_days_moves_the_session() {
    let program = single_session_program();
    let outcome = shift_program_schedule(&program, 2, 0).unwrap();
    assert_eq!(outcome.shifted_count, 1);
    assert_eq!(
        outcome.updated.weeks[0].sessions[0].start_at,
        Some(at("2025-01-04T08:00"))
    );
    assert_eq!(outcome.updated.weeks[0].sessions[0].duration_minutes, Some(60));
}

#[test]
fn unknown_uid_leaves_program_unchanged() {
    let program = single_session_program();
    let update = update_session_duration(&program, "missing", 30);
    assert_eq!(update.updated_count, 0);
    assert!(!update.found());
    assert_eq!(update.updated, program);

    let update = update_session_start(&program, "", at("2025-01-03T10:30"));
    assert_eq!(update.updated_count, 0);
    assert_eq!(update.updated, program);
}

#[test]
fn only_first_matching_uid_is_updated() {
    let program = Program::new(vec![
        Week::new(1, vec![Session::new(1, "A").with_uid("dup")]),
        Week::new(2, vec![Session::new(1, "B").with_uid("dup")]),
    ]);
    let update = update_session_duration(&program, "dup", 45);
    assert_eq!(update.updated_count, 1);
    assert_eq!(update.updated.weeks[0].sessions[0].duration_minutes, Some(45));
    assert_eq!(update.updated.weeks[1].sessions[0].duration_minutes, None);
}

#[test]
fn shift_crosses_midnight_with_minutes() {
    let program: Program = serde_json::from_value(json!({
        "weeks": [{ "week": 1, "sessions": [
            { "session": 1, "uid": "late", "start_at": "2025-01-31T23:30" }
        ]}]
    }))
    .unwrap();
    let outcome = shift_program_schedule(&program, 0, 45).unwrap();
    assert_eq!(
        outcome.updated.weeks[0].sessions[0].start_at,
        Some(at("2025-02-01T00:15"))
    );
}

#[test]
fn zero_shift_is_identity() {
    let program = scheduled_program();
    let outcome = shift_program_schedule(&program, 0, 0).unwrap();
    assert_eq!(outcome.updated, program);
    assert_eq!(outcome.shifted_count, 4);
}

#[test]
fn shifts_compose_additively() {
    let program = scheduled_program();
    let stepwise = shift_program_schedule(&program, 3, 15).unwrap();
    let stepwise = shift_program_schedule(&stepwise.updated, -1, 50).unwrap();
    let combined = shift_program_schedule(&program, 2, 65).unwrap();
    assert_eq!(stepwise.updated, combined.updated);

    let back = shift_program_schedule(&combined.updated, -2, -65).unwrap();
    assert_eq!(back.updated, program);
}

#[test]
fn shift_preserves_gaps_between_sessions() {
    let program = scheduled_program();
    let shifted = shift_program_schedule(&program, 7, -30).unwrap().updated;
    let before = program.start_times();
    let after = shifted.start_times();
    let gaps = |times: &[NaiveDateTime]| -> Vec<i64> {
        times
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_minutes())
            .collect()
    };
    assert_eq!(gaps(&before), gaps(&after));
    assert_eq!(after[0], at("2025-01-13T07:30"));
}

#[test]
fn shift_skips_unscheduled_sessions() {
    let mut program = scheduled_program();
    program.weeks[1].sessions[1].start_at = None;
    let outcome = shift_program_schedule(&program, 1, 0).unwrap();
    assert_eq!(outcome.shifted_count, 3);
    assert_eq!(outcome.updated.weeks[1].sessions[1].start_at, None);
}

#[test]
fn shift_out_of_range_is_an_error() {
    let program = single_session_program();
    assert!(shift_program_schedule(&program, i64::MAX, 0).is_err());
    assert!(shift_program_schedule(&program, 400_000_000, 0).is_err());
}

#[test]
fn updates_do_not_touch_other_sessions() {
    let program = scheduled_program();
    let update = update_session_start(&program, "w2s1", at("2025-03-01T06:00"));
    assert_eq!(update.updated_count, 1);
    for (before, after) in program.sessions().zip(update.updated.sessions()) {
        if before.1.uid == "w2s1" {
            assert_eq!(after.1.start_at, Some(at("2025-03-01T06:00")));
        } else {
            assert_eq!(before.1, after.1);
        }
    }
}

#[test]
fn resize_does_not_touch_other_sessions() {
    let program = scheduled_program();
    let update = update_session_duration(&program, "w1s2", 75);
    assert_eq!(update.updated_count, 1);
    for ((_, before), (_, after)) in program.sessions().zip(update.updated.sessions()) {
        if before.uid == "w1s2" {
            assert_eq!(after.duration_minutes, Some(75));
            assert_eq!(after.start_at, before.start_at);
            assert_eq!(after.goal, before.goal);
        } else {
            assert_eq!(before, after);
        }
    }
}

#[test]
fn move_with_unknown_uid_leaves_program_unchanged() {
    let program = scheduled_program();
    let update = update_session_start(&program, "missing", at("2025-03-01T06:00"));
    assert_eq!(update.updated_count, 0);
    assert!(!update.found());
    assert_eq!(update.updated, program);
}
