use std::collections::HashMap;

use workout_schedule::config::{ADDR_ENV, DB_ENV, MAX_DURATION_ENV, MIN_DURATION_ENV};
use workout_schedule::{
    Program, ServiceConfig, Session, SessionPolicy, ValidationError, Week, validate_program,
};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn default_policy_bounds() {
    let policy = SessionPolicy::default();
    assert!(policy.validate_duration(10).is_ok());
    assert!(policy.validate_duration(240).is_ok());
    assert_eq!(
        policy.validate_duration(9),
        Err(ValidationError::DurationOutOfRange {
            minutes: 9,
            min: 10,
            max: 240
        })
    );
    assert!(policy.validate_duration(241).is_err());
}

#[test]
fn policy_rejects_inverted_bounds() {
    assert!(SessionPolicy::new(0, 10).is_err());
    assert!(SessionPolicy::new(50, 20).is_err());
    assert!(SessionPolicy::new(20, 20).is_ok());
}

#[test]
fn validate_program_catches_structural_problems() {
    let ok = Program::new(vec![Week::new(1, vec![Session::new(1, "A").with_uid("a")])]);
    assert!(validate_program(&ok).is_ok());

    let bad_week = Program::new(vec![Week::new(0, vec![])]);
    assert!(matches!(
        validate_program(&bad_week),
        Err(ValidationError::InvalidWeekNumber { week: 0 })
    ));

    let bad_session = Program::new(vec![Week::new(2, vec![Session::new(0, "A")])]);
    assert!(matches!(
        validate_program(&bad_session),
        Err(ValidationError::InvalidSessionNumber { week: 2 })
    ));

    let dup = Program::new(vec![
        Week::new(1, vec![Session::new(1, "A").with_uid("x")]),
        Week::new(2, vec![Session::new(1, "B").with_uid("x")]),
    ]);
    assert!(matches!(
        validate_program(&dup),
        Err(ValidationError::DuplicateUid { .. })
    ));

    let mut zero = Session::new(1, "A").with_uid("z");
    zero.duration_minutes = Some(0);
    let zero = Program::new(vec![Week::new(1, vec![zero])]);
    assert!(matches!(
        validate_program(&zero),
        Err(ValidationError::ZeroDuration { .. })
    ));
}

#[test]
fn blank_uids_are_not_duplicates() {
    let program = Program::new(vec![Week::new(
        1,
        vec![Session::new(1, "A"), Session::new(2, "B")],
    )]);
    assert!(validate_program(&program).is_ok());
}

#[test]
fn config_defaults() {
    let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
    assert!(config.database_path.is_none());
    assert_eq!(config.policy, SessionPolicy::default());
}

#[test]
fn config_reads_every_variable() {
    let config = ServiceConfig::from_lookup(lookup(&[
        (ADDR_ENV, "127.0.0.1:8080"),
        (DB_ENV, "/tmp/programs.db"),
        (MIN_DURATION_ENV, "15"),
        (MAX_DURATION_ENV, " 180 "),
    ]))
    .unwrap();
    assert_eq!(config.addr.port(), 8080);
    assert_eq!(
        config.database_path.as_deref(),
        Some(std::path::Path::new("/tmp/programs.db"))
    );
    assert_eq!(config.policy, SessionPolicy::new(15, 180).unwrap());
}

#[test]
fn config_treats_blank_values_as_unset() {
    let config = ServiceConfig::from_lookup(lookup(&[(DB_ENV, "  "), (ADDR_ENV, "")])).unwrap();
    assert!(config.database_path.is_none());
    assert_eq!(config.addr.port(), 3000);
}

#[test]
fn config_rejects_invalid_values() {
    let err = ServiceConfig::from_lookup(lookup(&[(ADDR_ENV, "nowhere")])).unwrap_err();
    assert!(err.to_string().contains(ADDR_ENV));

    assert!(ServiceConfig::from_lookup(lookup(&[(MIN_DURATION_ENV, "ten")])).is_err());
    assert!(
        ServiceConfig::from_lookup(lookup(&[(MIN_DURATION_ENV, "90"), (MAX_DURATION_ENV, "30")]))
            .is_err()
    );
}
