//! Partial updates of an already-scheduled program.
//!
//! Every operation returns a new [`Program`]; the input is never modified.
//! Single-session operations touch exactly one field of the first session
//! whose uid matches and nothing else.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScheduleError, ScheduleResult};
use crate::program::{Program, Session};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftOutcome {
    pub updated: Program,
    pub shifted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub updated: Program,
    /// 1 when the uid was found, 0 otherwise.
    pub updated_count: usize,
}

impl SessionUpdate {
    pub fn found(&self) -> bool {
        self.updated_count > 0
    }
}

/// Move every scheduled session by the same number of days and minutes.
///
/// Unscheduled sessions are left alone. Shifts compose additively and a zero
/// shift returns an equal program.
pub fn shift_program_schedule(
    program: &Program,
    shift_days: i64,
    shift_minutes: i64,
) -> ScheduleResult<ShiftOutcome> {
    let delta = Duration::try_days(shift_days)
        .zip(Duration::try_minutes(shift_minutes))
        .and_then(|(days, minutes)| days.checked_add(&minutes));

    let mut updated = program.clone();
    let mut shifted_count = 0;
    for session in updated.weeks.iter_mut().flat_map(|w| w.sessions.iter_mut()) {
        let Some(start) = session.start_at else {
            continue;
        };
        let shifted = delta
            .and_then(|delta| start.checked_add_signed(delta))
            .ok_or(ScheduleError::DateOutOfRange { near: start.date() })?;
        session.start_at = Some(shifted);
        shifted_count += 1;
    }

    debug!(shift_days, shift_minutes, shifted_count, "program schedule shifted");
    Ok(ShiftOutcome {
        updated,
        shifted_count,
    })
}

/// Replace the start time of the session identified by `uid`.
pub fn update_session_start(
    program: &Program,
    uid: &str,
    new_start_at: NaiveDateTime,
) -> SessionUpdate {
    let update = update_session_with(program, uid, |session| {
        session.start_at = Some(crate::time::truncate_to_minute(new_start_at));
    });
    debug!(uid, found = update.found(), "session start updated");
    update
}

/// Replace the duration of the session identified by `uid`.
///
/// No bounds are enforced here; see [`crate::validation::SessionPolicy`].
pub fn update_session_duration(
    program: &Program,
    uid: &str,
    new_duration_minutes: u32,
) -> SessionUpdate {
    let update = update_session_with(program, uid, |session| {
        session.duration_minutes = Some(new_duration_minutes);
    });
    debug!(uid, found = update.found(), "session duration updated");
    update
}

fn update_session_with<F>(program: &Program, uid: &str, mutator: F) -> SessionUpdate
where
    F: FnOnce(&mut Session),
{
    // A blank uid never identifies a session.
    let needle = if uid.trim().is_empty() { None } else { Some(uid) };
    let position = needle.and_then(|uid| {
        program.weeks.iter().enumerate().find_map(|(w, week)| {
            week.sessions
                .iter()
                .position(|session| session.uid == uid)
                .map(|s| (w, s))
        })
    });

    let Some((week_idx, session_idx)) = position else {
        return SessionUpdate {
            updated: program.clone(),
            updated_count: 0,
        };
    };

    let mut updated = program.clone();
    mutator(&mut updated.weeks[week_idx].sessions[session_idx]);
    SessionUpdate {
        updated,
        updated_count: 1,
    }
}
