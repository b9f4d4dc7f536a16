use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::WeekdayCalendar;
use crate::error::{ScheduleError, ScheduleResult};
use crate::preferences::{SchedulingPreferences, normalize_preferences};
use crate::program::Program;
use crate::time::{format_local_datetime, parse_start_date};
use crate::uid::assign_missing_uids_in_place;

/// Result of a full regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub updated: Program,
    /// Preferences with every default materialized, for persistence.
    pub applied_preferences: SchedulingPreferences,
    pub summary: ScheduleSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub session_count: usize,
    pub scheduled_count: usize,
    #[serde(
        default,
        with = "crate::time::local_minute_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_start: Option<NaiveDateTime>,
    #[serde(
        default,
        with = "crate::time::local_minute_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_start: Option<NaiveDateTime>,
}

impl ScheduleSummary {
    pub fn for_program(program: &Program) -> Self {
        let starts = program.start_times();
        Self {
            session_count: program.session_count(),
            scheduled_count: starts.len(),
            first_start: starts.iter().min().copied(),
            last_start: starts.iter().max().copied(),
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("sessions={}", self.session_count));
        parts.push(format!("scheduled={}", self.scheduled_count));
        if let Some(first) = self.first_start {
            parts.push(format!("first={}", format_local_datetime(first)));
        }
        if let Some(last) = self.last_start {
            parts.push(format!("last={}", format_local_datetime(last)));
        }
        parts.join(", ")
    }
}

/// Assign a start time and duration to every session of `program`.
///
/// Sessions are visited in (week, session) order. The first one may land on
/// `start_date` itself; every later one lands on a strictly later allowed
/// weekday, so start times are strictly increasing. Missing uids are filled
/// from session positions. The input is left untouched.
pub fn schedule_program(
    program: &Program,
    start_date: &str,
    preferences: Option<&SchedulingPreferences>,
) -> ScheduleResult<ScheduleOutcome> {
    let anchor = parse_start_date(start_date)?;
    let resolved = normalize_preferences(preferences);
    let calendar = WeekdayCalendar::new(resolved.allowed);

    let mut updated = program.clone();
    let mut cursor = anchor;
    for (idx, (week_idx, session_idx)) in program.chronological_positions().into_iter().enumerate()
    {
        let date = calendar
            .next_allowed(cursor, idx > 0)
            .ok_or(ScheduleError::DateOutOfRange { near: cursor })?;

        let session = &mut updated.weeks[week_idx].sessions[session_idx];
        session.start_at = Some(date.and_time(resolved.default_time));
        session.duration_minutes = Some(resolved.duration_for(session.duration_minutes));

        // Later sessions search strictly after this date. Advancing the cursor
        // past it as well would skip the next allowed day.
        cursor = date;
    }

    let assigned = assign_missing_uids_in_place(&mut updated);
    let summary = ScheduleSummary::for_program(&updated);
    debug!(
        start_date = %anchor,
        allowed = %resolved.allowed,
        sessions = summary.session_count,
        uids_assigned = assigned,
        "program scheduled"
    );

    Ok(ScheduleOutcome {
        updated,
        applied_preferences: resolved.applied(),
        summary,
    })
}
