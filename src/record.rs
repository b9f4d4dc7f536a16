use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::preferences::SchedulingPreferences;
use crate::program::Program;
use crate::schedule::ScheduleOutcome;

/// What a request handler loads, hands to the engine, and saves back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub program: Program,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_preferences: Option<SchedulingPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scheduled_at: Option<DateTime<Utc>>,
}

impl ProgramRecord {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            ..Self::default()
        }
    }

    /// Store the result of a full regeneration.
    ///
    /// `scheduled_at` comes from the caller; the engine never reads the clock.
    pub fn apply_schedule(
        &mut self,
        outcome: ScheduleOutcome,
        start_date: NaiveDate,
        scheduled_at: DateTime<Utc>,
    ) {
        self.program = outcome.updated;
        self.start_date = Some(start_date);
        self.scheduling_preferences = Some(outcome.applied_preferences);
        self.last_scheduled_at = Some(scheduled_at);
    }

    /// Store a partial update; preferences and timestamps are kept.
    pub fn replace_program(&mut self, program: Program) {
        self.program = program;
    }
}
