use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::program::Program;

pub const DEFAULT_MIN_DURATION_MINUTES: u32 = 10;
pub const DEFAULT_MAX_DURATION_MINUTES: u32 = 240;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("week number must be at least 1 (got {week})")]
    InvalidWeekNumber { week: u32 },
    #[error("week {week} has session number 0")]
    InvalidSessionNumber { week: u32 },
    #[error("duplicate session uid '{uid}'")]
    DuplicateUid { uid: String },
    #[error("session {uid} has a zero duration")]
    ZeroDuration { uid: String },
    #[error("duration {minutes} minutes is outside the allowed range {min}..={max}")]
    DurationOutOfRange { minutes: u32, min: u32, max: u32 },
    #[error("{0}")]
    Message(String),
}

/// Domain limits applied at the request boundary, never inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            min_duration_minutes: DEFAULT_MIN_DURATION_MINUTES,
            max_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
        }
    }
}

impl SessionPolicy {
    pub fn new(min_duration_minutes: u32, max_duration_minutes: u32) -> Result<Self, ValidationError> {
        if min_duration_minutes == 0 || min_duration_minutes > max_duration_minutes {
            return Err(ValidationError::Message(format!(
                "invalid duration policy {min_duration_minutes}..={max_duration_minutes}"
            )));
        }
        Ok(Self {
            min_duration_minutes,
            max_duration_minutes,
        })
    }

    pub fn validate_duration(&self, minutes: u32) -> Result<(), ValidationError> {
        if minutes < self.min_duration_minutes || minutes > self.max_duration_minutes {
            return Err(ValidationError::DurationOutOfRange {
                minutes,
                min: self.min_duration_minutes,
                max: self.max_duration_minutes,
            });
        }
        Ok(())
    }
}

/// Structural checks for a program about to be stored or scheduled.
///
/// Blank uids are tolerated since scheduling fills them in.
pub fn validate_program(program: &Program) -> Result<(), ValidationError> {
    let mut seen_uids = HashSet::with_capacity(program.session_count());
    for week in &program.weeks {
        if week.week == 0 {
            return Err(ValidationError::InvalidWeekNumber { week: week.week });
        }
        for session in &week.sessions {
            if session.session == 0 {
                return Err(ValidationError::InvalidSessionNumber { week: week.week });
            }
            let uid = session.uid.trim();
            if !uid.is_empty() && !seen_uids.insert(uid) {
                return Err(ValidationError::DuplicateUid {
                    uid: uid.to_string(),
                });
            }
            if session.duration_minutes == Some(0) {
                return Err(ValidationError::ZeroDuration {
                    uid: session.uid.clone(),
                });
            }
        }
    }
    Ok(())
}
