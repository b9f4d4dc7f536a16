use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the scheduling engine itself.
///
/// Missing uids and malformed preferences are not errors; they are reported
/// through `updated_count` and normalizer fallbacks respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid start date '{input}' (expected YYYY-MM-DD)")]
    InvalidStartDate { input: String },
    #[error("date arithmetic left the supported calendar range near {near}")]
    DateOutOfRange { near: NaiveDate },
}

impl ScheduleError {
    pub fn invalid_start_date(input: impl Into<String>) -> Self {
        ScheduleError::InvalidStartDate {
            input: input.into(),
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
