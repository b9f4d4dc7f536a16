pub mod calendar;
pub mod config;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod mutate;
pub mod persistence;
pub mod preferences;
pub mod program;
pub mod record;
pub mod schedule;
pub mod time;
pub mod uid;
pub mod validation;

pub use calendar::{WeekdayCalendar, WeekdaySet};
pub use config::{ConfigError, ServiceConfig};
pub use error::{ScheduleError, ScheduleResult};
pub use mutate::{
    SessionUpdate, ShiftOutcome, shift_program_schedule, update_session_duration,
    update_session_start,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteProgramStore;
pub use persistence::{
    JsonDirectoryStore, PersistenceError, ProgramStore, load_record_from_csv,
    load_record_from_json, save_record_to_csv, save_record_to_json,
};
pub use preferences::{ResolvedPreferences, SchedulingPreferences, normalize_preferences};
pub use program::{Exercise, Program, Session, Week};
pub use record::ProgramRecord;
pub use schedule::{ScheduleOutcome, ScheduleSummary, schedule_program};
pub use uid::{assign_missing_uids, ensure_uid};
pub use validation::{SessionPolicy, ValidationError, validate_program};
