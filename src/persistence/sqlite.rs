use super::{PersistenceError, PersistenceResult, ProgramStore};
use crate::preferences::SchedulingPreferences;
use crate::program::Program;
use crate::record::ProgramRecord;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::debug;

/// Program records in a single `programs` table.
///
/// Column names follow the persisted fields the request handlers touch:
/// `program_json`, `scheduling_preferences`, `last_scheduled_at`.
pub struct SqliteProgramStore {
    connection: Mutex<Connection>,
}

impl SqliteProgramStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS programs (
                program_id TEXT PRIMARY KEY,
                program_json TEXT NOT NULL,
                start_date TEXT,
                scheduling_preferences TEXT,
                last_scheduled_at TEXT
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection mutex poisoned".into()))
    }
}

impl ProgramStore for SqliteProgramStore {
    fn save_record(&self, program_id: &str, record: &ProgramRecord) -> PersistenceResult<()> {
        super::validate_program_id(program_id)?;
        super::validate_record(record)?;
        let program_json = serde_json::to_string(&record.program)?;
        let preferences_json = record
            .scheduling_preferences
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let start_date = record.start_date.map(|d| d.to_string());
        let last_scheduled_at = record.last_scheduled_at.map(|ts| ts.to_rfc3339());

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO programs (program_id, program_json, start_date, scheduling_preferences, last_scheduled_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(program_id) DO UPDATE SET
                program_json = excluded.program_json,
                start_date = excluded.start_date,
                scheduling_preferences = excluded.scheduling_preferences,
                last_scheduled_at = excluded.last_scheduled_at",
            params![
                program_id,
                program_json,
                start_date,
                preferences_json,
                last_scheduled_at
            ],
        )?;
        tx.commit()?;
        debug!(program_id, "program record saved to sqlite");
        Ok(())
    }

    fn load_record(&self, program_id: &str) -> PersistenceResult<Option<ProgramRecord>> {
        super::validate_program_id(program_id)?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT program_json, start_date, scheduling_preferences, last_scheduled_at
             FROM programs WHERE program_id = ?1",
        )?;
        let row = stmt
            .query_row(params![program_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .optional()?;

        let Some((program_json, start_date, preferences_json, last_scheduled_at)) = row else {
            return Ok(None);
        };

        let program: Program = serde_json::from_str(&program_json)?;
        let scheduling_preferences = preferences_json
            .as_deref()
            .map(serde_json::from_str::<SchedulingPreferences>)
            .transpose()?;
        let start_date = start_date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                    PersistenceError::InvalidData(format!("invalid start_date '{raw}': {e}"))
                })
            })
            .transpose()?;
        let last_scheduled_at = last_scheduled_at
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|ts| ts.with_timezone(&Utc))
                    .map_err(|e| {
                        PersistenceError::InvalidData(format!(
                            "invalid last_scheduled_at '{raw}': {e}"
                        ))
                    })
            })
            .transpose()?;

        let record = ProgramRecord {
            program,
            start_date,
            scheduling_preferences,
            last_scheduled_at,
        };
        super::validate_record(&record)?;
        Ok(Some(record))
    }
}
