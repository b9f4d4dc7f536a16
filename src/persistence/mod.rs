use crate::record::ProgramRecord;
use crate::validation::{self, ValidationError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid program: {0}")]
    Validation(#[from] ValidationError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage for program records keyed by program id.
///
/// Saves replace the whole record; there is no optimistic locking, so
/// concurrent writers resolve as last-write-wins.
pub trait ProgramStore {
    fn save_record(&self, program_id: &str, record: &ProgramRecord) -> PersistenceResult<()>;
    fn load_record(&self, program_id: &str) -> PersistenceResult<Option<ProgramRecord>>;
}

pub fn validate_record(record: &ProgramRecord) -> PersistenceResult<()> {
    validation::validate_program(&record.program)?;
    Ok(())
}

pub(crate) fn validate_program_id(program_id: &str) -> PersistenceResult<()> {
    let valid = !program_id.is_empty()
        && program_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if !valid {
        return Err(PersistenceError::InvalidData(format!(
            "invalid program id '{program_id}'"
        )));
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonDirectoryStore, load_record_from_csv, load_record_from_json, save_record_to_csv,
    save_record_to_json,
};
