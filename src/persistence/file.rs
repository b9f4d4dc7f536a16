use super::{PersistenceError, PersistenceResult, ProgramStore};
use crate::program::{Exercise, Session, Week};
use crate::record::ProgramRecord;
use crate::time::{format_local_datetime, parse_local_datetime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn save_record_to_json<P: AsRef<Path>>(record: &ProgramRecord, path: P) -> PersistenceResult<()> {
    super::validate_record(record)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, record)?;
    Ok(())
}

pub fn load_record_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProgramRecord> {
    let file = File::open(path)?;
    let record: ProgramRecord = serde_json::from_reader(file)?;
    super::validate_record(&record)?;
    Ok(record)
}

/// One pretty-printed JSON file per program id.
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> PersistenceResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, program_id: &str) -> PersistenceResult<PathBuf> {
        super::validate_program_id(program_id)?;
        Ok(self.root.join(format!("{program_id}.json")))
    }
}

impl ProgramStore for JsonDirectoryStore {
    fn save_record(&self, program_id: &str, record: &ProgramRecord) -> PersistenceResult<()> {
        let path = self.path_for(program_id)?;
        save_record_to_json(record, &path)?;
        debug!(program_id, path = %path.display(), "program record saved");
        Ok(())
    }

    fn load_record(&self, program_id: &str) -> PersistenceResult<Option<ProgramRecord>> {
        let path = self.path_for(program_id)?;
        if !path.exists() {
            return Ok(None);
        }
        load_record_from_json(&path).map(Some)
    }
}

#[derive(Default, Serialize, Deserialize)]
struct SessionCsvRecord {
    week: u32,
    /// Index of the week in `program.weeks`; week numbers need not be unique.
    #[serde(default)]
    week_position: Option<usize>,
    session: u32,
    uid: String,
    goal: String,
    start_at: String,
    duration_minutes: String,
    exercises_json: String,
    #[serde(default)]
    session_extra_json: String,
    #[serde(default)]
    week_extra_json: String,
    #[serde(default)]
    record_json: String,
}

impl SessionCsvRecord {
    fn record_row(record: &ProgramRecord) -> PersistenceResult<Self> {
        // Weeks travel as their own rows; the header row keeps everything else.
        let mut header = record.clone();
        header.program.weeks.clear();
        Ok(Self {
            record_json: serde_json::to_string(&header)?,
            ..Self::default()
        })
    }

    fn is_record_row(&self) -> bool {
        !self.record_json.trim().is_empty()
    }

    fn empty_week_row(position: usize, week: &Week) -> PersistenceResult<Self> {
        Ok(Self {
            week: week.week,
            week_position: Some(position),
            week_extra_json: json_or_empty(&week.extra)?,
            ..Self::default()
        })
    }

    fn is_empty_week_row(&self) -> bool {
        self.session == 0 && self.uid.is_empty()
    }

    fn session_row(position: usize, week: &Week, session: &Session) -> PersistenceResult<Self> {
        Ok(Self {
            week: week.week,
            week_position: Some(position),
            session: session.session,
            uid: session.uid.clone(),
            goal: session.goal.clone(),
            start_at: session
                .start_at
                .map(format_local_datetime)
                .unwrap_or_default(),
            duration_minutes: session
                .duration_minutes
                .map(|m| m.to_string())
                .unwrap_or_default(),
            exercises_json: serde_json::to_string(&session.exercises)?,
            session_extra_json: json_or_empty(&session.extra)?,
            week_extra_json: json_or_empty(&week.extra)?,
            record_json: String::new(),
        })
    }

    fn into_session(self) -> PersistenceResult<Session> {
        let start_at = if self.start_at.trim().is_empty() {
            None
        } else {
            Some(parse_local_datetime(&self.start_at).ok_or_else(|| {
                PersistenceError::InvalidData(format!("invalid start_at '{}'", self.start_at))
            })?)
        };
        let duration_minutes = if self.duration_minutes.trim().is_empty() {
            None
        } else {
            Some(self.duration_minutes.trim().parse::<u32>().map_err(|e| {
                PersistenceError::InvalidData(format!(
                    "invalid duration_minutes '{}': {e}",
                    self.duration_minutes
                ))
            })?)
        };
        let exercises = if self.exercises_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Vec<Exercise>>(&self.exercises_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid exercises_json: {err}"))
            })?
        };
        Ok(Session {
            session: self.session,
            uid: self.uid,
            goal: self.goal,
            exercises,
            start_at,
            duration_minutes,
            extra: parse_extra(&self.session_extra_json, "session_extra_json")?,
        })
    }
}

/// Write one row per session, preceded by a header row holding the rest of
/// the record as JSON.
pub fn save_record_to_csv<P: AsRef<Path>>(record: &ProgramRecord, path: P) -> PersistenceResult<()> {
    super::validate_record(record)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(SessionCsvRecord::record_row(record)?)?;
    for (position, week) in record.program.weeks.iter().enumerate() {
        if week.sessions.is_empty() {
            writer.serialize(SessionCsvRecord::empty_week_row(position, week)?)?;
            continue;
        }
        for session in &week.sessions {
            writer.serialize(SessionCsvRecord::session_row(position, week, session)?)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn load_record_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ProgramRecord> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut header: Option<ProgramRecord> = None;
    let mut weeks: Vec<Week> = Vec::new();
    // Files without `week_position` fall back to grouping by week number.
    let mut week_index: HashMap<(Option<usize>, u32), usize> = HashMap::new();

    for row in reader.deserialize::<SessionCsvRecord>() {
        let row = row?;
        if row.is_record_row() {
            if header.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple record rows".into(),
                ));
            }
            header = Some(serde_json::from_str(&row.record_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid record json: {err}"))
            })?);
            continue;
        }

        let key = (row.week_position, row.week);
        let idx = match week_index.get(&key) {
            Some(idx) => *idx,
            None => {
                let mut week = Week::new(row.week, Vec::new());
                week.extra = parse_extra(&row.week_extra_json, "week_extra_json")?;
                weeks.push(week);
                week_index.insert(key, weeks.len() - 1);
                weeks.len() - 1
            }
        };
        if row.is_empty_week_row() {
            continue;
        }
        weeks[idx].sessions.push(row.into_session()?);
    }

    let mut record = header.ok_or_else(|| {
        PersistenceError::InvalidData("CSV file contained no record row".into())
    })?;
    record.program.weeks = weeks;
    super::validate_record(&record)?;
    Ok(record)
}

fn json_or_empty(map: &Map<String, Value>) -> PersistenceResult<String> {
    if map.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(map)?)
}

fn parse_extra(input: &str, column: &str) -> PersistenceResult<Map<String, Value>> {
    if input.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(input)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid {column}: {err}")))
}
