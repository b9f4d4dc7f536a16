use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    PersistenceError, Program, ProgramRecord, ProgramStore, ScheduleError, ScheduleSummary,
    SchedulingPreferences, Session, SessionPolicy, ValidationError, assign_missing_uids,
    persistence, schedule_program, shift_program_schedule,
    time::{parse_local_datetime, parse_start_date},
    update_session_duration, update_session_start, validate_program,
};

type SharedStore = Arc<dyn ProgramStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    records: Arc<RwLock<HashMap<String, ProgramRecord>>>,
    store: Option<SharedStore>,
    policy: SessionPolicy,
}

impl AppState {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            store: None,
            policy,
        }
    }

    /// Write every change through to `store` and fall back to it on cache misses.
    pub fn with_store(policy: SessionPolicy, store: SharedStore) -> Self {
        Self {
            store: Some(store),
            ..Self::new(policy)
        }
    }

    fn load(
        &self,
        records: &HashMap<String, ProgramRecord>,
        program_id: &str,
    ) -> Result<Option<ProgramRecord>, ApiError> {
        if let Some(record) = records.get(program_id) {
            return Ok(Some(record.clone()));
        }
        match &self.store {
            Some(store) => Ok(store.load_record(program_id)?),
            None => Ok(None),
        }
    }

    fn save(
        &self,
        records: &mut HashMap<String, ProgramRecord>,
        program_id: &str,
        record: ProgramRecord,
    ) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_record(program_id, &record)?;
        }
        records.insert(program_id.to_string(), record);
        Ok(())
    }

    /// Load, mutate, and save one record under the write lock.
    ///
    /// Nothing is saved when `mutator` fails.
    fn update_record<F, T>(&self, program_id: &str, mutator: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut ProgramRecord) -> Result<T, ApiError>,
    {
        let mut guard = self.records.write();
        let mut record = self
            .load(&guard, program_id)?
            .ok_or_else(|| ApiError::not_found(format!("program {program_id} not found")))?;
        let result = mutator(&mut record)?;
        self.save(&mut guard, program_id, record)?;
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Validation(err) => ApiError::Invalid(err.to_string()),
            PersistenceError::InvalidData(message) => ApiError::Invalid(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProgramUpload {
    pub program: Program,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub scheduling_preferences: Option<SchedulingPreferences>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub preferences: Option<SchedulingPreferences>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub program: Program,
    #[serde(rename = "appliedPreferences")]
    pub applied_preferences: SchedulingPreferences,
    pub summary: ScheduleSummary,
    pub last_scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShiftRequest {
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub minutes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShiftResponse {
    pub program: Program,
    pub shifted_count: usize,
}

/// Either an absolute `start_at` or a relative `shift_minutes`.
#[derive(Debug, Default, Deserialize)]
pub struct SessionStartRequest {
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub shift_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionDurationRequest {
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: Session,
    pub updated_count: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/programs/:id", get(get_program).put(put_program))
        .route("/programs/:id/schedule", post(schedule))
        .route("/programs/:id/shift", post(shift))
        .route("/programs/:id/sessions/:uid/start", patch(move_session))
        .route("/programs/:id/sessions/:uid/duration", patch(resize_session))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "workout-schedule HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_program(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
) -> Result<Json<ProgramRecord>, ApiError> {
    let record = {
        let guard = state.records.read();
        state.load(&guard, &program_id)?
    };
    record
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("program {program_id} not found")))
}

async fn put_program(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Json(upload): Json<ProgramUpload>,
) -> Result<(StatusCode, Json<ProgramRecord>), ApiError> {
    persistence::validate_program_id(&program_id)?;
    let start_date = upload
        .start_date
        .as_deref()
        .map(parse_start_date)
        .transpose()?;
    let program = assign_missing_uids(&upload.program);
    validate_program(&program)?;

    let mut guard = state.records.write();
    let existing = state.load(&guard, &program_id)?;
    let status = if existing.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let previous = existing.unwrap_or_default();
    let record = ProgramRecord {
        program,
        start_date: start_date.or(previous.start_date),
        scheduling_preferences: upload
            .scheduling_preferences
            .or(previous.scheduling_preferences),
        last_scheduled_at: previous.last_scheduled_at,
    };
    state.save(&mut guard, &program_id, record.clone())?;
    info!(program_id = %program_id, sessions = record.program.session_count(), "program stored");
    Ok((status, Json(record)))
}

async fn schedule(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let response = state.update_record(&program_id, |record| {
        let start_date = request
            .start_date
            .clone()
            .or_else(|| record.start_date.map(|d| d.to_string()))
            .ok_or_else(|| ApiError::invalid("start_date is required"))?;
        let anchor = parse_start_date(&start_date)?;
        let preferences = request
            .preferences
            .clone()
            .or_else(|| record.scheduling_preferences.clone());

        let outcome = schedule_program(&record.program, &start_date, preferences.as_ref())?;
        let scheduled_at = Utc::now();
        let summary = outcome.summary.clone();
        record.apply_schedule(outcome, anchor, scheduled_at);
        Ok(ScheduleResponse {
            program: record.program.clone(),
            applied_preferences: record.scheduling_preferences.clone().unwrap_or_default(),
            summary,
            last_scheduled_at: scheduled_at,
        })
    })?;
    info!(program_id = %program_id, summary = %response.summary.to_cli_summary(), "program scheduled");
    Ok(Json(response))
}

async fn shift(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Json(request): Json<ShiftRequest>,
) -> Result<Json<ShiftResponse>, ApiError> {
    let response = state.update_record(&program_id, |record| {
        let outcome = shift_program_schedule(&record.program, request.days, request.minutes)?;
        record.replace_program(outcome.updated);
        Ok(ShiftResponse {
            program: record.program.clone(),
            shifted_count: outcome.shifted_count,
        })
    })?;
    info!(
        program_id = %program_id,
        days = request.days,
        minutes = request.minutes,
        shifted = response.shifted_count,
        "program shifted"
    );
    Ok(Json(response))
}

async fn move_session(
    State(state): State<AppState>,
    Path((program_id, uid)): Path<(String, String)>,
    Json(request): Json<SessionStartRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let response = state.update_record(&program_id, |record| {
        let new_start = match (&request.start_at, request.shift_minutes) {
            (Some(raw), None) => parse_local_datetime(raw)
                .ok_or_else(|| ApiError::invalid(format!("invalid start_at '{raw}'")))?,
            (None, Some(minutes)) => {
                let current = record
                    .program
                    .find_session(&uid)
                    .ok_or_else(|| session_not_found(&uid))?
                    .start_at
                    .ok_or_else(|| ApiError::invalid(format!("session {uid} is not scheduled")))?;
                Duration::try_minutes(minutes)
                    .and_then(|delta| current.checked_add_signed(delta))
                    .ok_or_else(|| ApiError::invalid("shift_minutes is out of range"))?
            }
            _ => {
                return Err(ApiError::invalid(
                    "exactly one of start_at or shift_minutes is required",
                ));
            }
        };

        let update = update_session_start(&record.program, &uid, new_start);
        if !update.found() {
            return Err(session_not_found(&uid));
        }
        record.replace_program(update.updated);
        session_response(record, &uid, update.updated_count)
    })?;
    Ok(Json(response))
}

async fn resize_session(
    State(state): State<AppState>,
    Path((program_id, uid)): Path<(String, String)>,
    Json(request): Json<SessionDurationRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    state.policy.validate_duration(request.duration_minutes)?;
    let response = state.update_record(&program_id, |record| {
        let update = update_session_duration(&record.program, &uid, request.duration_minutes);
        if !update.found() {
            return Err(session_not_found(&uid));
        }
        record.replace_program(update.updated);
        session_response(record, &uid, update.updated_count)
    })?;
    Ok(Json(response))
}

fn session_not_found(uid: &str) -> ApiError {
    ApiError::not_found(format!("session {uid} not found"))
}

fn session_response(
    record: &ProgramRecord,
    uid: &str,
    updated_count: usize,
) -> Result<SessionResponse, ApiError> {
    let session = record
        .program
        .find_session(uid)
        .cloned()
        .ok_or_else(|| ApiError::Internal(format!("session {uid} missing after update")))?;
    Ok(SessionResponse {
        session,
        updated_count,
    })
}
