use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A multi-week workout plan.
///
/// Fields the engine does not know about are carried in `extra` so that a
/// load, schedule, save cycle never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub weeks: Vec<Week>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Week {
    /// 1-based sequence number.
    pub week: u32,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session: u32,
    /// Stable key for single-session operations. Empty until assigned.
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(
        default,
        with = "crate::time::local_minute_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    /// Free-form rep prescription such as `"8-12"` or `"AMRAP"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Program {
    pub fn new(weeks: Vec<Week>) -> Self {
        Self {
            weeks,
            extra: Map::new(),
        }
    }

    pub fn session_count(&self) -> usize {
        self.weeks.iter().map(|w| w.sessions.len()).sum()
    }

    pub fn sessions(&self) -> impl Iterator<Item = (&Week, &Session)> {
        self.weeks
            .iter()
            .flat_map(|week| week.sessions.iter().map(move |session| (week, session)))
    }

    pub fn find_session(&self, uid: &str) -> Option<&Session> {
        self.sessions()
            .map(|(_, session)| session)
            .find(|session| session.uid == uid)
    }

    /// Positions `(week_idx, session_idx)` in (week, session) number order.
    ///
    /// The sort is stable, so duplicated numbers keep their array order.
    pub fn chronological_positions(&self) -> Vec<(usize, usize)> {
        let mut week_order: Vec<usize> = (0..self.weeks.len()).collect();
        week_order.sort_by_key(|&idx| self.weeks[idx].week);

        let mut positions = Vec::with_capacity(self.session_count());
        for week_idx in week_order {
            let sessions = &self.weeks[week_idx].sessions;
            let mut session_order: Vec<usize> = (0..sessions.len()).collect();
            session_order.sort_by_key(|&idx| sessions[idx].session);
            positions.extend(session_order.into_iter().map(|s| (week_idx, s)));
        }
        positions
    }

    /// Start times in (week, session) order, skipping unscheduled sessions.
    pub fn start_times(&self) -> Vec<NaiveDateTime> {
        self.chronological_positions()
            .into_iter()
            .filter_map(|(w, s)| self.weeks[w].sessions[s].start_at)
            .collect()
    }

    pub fn is_fully_scheduled(&self) -> bool {
        self.sessions().all(|(_, s)| s.start_at.is_some())
    }
}

impl Week {
    pub fn new(week: u32, sessions: Vec<Session>) -> Self {
        Self {
            week,
            sessions,
            extra: Map::new(),
        }
    }
}

impl Session {
    pub fn new(session: u32, goal: impl Into<String>) -> Self {
        Self {
            session,
            goal: goal.into(),
            ..Self::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.start_at.is_some()
    }
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
