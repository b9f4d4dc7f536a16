//! Scheduling preferences and the weekday normalizer.
//!
//! Callers express allowed weekdays either as day names (`preferred_days`) or
//! as Sunday-based indices (`daysOfWeek`). Both shapes are reduced here to a
//! single [`WeekdaySet`]; when both are present the numeric shape wins and
//! the names are only consulted if the indices resolve to nothing.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::{WeekdaySet, weekday_from_index};
use crate::time::{format_time_of_day, parse_time_of_day};

pub const FALLBACK_TIME: &str = "08:00";
pub const FALLBACK_DURATION_MINUTES: u32 = 60;

const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

const CANONICAL_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MIN_ABBREVIATION_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_days: Option<Vec<String>>,
    #[serde(
        default,
        rename = "daysOfWeek",
        alias = "days_of_week",
        skip_serializing_if = "Option::is_none"
    )]
    pub days_of_week: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duration_minutes: Option<u32>,
}

/// Preferences with every default made explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPreferences {
    pub allowed: WeekdaySet,
    pub default_time: NaiveTime,
    pub default_duration_minutes: u32,
    /// `false` when the duration is the fixed fallback, letting sessions keep
    /// a duration they already carry.
    pub explicit_duration: bool,
}

impl Default for ResolvedPreferences {
    fn default() -> Self {
        Self {
            allowed: WeekdaySet::all(),
            default_time: fallback_time(),
            default_duration_minutes: FALLBACK_DURATION_MINUTES,
            explicit_duration: false,
        }
    }
}

impl ResolvedPreferences {
    /// Duration for a session given the one it may already carry.
    pub fn duration_for(&self, existing: Option<u32>) -> u32 {
        if self.explicit_duration {
            return self.default_duration_minutes;
        }
        existing
            .filter(|minutes| *minutes > 0)
            .unwrap_or(self.default_duration_minutes)
    }

    /// The preferences actually applied, in the persisted shape.
    pub fn applied(&self) -> SchedulingPreferences {
        let indices = self.allowed.to_vec();
        SchedulingPreferences {
            preferred_days: Some(
                indices
                    .iter()
                    .map(|idx| CANONICAL_NAMES[*idx as usize].to_string())
                    .collect(),
            ),
            days_of_week: Some(indices.iter().map(|idx| i64::from(*idx)).collect()),
            default_time: Some(format_time_of_day(self.default_time)),
            default_duration_minutes: Some(self.default_duration_minutes),
        }
    }
}

impl SchedulingPreferences {
    pub fn from_days_of_week<I>(days: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self {
            days_of_week: Some(days.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn from_day_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_days: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_default_time(mut self, time: impl Into<String>) -> Self {
        self.default_time = Some(time.into());
        self
    }

    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        self.default_duration_minutes = Some(minutes);
        self
    }

    pub fn resolve(&self) -> ResolvedPreferences {
        normalize_preferences(Some(self))
    }
}

/// Resolve caller preferences, never failing.
///
/// Missing or unusable pieces fall back to every weekday, `08:00`, and 60
/// minutes respectively.
pub fn normalize_preferences(preferences: Option<&SchedulingPreferences>) -> ResolvedPreferences {
    let Some(prefs) = preferences else {
        return ResolvedPreferences::default();
    };

    let numeric = prefs.days_of_week.as_deref().map(weekdays_from_indices);
    let named = prefs.preferred_days.as_deref().map(weekdays_from_names);

    let allowed = match (numeric, named) {
        (Some(numeric), Some(named)) if !numeric.is_empty() => {
            if numeric != named && !named.is_empty() {
                warn!(
                    days_of_week = %numeric,
                    preferred_days = %named,
                    "both weekday shapes supplied and they disagree; using daysOfWeek"
                );
            }
            numeric
        }
        (Some(numeric), _) if !numeric.is_empty() => numeric,
        (_, Some(named)) if !named.is_empty() => named,
        _ => WeekdaySet::all(),
    };

    let default_time = match prefs.default_time.as_deref() {
        Some(raw) => parse_time_of_day(raw).unwrap_or_else(|| {
            warn!(default_time = raw, "unparseable default_time; using {FALLBACK_TIME}");
            fallback_time()
        }),
        None => fallback_time(),
    };

    let (default_duration_minutes, explicit_duration) = match prefs.default_duration_minutes {
        Some(minutes) if minutes > 0 => (minutes, true),
        _ => (FALLBACK_DURATION_MINUTES, false),
    };

    ResolvedPreferences {
        allowed,
        default_time,
        default_duration_minutes,
        explicit_duration,
    }
}

/// Match a weekday name or abbreviation, case-insensitively.
///
/// Full names and prefixes of at least three letters are accepted, so
/// `"Tue"`, `"tues"` and `"TUESDAY"` all resolve to 2.
pub fn parse_weekday_name(input: &str) -> Option<u8> {
    let needle = input.trim().trim_end_matches('.').to_ascii_lowercase();
    if needle.len() < MIN_ABBREVIATION_LEN {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .position(|name| name.starts_with(needle.as_str()))
        .map(|idx| idx as u8)
}

pub fn canonical_weekday_name(index: u8) -> &'static str {
    CANONICAL_NAMES[weekday_from_index(index).num_days_from_sunday() as usize]
}

fn weekdays_from_indices(indices: &[i64]) -> WeekdaySet {
    let mut set = WeekdaySet::empty();
    for &raw in indices {
        match u8::try_from(raw) {
            Ok(idx) if idx <= 6 => {
                set.insert(idx);
            }
            _ => warn!(index = raw, "ignoring weekday index outside 0..=6"),
        }
    }
    set
}

fn weekdays_from_names(names: &[String]) -> WeekdaySet {
    let mut set = WeekdaySet::empty();
    for name in names {
        match parse_weekday_name(name) {
            Some(idx) => {
                set.insert(idx);
            }
            None => warn!(day = name.as_str(), "ignoring unknown weekday name"),
        }
    }
    set
}

fn fallback_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}
