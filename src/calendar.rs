use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set of weekday indices, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", from = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    const FULL: u8 = 0b0111_1111;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::FULL)
    }

    /// Indices outside 0..=6 are ignored.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut set = Self::empty();
        for idx in indices {
            set.insert(idx);
        }
        set
    }

    pub fn insert(&mut self, index: u8) -> bool {
        if index > 6 {
            return false;
        }
        let was_set = self.contains(index);
        self.0 |= 1 << index;
        !was_set
    }

    pub fn contains(&self, index: u8) -> bool {
        index <= 6 && self.0 & (1 << index) != 0
    }

    pub fn contains_weekday(&self, weekday: Weekday) -> bool {
        self.contains(weekday_index(weekday))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Ascending indices.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..7).filter(move |idx| self.contains(*idx))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl Default for WeekdaySet {
    fn default() -> Self {
        Self::all()
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.to_vec()
    }
}

impl From<Vec<u8>> for WeekdaySet {
    fn from(indices: Vec<u8>) -> Self {
        WeekdaySet::from_indices(indices)
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .iter()
            .map(|idx| weekday_from_index(idx).to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{names}")
    }
}

/// Sunday-based index used by the external preference shapes.
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

pub fn weekday_from_index(index: u8) -> Weekday {
    match index % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Walks calendar days forward, stopping only on allowed weekdays.
///
/// This is the single place where date arithmetic happens during scheduling;
/// month and year rollover are left to `NaiveDate::succ_opt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayCalendar {
    allowed: WeekdaySet,
}

impl Default for WeekdayCalendar {
    fn default() -> Self {
        Self::new(WeekdaySet::all())
    }
}

impl WeekdayCalendar {
    /// An empty set falls back to every day so the cursor always terminates.
    pub fn new(allowed: WeekdaySet) -> Self {
        let allowed = if allowed.is_empty() {
            WeekdaySet::all()
        } else {
            allowed
        };
        Self { allowed }
    }

    pub fn allowed(&self) -> WeekdaySet {
        self.allowed
    }

    /// Check if a date falls on an allowed weekday
    pub fn is_allowed(&self, date: NaiveDate) -> bool {
        self.allowed.contains_weekday(date.weekday())
    }

    /// Next allowed date at or after `anchor`, or strictly after it.
    ///
    /// Returns `None` only when the walk runs off the end of chrono's range.
    pub fn next_allowed(&self, anchor: NaiveDate, strictly_after: bool) -> Option<NaiveDate> {
        let mut current = if strictly_after {
            anchor.succ_opt()?
        } else {
            anchor
        };
        while !self.is_allowed(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Get all allowed days in a date range (inclusive)
    pub fn allowed_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_allowed(*day))
            .collect()
    }

    pub fn count_allowed_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        self.allowed_days_in_range(start, end).len()
    }
}
