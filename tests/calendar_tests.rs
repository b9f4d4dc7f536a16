use chrono::{Datelike, NaiveDate, Weekday};
use workout_schedule::calendar::{WeekdayCalendar, WeekdaySet, weekday_from_index, weekday_index};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn mon_wed_fri() -> WeekdayCalendar {
    WeekdayCalendar::new(WeekdaySet::from_indices([1, 3, 5]))
}

#[test]
fn weekday_indices_are_sunday_based() {
    assert_eq!(weekday_index(Weekday::Sun), 0);
    assert_eq!(weekday_index(Weekday::Mon), 1);
    assert_eq!(weekday_index(Weekday::Sat), 6);
    assert_eq!(weekday_from_index(3), Weekday::Wed);
}

#[test]
fn weekday_set_ignores_out_of_range_indices() {
    let mut set = WeekdaySet::from_indices([5, 1, 9, 1]);
    assert_eq!(set.to_vec(), vec![1, 5]);
    assert!(!set.insert(7));
    assert!(!set.contains(7));
    assert_eq!(set.len(), 2);
    assert!(WeekdaySet::empty().is_empty());
    assert_eq!(WeekdaySet::all().len(), 7);
}

#[test]
fn weekday_set_serializes_as_index_list() {
    let set = WeekdaySet::from_indices([3, 1]);
    assert_eq!(serde_json::to_string(&set).unwrap(), "[1,3]");
    let parsed: WeekdaySet = serde_json::from_str("[6,0]").unwrap();
    assert_eq!(parsed.to_vec(), vec![0, 6]);
}

#[test]
fn next_allowed_may_return_anchor_when_not_strict() {
    let cal = mon_wed_fri();
    // 2025-01-06 is a Monday
    assert_eq!(cal.next_allowed(d(2025, 1, 6), false), Some(d(2025, 1, 6)));
}

#[test]
fn next_allowed_strictly_after_skips_anchor() {
    let cal = mon_wed_fri();
    assert_eq!(cal.next_allowed(d(2025, 1, 6), true), Some(d(2025, 1, 8)));
    // Friday to Monday across the weekend
    assert_eq!(cal.next_allowed(d(2025, 1, 10), true), Some(d(2025, 1, 13)));
}

#[test]
fn next_allowed_rolls_over_month_and_year() {
    let cal = WeekdayCalendar::new(WeekdaySet::from_indices([4])); // Thursdays
    // 2024-12-27 is a Friday; next Thursday is 2025-01-02
    let next = cal.next_allowed(d(2024, 12, 27), false).unwrap();
    assert_eq!(next, d(2025, 1, 2));
    assert_eq!(next.weekday(), Weekday::Thu);
}

#[test]
fn next_allowed_handles_leap_day() {
    let cal = WeekdayCalendar::default();
    assert_eq!(cal.next_allowed(d(2024, 2, 28), true), Some(d(2024, 2, 29)));
    assert_eq!(cal.next_allowed(d(2024, 2, 29), true), Some(d(2024, 3, 1)));
}

#[test]
fn empty_set_falls_back_to_every_day() {
    let cal = WeekdayCalendar::new(WeekdaySet::empty());
    assert_eq!(cal.allowed(), WeekdaySet::all());
    assert_eq!(cal.next_allowed(d(2025, 1, 4), false), Some(d(2025, 1, 4)));
}

#[test]
fn next_allowed_reports_end_of_range() {
    let cal = WeekdayCalendar::default();
    assert_eq!(cal.next_allowed(NaiveDate::MAX, true), None);
}

#[test]
fn allowed_days_in_range_and_count_match() {
    let cal = mon_wed_fri();
    let start = d(2025, 1, 6); // Mon
    let end = d(2025, 1, 19); // Sun
    let days = cal.allowed_days_in_range(start, end);
    assert_eq!(days.len(), cal.count_allowed_days(start, end));
    assert_eq!(
        days,
        vec![
            d(2025, 1, 6),
            d(2025, 1, 8),
            d(2025, 1, 10),
            d(2025, 1, 13),
            d(2025, 1, 15),
            d(2025, 1, 17)
        ]
    );
    assert!(cal.is_allowed(d(2025, 1, 8)));
    assert!(!cal.is_allowed(d(2025, 1, 9)));
}
