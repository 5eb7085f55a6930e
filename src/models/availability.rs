use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

/// Interval between two candidate start times offered to clients.
pub const SLOT_STEP_MINUTES: i64 = 30;

/// Candidate start times inside `[window_start, window_end]` such that a
/// booking of `duration_minutes` ends no later than `window_end`.
///
/// Works on minutes since midnight so a slot can never wrap into the next day.
pub fn generate_time_slots(
    window_start: NaiveTime,
    window_end: NaiveTime,
    duration_minutes: i64,
    step_minutes: i64,
) -> Vec<NaiveTime> {
    if duration_minutes <= 0 || step_minutes <= 0 || window_end <= window_start {
        return Vec::new();
    }

    let start = minutes_of_day(window_start);
    let end = minutes_of_day(window_end);
    let midnight = NaiveTime::MIN;

    let mut slots = Vec::new();
    let mut current = start;
    while current + duration_minutes <= end {
        slots.push(midnight + Duration::minutes(current));
        current += step_minutes;
    }
    slots
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    (time - NaiveTime::MIN).num_minutes()
}

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Weekday index with Sunday as 0.
pub fn day_of_week(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    i64::from(date.weekday().num_days_from_sunday())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimeSlot {
    /// Start time formatted as `HH:MM`.
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub worker_id: i64,
    pub date: NaiveDate,
    pub duration_minutes: i64,
    pub slots: Vec<TimeSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn full_day_with_half_hour_service() {
        let slots = generate_time_slots(t(9, 0), t(18, 0), 30, 30);
        assert_eq!(slots.len(), 18);
        assert_eq!(slots.first(), Some(&t(9, 0)));
        assert_eq!(slots.last(), Some(&t(17, 30)));
        assert!(!slots.contains(&t(17, 45)));
    }

    #[test]
    fn long_service_stops_early() {
        let slots = generate_time_slots(t(9, 0), t(12, 0), 90, 30);
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30)]);
    }

    #[test]
    fn minutes_carry_into_hours() {
        let slots = generate_time_slots(t(9, 45), t(11, 0), 15, 30);
        assert_eq!(slots, vec![t(9, 45), t(10, 15), t(10, 45)]);
    }

    #[test]
    fn service_longer_than_window_yields_nothing() {
        assert!(generate_time_slots(t(9, 0), t(9, 20), 30, 30).is_empty());
        assert!(generate_time_slots(t(18, 0), t(9, 0), 30, 30).is_empty());
    }

    #[test]
    fn window_ending_at_end_of_day_does_not_wrap() {
        let slots = generate_time_slots(t(22, 0), NaiveTime::from_hms_opt(23, 59, 0).unwrap(), 60, 30);
        assert_eq!(slots, vec![t(22, 0), t(22, 30)]);
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let day = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
        let at = |h, m| day.and_time(t(h, m));
        assert!(!overlaps(at(9, 0), at(9, 30), at(9, 30), at(10, 0)));
        assert!(overlaps(at(9, 0), at(10, 0), at(9, 30), at(10, 30)));
        assert!(overlaps(at(9, 15), at(9, 45), at(9, 0), at(10, 0)));
    }

    #[test]
    fn sunday_is_day_zero() {
        // 2030-01-06 is a Sunday
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2030, 1, 6).unwrap()), 0);
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()), 1);
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2030, 1, 12).unwrap()), 6);
    }
}
