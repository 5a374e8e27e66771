//! Sunday–Saturday week windows anchored to "now".
//!
//! Window 1 is the current (possibly partial) week; window `i` starts
//! `7 × (i − 1)` calendar days earlier. Boundaries are local wall-clock times in
//! [`MARKET_TZ`], so consecutive windows always meet at a local midnight:
//! `end_i + 1µs == start_{i-1}`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

use super::{MARKET_TZ, resolve_local};

/// One calendar week, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    /// 1 = most recent week.
    pub index: usize,
    /// Local midnight, Sunday.
    pub start: DateTime<Tz>,
    /// Local 23:59:59.999999, Saturday.
    pub end: DateTime<Tz>,
}

impl WeekWindow {
    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        let t = instant.with_timezone(&MARKET_TZ);
        self.start <= t && t <= self.end
    }

    /// Sunday the window starts on.
    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Saturday the window ends on.
    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// `MM/DD - MM/DD`, the label used in chart titles and tables.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%m/%d"), self.end.format("%m/%d"))
    }
}

/// Offset from a window's local start to its local end.
fn week_span() -> Duration {
    Duration::days(6) + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59) + Duration::microseconds(999_999)
}

/// Compute `count` contiguous week windows, most recent first.
///
/// `now` may be in any zone; it is read in [`MARKET_TZ`]. If today is Sunday the
/// current week starts today. `count == 0` yields no windows.
pub fn week_windows<Z: TimeZone>(now: DateTime<Z>, count: usize) -> Vec<WeekWindow> {
    let local_today = now.with_timezone(&MARKET_TZ).date_naive();
    let days_since_sunday = i64::from(local_today.weekday().num_days_from_sunday());
    let last_sunday = local_today - Duration::days(days_since_sunday);

    (0..count)
        .map(|i| {
            let sunday = last_sunday - Duration::weeks(i as i64);
            let start_local = NaiveDateTime::new(sunday, NaiveTime::MIN);
            let end_local = start_local + week_span();
            WeekWindow {
                index: i + 1,
                start: resolve_local(start_local),
                end: resolve_local(end_local),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc, Weekday};

    fn chicago(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        MARKET_TZ.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn returns_count_windows_starting_on_sunday_midnight() {
        // Wednesday 2024-07-10.
        let windows = week_windows(chicago(2024, 7, 10, 15, 0), 5);
        assert_eq!(windows.len(), 5);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.index, i + 1);
            assert_eq!(w.start.weekday(), Weekday::Sun);
            assert_eq!((w.start.hour(), w.start.minute(), w.start.second()), (0, 0, 0));
            assert_eq!(w.end.weekday(), Weekday::Sat);
            assert_eq!(w.end.nanosecond(), 999_999_000);
        }
        assert_eq!(windows[0].first_day(), NaiveDate::from_ymd_opt(2024, 7, 7).unwrap());
        assert_eq!(windows[0].last_day(), NaiveDate::from_ymd_opt(2024, 7, 13).unwrap());
        assert_eq!(windows[4].first_day(), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
    }

    #[test]
    fn sunday_now_starts_the_current_week() {
        let windows = week_windows(chicago(2024, 7, 7, 0, 5), 1);
        assert_eq!(windows[0].first_day(), NaiveDate::from_ymd_opt(2024, 7, 7).unwrap());
    }

    #[test]
    fn now_is_read_in_market_time() {
        // 2024-07-07 03:00Z is still Saturday 22:00 in Chicago.
        let now = Utc.with_ymd_and_hms(2024, 7, 7, 3, 0, 0).unwrap();
        let windows = week_windows(now, 1);
        assert_eq!(windows[0].first_day(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn windows_are_contiguous_and_descending() {
        // Spans the 2024-03-10 spring-forward transition.
        let windows = week_windows(chicago(2024, 3, 20, 12, 0), 4);
        for pair in windows.windows(2) {
            let (newer, older) = (&pair[0], &pair[1]);
            assert!(older.end < newer.start);
            assert_eq!(older.end + Duration::microseconds(1), newer.start);
        }
    }

    #[test]
    fn standard_week_is_exactly_seven_days() {
        let windows = week_windows(chicago(2024, 1, 17, 12, 0), 1);
        let w = &windows[0];
        assert_eq!(w.end - w.start + Duration::microseconds(1), Duration::days(7));
    }

    #[test]
    fn dst_weeks_follow_the_wall_clock() {
        // Week of 03/10 - 03/16 loses an hour, week of 11/03 - 11/09 gains one.
        let spring = week_windows(chicago(2024, 3, 13, 12, 0), 1)[0];
        assert_eq!(spring.first_day(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(spring.end - spring.start + Duration::microseconds(1), Duration::hours(167));

        let fall = week_windows(chicago(2024, 11, 6, 12, 0), 1)[0];
        assert_eq!(fall.first_day(), NaiveDate::from_ymd_opt(2024, 11, 3).unwrap());
        assert_eq!(fall.end - fall.start + Duration::microseconds(1), Duration::hours(169));
    }

    #[test]
    fn boundary_instant_belongs_to_one_window() {
        let windows = week_windows(chicago(2024, 7, 10, 15, 0), 2);
        let older = &windows[1];
        let newer = &windows[0];
        assert!(older.contains(&older.end));
        assert!(!newer.contains(&older.end));

        let just_after = older.end + Duration::microseconds(1);
        assert!(!older.contains(&just_after));
        assert!(newer.contains(&just_after));
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(week_windows(chicago(2024, 7, 10, 15, 0), 0).is_empty());
    }

    #[test]
    fn label_uses_month_day() {
        let windows = week_windows(chicago(2024, 7, 10, 15, 0), 1);
        assert_eq!(windows[0].label(), "07/07 - 07/13");
    }
}
