//! Date/time utilities for rssy.
//!
//! Timestamps are stored as unix seconds. Daily jobs reason about calendar
//! days in the configured timezone.

use chrono::{DateTime, Days, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Calendar date of `now` in the given timezone.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// The calendar day before `now` in the given timezone.
pub fn yesterday(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    let today = local_date(now, tz);
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// Unix second of local midnight at the start of `date`.
///
/// When midnight is ambiguous the earlier instant is used. When midnight
/// falls in a DST gap the day starts at the end of the gap, which is midnight
/// read with the offset in effect before the transition.
fn local_midnight(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => naive
            .checked_sub_days(Days::new(1))
            .and_then(|before| tz.from_local_datetime(&before).earliest())
            .map(|dt| dt.timestamp() + 86_400)
            .unwrap_or_else(|| naive.and_utc().timestamp()),
    }
}

/// Half-open range `[start, end)` of unix seconds covering a local day.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (i64, i64) {
    let start = local_midnight(date, tz);
    let end = date
        .checked_add_days(Days::new(1))
        .map(|next| local_midnight(next, tz))
        .unwrap_or(start + 86_400);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_date_crosses_midnight() {
        // 2024-01-15 18:30 UTC is 2024-01-16 02:30 in Shanghai
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 18, 30, 0).unwrap();
        assert_eq!(
            local_date(now, chrono_tz::Asia::Shanghai),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
        assert_eq!(
            local_date(now, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_yesterday() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            yesterday(now, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_day_bounds_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let (start, end) = day_bounds(date, chrono_tz::UTC);
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap().timestamp()
        );
        assert_eq!(end - start, 86_400);
    }

    #[test]
    fn test_day_bounds_shanghai() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let (start, _) = day_bounds(date, chrono_tz::Asia::Shanghai);
        // Local midnight is 16:00 UTC on the previous day
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2024, 1, 14, 16, 0, 0)
                .unwrap()
                .timestamp()
        );
    }

    #[test]
    fn test_day_bounds_start_in_dst_gap() {
        // Santiago skips 00:00-01:00 on 2024-09-08 (-04 to -03)
        let tz = chrono_tz::America::Santiago;
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let (start, end) = day_bounds(date, tz);

        let start_utc = Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap();
        assert_eq!(start, start_utc.timestamp());
        assert_eq!(local_date(start_utc, tz), date);
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 9, 9, 3, 0, 0).unwrap().timestamp()
        );
        assert_eq!(end - start, 23 * 3_600);

        // The previous day ends where this one starts.
        let previous = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        assert_eq!(day_bounds(previous, tz).1, start);
    }
}
