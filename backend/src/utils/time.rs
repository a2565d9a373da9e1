//! Wall-clock helpers and the shift resolver.
//!
//! Handlers capture `now` once per request and thread it through, so the
//! shift and shift-date of a single operation can never disagree.

use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

use crate::models::attendance::Shift;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Shift the given instant belongs to: day covers the half-open local-hour
/// interval [7, 19), night covers the rest.
pub fn shift_for(now: &DateTime<Tz>) -> Shift {
    if (7..19).contains(&now.hour()) {
        Shift::Day
    } else {
        Shift::Night
    }
}

/// Calendar date the current shift is attributed to. Before 07:00 the night
/// shift that started the previous evening is still open, so the shift date
/// is yesterday.
pub fn shift_date_for(now: &DateTime<Tz>) -> NaiveDate {
    let date = now.date_naive();
    if now.hour() < 7 {
        date.checked_sub_days(Days::new(1)).unwrap_or(date)
    } else {
        date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Lima;

    fn at_hour(hour: u32) -> DateTime<Tz> {
        Lima.with_ymd_and_hms(2024, 1, 10, hour, 30, 0).unwrap()
    }

    #[test]
    fn hours_seven_to_eighteen_are_day_shift() {
        for hour in 7..19 {
            assert_eq!(shift_for(&at_hour(hour)), Shift::Day, "hour {}", hour);
        }
    }

    #[test]
    fn remaining_hours_are_night_shift() {
        for hour in (0..7).chain(19..24) {
            assert_eq!(shift_for(&at_hour(hour)), Shift::Night, "hour {}", hour);
        }
    }

    #[test]
    fn boundaries_follow_half_open_interval() {
        let seven = Lima.with_ymd_and_hms(2024, 1, 10, 7, 0, 0).unwrap();
        assert_eq!(shift_for(&seven), Shift::Day);
        let nineteen = Lima.with_ymd_and_hms(2024, 1, 10, 19, 0, 0).unwrap();
        assert_eq!(shift_for(&nineteen), Shift::Night);
    }

    #[test]
    fn shift_date_is_previous_day_before_seven() {
        for hour in 0..7 {
            assert_eq!(
                shift_date_for(&at_hour(hour)),
                NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
                "hour {}",
                hour
            );
        }
        for hour in 7..24 {
            assert_eq!(
                shift_date_for(&at_hour(hour)),
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                "hour {}",
                hour
            );
        }
    }

    #[test]
    fn night_shift_spanning_midnight_keeps_one_shift_date() {
        // Check-in at 23:30 and a status lookup at 00:30 the next day must
        // resolve to the same (shift, shift_date) pair.
        let evening = Lima.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap();
        let after_midnight = Lima.with_ymd_and_hms(2024, 1, 11, 0, 30, 0).unwrap();

        assert_eq!(shift_for(&evening), Shift::Night);
        assert_eq!(shift_for(&after_midnight), Shift::Night);
        assert_eq!(
            shift_date_for(&evening),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert_eq!(shift_date_for(&after_midnight), shift_date_for(&evening));
    }

    #[test]
    fn shift_date_crosses_month_boundary() {
        let first_of_month = Lima.with_ymd_and_hms(2024, 2, 1, 2, 0, 0).unwrap();
        assert_eq!(
            shift_date_for(&first_of_month),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
    }

    #[test]
    fn resolution_uses_local_time_not_utc() {
        // 03:00 UTC is 22:00 the previous day in Lima: a night shift dated
        // to that previous local day.
        let utc = Utc.with_ymd_and_hms(2024, 1, 11, 3, 0, 0).unwrap();
        let local = utc.with_timezone(&Lima);
        assert_eq!(local.hour(), 22);
        assert_eq!(shift_for(&local), Shift::Night);
        assert_eq!(
            shift_date_for(&local),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
    }
}
