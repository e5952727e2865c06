// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of NordSpot.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Hour alignment and market-local calendar arithmetic

use chrono::{DateTime, Duration, DurationRound, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Start of the clock hour containing `instant`
pub fn floor_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.duration_trunc(Duration::hours(1)).unwrap_or(instant)
}

pub fn same_hour(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    floor_to_hour(a) == floor_to_hour(b)
}

/// Resolve a wall-clock time in `tz` to an instant
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
/// skipped by a DST jump resolve one hour later.
pub fn local_to_utc(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Local midnight starting `date`
pub fn start_of_local_day(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date.and_time(NaiveTime::MIN))
}

/// Last millisecond of `date` (23:59:59.999 local)
pub fn end_of_local_day(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    start_of_local_day(tz, date + Duration::days(1)) - Duration::milliseconds(1)
}

/// Resolve a time-of-day deadline to the next matching instant
///
/// The deadline applies to today in the market time zone unless that instant
/// is at or before the start of the current hour, in which case it applies
/// to tomorrow.
pub fn resolve_deadline(deadline: NaiveTime, now: DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let hour_start = floor_to_hour(now.with_timezone(&Utc));
    let today = now.date_naive();

    let candidate = local_to_utc(tz, today.and_time(deadline));
    if candidate <= hour_start {
        local_to_utc(tz, (today + Duration::days(1)).and_time(deadline))
    } else {
        candidate
    }
}

/// Format an instant the way the price API expects (`2025-01-01T00:00:00.000Z`)
///
/// Range ends on a whole second are pushed to `.999Z` so the final hour is
/// included by the upstream filter.
pub fn format_api_instant(instant: DateTime<Utc>, is_end: bool) -> String {
    let instant = if is_end && instant.timestamp_subsec_millis() == 0 {
        instant + Duration::milliseconds(999)
    } else {
        instant
    };
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Tallinn;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_floor_to_hour() {
        let instant = utc(2025, 6, 1, 14, 37) + Duration::seconds(12) + Duration::milliseconds(5);
        assert_eq!(floor_to_hour(instant), utc(2025, 6, 1, 14, 0));
        assert_eq!(floor_to_hour(utc(2025, 6, 1, 14, 0)), utc(2025, 6, 1, 14, 0));
    }

    #[test]
    fn test_same_hour() {
        assert!(same_hour(utc(2025, 6, 1, 14, 0), utc(2025, 6, 1, 14, 59)));
        assert!(!same_hour(utc(2025, 6, 1, 14, 59), utc(2025, 6, 1, 15, 0)));
    }

    #[test]
    fn test_format_api_instant() {
        let start = utc(2025, 1, 1, 0, 0);
        assert_eq!(format_api_instant(start, false), "2025-01-01T00:00:00.000Z");
        assert_eq!(format_api_instant(start, true), "2025-01-01T00:00:00.999Z");

        let end = utc(2025, 1, 1, 21, 59) + Duration::seconds(59) + Duration::milliseconds(999);
        assert_eq!(format_api_instant(end, true), "2025-01-01T21:59:59.999Z");
    }

    #[test]
    fn test_local_day_bounds() {
        // Tallinn is UTC+2 in winter
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(start_of_local_day(Tallinn, date), utc(2025, 1, 14, 22, 0));
        assert_eq!(
            end_of_local_day(Tallinn, date),
            utc(2025, 1, 15, 21, 59) + Duration::seconds(59) + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_local_to_utc_in_dst_gap() {
        // 2025-03-30 03:30 does not exist in Tallinn (03:00 -> 04:00)
        let naive = NaiveDate::from_ymd_opt(2025, 3, 30)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap();
        assert_eq!(local_to_utc(Tallinn, naive), utc(2025, 3, 30, 1, 30));
    }

    #[test]
    fn test_resolve_deadline_later_today() {
        let now = utc(2025, 1, 15, 8, 20).with_timezone(&Tallinn); // 10:20 local
        let deadline = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        assert_eq!(resolve_deadline(deadline, now), utc(2025, 1, 15, 16, 0));
    }

    #[test]
    fn test_resolve_deadline_rolls_to_tomorrow() {
        let now = utc(2025, 1, 15, 8, 20).with_timezone(&Tallinn); // 10:20 local
        let deadline = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert_eq!(resolve_deadline(deadline, now), utc(2025, 1, 16, 5, 0));
    }

    #[test]
    fn test_resolve_deadline_at_current_hour_start() {
        // 10:00 local deadline at 10:20 local is not in the future
        let now = utc(2025, 1, 15, 8, 20).with_timezone(&Tallinn);
        let deadline = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(resolve_deadline(deadline, now), utc(2025, 1, 16, 8, 0));

        // 10:30 local is still ahead of the hour start
        let deadline = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(resolve_deadline(deadline, now), utc(2025, 1, 15, 8, 30));
    }
}
