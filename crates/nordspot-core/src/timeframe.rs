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

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time::{end_of_local_day, floor_to_hour, start_of_local_day};

/// Named date range shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Last 24 hours through the end of the day after tomorrow
    #[default]
    Dashboard,
    Today,
    Tomorrow,
    /// Last 7 days through the end of today
    #[serde(rename = "week")]
    LastWeek,
}

impl Timeframe {
    /// Inclusive UTC bounds of the timeframe relative to `now`
    ///
    /// Calendar days are taken in the time zone of `now`.
    pub fn range(self, now: DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);

        match self {
            Self::Dashboard => (
                floor_to_hour(now_utc - Duration::hours(24)),
                end_of_local_day(tz, today + Duration::days(2)),
            ),
            Self::Today => (start_of_local_day(tz, today), end_of_local_day(tz, today)),
            Self::Tomorrow => {
                let tomorrow = today + Duration::days(1);
                (
                    start_of_local_day(tz, tomorrow),
                    end_of_local_day(tz, tomorrow),
                )
            }
            Self::LastWeek => (
                floor_to_hour(now_utc - Duration::days(7)),
                end_of_local_day(tz, today),
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::LastWeek => "week",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "week" | "lastweek" | "last-week" => Ok(Self::LastWeek),
            other => Err(format!(
                "unknown timeframe '{other}' (expected dashboard, today, tomorrow or week)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Tallinn;

    fn end_ms(instant: DateTime<Utc>) -> DateTime<Utc> {
        instant - Duration::milliseconds(1)
    }

    /// 2025-01-15 14:37 local (UTC+2)
    fn now() -> DateTime<Tz> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 37, 0)
            .unwrap()
            .with_timezone(&Tallinn)
    }

    #[test]
    fn test_dashboard_range() {
        let (start, end) = Timeframe::Dashboard.range(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap());
        // 2025-01-17 23:59:59.999 local
        assert_eq!(end, end_ms(Utc.with_ymd_and_hms(2025, 1, 17, 22, 0, 0).unwrap()));
    }

    #[test]
    fn test_today_and_tomorrow_ranges() {
        let (start, end) = Timeframe::Today.range(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 14, 22, 0, 0).unwrap());
        assert_eq!(end, end_ms(Utc.with_ymd_and_hms(2025, 1, 15, 22, 0, 0).unwrap()));

        let (start, end) = Timeframe::Tomorrow.range(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 15, 22, 0, 0).unwrap());
        assert_eq!(end, end_ms(Utc.with_ymd_and_hms(2025, 1, 16, 22, 0, 0).unwrap()));
    }

    #[test]
    fn test_last_week_range() {
        let (start, end) = Timeframe::LastWeek.range(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap());
        assert_eq!(end, end_ms(Utc.with_ymd_and_hms(2025, 1, 15, 22, 0, 0).unwrap()));
    }

    #[test]
    fn test_tomorrow_across_dst_change() {
        // Clocks move forward on 2025-03-30, so that day has 23 hours
        let now = Utc.with_ymd_and_hms(2025, 3, 29, 10, 0, 0)
            .unwrap()
            .with_timezone(&Tallinn);
        let (start, end) = Timeframe::Tomorrow.range(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 29, 22, 0, 0).unwrap());
        assert_eq!(end, end_ms(Utc.with_ymd_and_hms(2025, 3, 30, 21, 0, 0).unwrap()));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("today".parse::<Timeframe>(), Ok(Timeframe::Today));
        assert_eq!(" Week ".parse::<Timeframe>(), Ok(Timeframe::LastWeek));
        assert_eq!("dashboard".parse::<Timeframe>(), Ok(Timeframe::Dashboard));
        assert!("month".parse::<Timeframe>().is_err());

        for timeframe in [
            Timeframe::Dashboard,
            Timeframe::Today,
            Timeframe::Tomorrow,
            Timeframe::LastWeek,
        ] {
            assert_eq!(timeframe.to_string().parse::<Timeframe>(), Ok(timeframe));
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Timeframe::LastWeek).unwrap();
        assert_eq!(json, r#""week""#);
        let parsed: Timeframe = serde_json::from_str(r#""tomorrow""#).unwrap();
        assert_eq!(parsed, Timeframe::Tomorrow);
    }
}
