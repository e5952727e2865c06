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

//! Naive seasonal forecast for hours the market has not priced yet
//!
//! The price for hour `H` is the mean of the prices at `H - 24h` and
//! `H - 168h`, whichever of the two are known. Earlier forecasts count as
//! known, so a long horizon bootstraps off its own output. With no reference
//! at all the last known value is carried forward.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use nordspot_types::{PricePoint, PriceSeries};
use tracing::debug;

/// Append predicted points for every hour after the last point, up to but
/// not including `target_end`
pub fn extend_with_prediction(series: &PriceSeries, target_end: DateTime<Utc>) -> PriceSeries {
    let Some(last) = series.last() else {
        return PriceSeries::new();
    };

    let mut known: HashMap<DateTime<Utc>, f64> =
        series.iter().map(|p| (p.timestamp, p.raw_price)).collect();
    let mut points = series.points().to_vec();

    let mut carried = last.raw_price;
    let mut hour = last.timestamp + Duration::hours(1);
    let mut generated = 0_usize;

    while hour < target_end {
        let references: Vec<f64> = [hour - Duration::days(1), hour - Duration::weeks(1)]
            .iter()
            .filter_map(|ts| known.get(ts).copied())
            .collect();

        let raw = if references.is_empty() {
            carried
        } else {
            #[expect(clippy::cast_precision_loss, reason = "at most two references")]
            let count = references.len() as f64;
            references.iter().sum::<f64>() / count
        };

        known.insert(hour, raw);
        points.push(PricePoint::predicted(hour, raw));
        carried = raw;
        generated += 1;
        hour += Duration::hours(1);
    }

    if generated > 0 {
        debug!(
            "🔮 [PREDICT] Generated {} hours after {}",
            generated, last.timestamp
        );
    }

    PriceSeries::from_unsorted(points)
}
