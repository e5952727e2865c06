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

use nordspot_types::{PriceOrigin, PricePoint, Statistics, TaxPolicy};

/// Linearly interpolated percentile of an ascending slice
///
/// `p` is in percent. Returns `None` for an empty slice.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "index is within 0..len"
)]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let index = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    let weight = index - index.floor();

    if upper >= sorted.len() {
        return sorted.get(lower).copied();
    }

    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Summary statistics over the published prices of `series`
///
/// Predicted points are ignored. Values are taxed display prices.
pub fn compute_statistics(series: &[PricePoint], tax: TaxPolicy) -> Option<Statistics> {
    let mut values: Vec<f64> = series
        .iter()
        .filter_map(|point| match point.origin {
            PriceOrigin::Actual => Some(tax.price(point.display_price)),
            PriceOrigin::Predicted => None,
        })
        .collect();

    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);

    #[expect(clippy::cast_precision_loss, reason = "series length is small")]
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Some(Statistics {
        min: values[0],
        max: values[values.len() - 1],
        mean,
        median: percentile(&values, 50.0)?,
        p75: percentile(&values, 75.0)?,
        p90: percentile(&values, 90.0)?,
        p95: percentile(&values, 95.0)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn hour(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    #[test]
    fn test_percentile_interpolates() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();

        assert!(approx_eq(percentile(&values, 50.0).unwrap(), 5.5));
        assert!(approx_eq(percentile(&values, 75.0).unwrap(), 7.75));
        assert!(approx_eq(percentile(&values, 0.0).unwrap(), 1.0));
        assert!(approx_eq(percentile(&values, 100.0).unwrap(), 10.0));
    }

    #[test]
    fn test_percentile_edge_cases() {
        assert_eq!(percentile(&[], 50.0), None);
        assert!(approx_eq(percentile(&[4.2], 95.0).unwrap(), 4.2));
    }

    #[test]
    fn test_statistics_ignore_predictions() {
        let series = vec![
            PricePoint::actual(hour(0), 100.0),
            PricePoint::actual(hour(1), 200.0),
            PricePoint::actual(hour(2), 300.0),
            PricePoint::predicted(hour(3), 9000.0),
            PricePoint::predicted(hour(4), -500.0),
        ];

        let stats = compute_statistics(&series, TaxPolicy::excluded()).unwrap();
        assert!(approx_eq(stats.mean, 20.0));
        assert!(approx_eq(stats.min, 10.0));
        assert!(approx_eq(stats.max, 30.0));
        assert!(approx_eq(stats.median, 20.0));
    }

    #[test]
    fn test_statistics_apply_tax() {
        let series = vec![
            PricePoint::actual(hour(0), 100.0),
            PricePoint::actual(hour(1), 200.0),
        ];

        let stats = compute_statistics(&series, TaxPolicy::included()).unwrap();
        assert!(approx_eq(stats.min, 12.2));
        assert!(approx_eq(stats.max, 24.4));
        assert!(approx_eq(stats.mean, 18.3));
    }

    #[test]
    fn test_statistics_unsorted_input() {
        let series: Vec<_> = [30.0, -10.0, 20.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, &raw)| PricePoint::actual(hour(i as i64), raw))
            .collect();

        let stats = compute_statistics(&series, TaxPolicy::excluded()).unwrap();
        assert!(approx_eq(stats.min, -1.0));
        assert!(approx_eq(stats.max, 3.0));
        assert!(approx_eq(stats.median, 1.0));
        assert!(stats.p75 <= stats.p90 && stats.p90 <= stats.p95 && stats.p95 <= stats.max);
    }

    #[test]
    fn test_statistics_without_actual_points() {
        assert_eq!(compute_statistics(&[], TaxPolicy::default()), None);

        let only_predicted = vec![PricePoint::predicted(hour(0), 50.0)];
        assert_eq!(compute_statistics(&only_predicted, TaxPolicy::default()), None);
    }
}
