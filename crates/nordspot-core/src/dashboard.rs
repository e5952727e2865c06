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

//! Assembling everything the dashboard shows in one refresh

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use nordspot_types::{
    CheapestWindow, PricePhase, PricePoint, PriceSeries, PriceTrend, Statistics, TaxPolicy,
    TrendDirection,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cheapest_window::find_cheapest_window;
use crate::fetcher::PriceFetcher;
use crate::prediction::extend_with_prediction;
use crate::statistics::compute_statistics;
use crate::time::{floor_to_hour, same_hour};
use crate::timeframe::Timeframe;

/// History needed by the predictor's one-week lookback
const PREDICTION_HISTORY_DAYS: i64 = 8;

/// Cheapest-window search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    pub hours: usize,
    /// Wall-clock time in the market time zone
    pub deadline: NaiveTime,
}

/// What the user has selected on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub timeframe: Timeframe,
    pub tax: TaxPolicy,
    /// Market time zone, used for calendar days and deadlines
    pub timezone: Tz,
    pub window: Option<WindowRequest>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            tax: TaxPolicy::default(),
            timezone: chrono_tz::Europe::Tallinn,
            window: None,
        }
    }
}

/// Result of one dashboard refresh
///
/// Missing upstream data shows up as an empty series and `None` fields. The
/// requested range is kept even when the series does not cover it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub timeframe: Timeframe,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    pub series: PriceSeries,
    pub current: Option<PricePoint>,
    pub previous: Option<PricePoint>,
    pub trend: Option<PriceTrend>,
    pub statistics: Option<Statistics>,
    pub cheapest_window: Option<CheapestWindow>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Prices for `[start, end]`, with predicted hours filling whatever part of
/// the range the market has not priced yet
///
/// For ranges reaching into the future the fetch starts early enough to
/// give the predictor a week of lookback.
pub async fn prices_with_prediction(
    fetcher: &PriceFetcher,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PriceSeries {
    let reaches_future = end > now;

    let fetch_start = if reaches_future {
        start.min(floor_to_hour(now - Duration::days(PREDICTION_HISTORY_DAYS)))
    } else {
        start
    };

    let published = fetcher.fetch_range(fetch_start, end).await;

    let combined = if reaches_future && !published.is_empty() {
        extend_with_prediction(&published, end)
    } else {
        published
    };

    combined.within(start, end)
}

/// Prices for a named timeframe relative to `now`, together with the
/// `(start, end)` range they were requested for
pub async fn prices_for_timeframe(
    fetcher: &PriceFetcher,
    timeframe: Timeframe,
    now: DateTime<Tz>,
) -> (PriceSeries, (DateTime<Utc>, DateTime<Utc>)) {
    let (start, end) = timeframe.range(now);
    debug!("📅 [DASHBOARD] {} = {} .. {}", timeframe, start, end);
    let series = prices_with_prediction(fetcher, start, end, now.with_timezone(&Utc)).await;
    (series, (start, end))
}

/// Direction and size of the change from `previous` to `current`
pub fn price_trend(current: &PricePoint, previous: &PricePoint, tax: TaxPolicy) -> PriceTrend {
    let delta = tax.price(current.display_price) - tax.price(previous.display_price);

    let direction = if delta > 0.0 {
        TrendDirection::Up
    } else if delta < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    PriceTrend {
        direction,
        difference: delta.abs(),
    }
}

/// Whether `point` lies before, in or after the clock hour of `now`
pub fn classify_point(point: &PricePoint, now: DateTime<Utc>) -> PricePhase {
    if same_hour(point.timestamp, now) {
        PricePhase::Current
    } else if point.timestamp < now {
        PricePhase::Past
    } else {
        PricePhase::Future
    }
}

/// Point immediately preceding the current price's hour in `series`
fn previous_point(series: &PriceSeries, current: &PricePoint) -> Option<PricePoint> {
    let idx = series.position_of(current.timestamp)?;
    idx.checked_sub(1).map(|prev| series.points()[prev])
}

/// Fetch and derive everything shown on the dashboard
///
/// Requests run one after another: first the price range, then the current
/// price.
pub async fn refresh_dashboard(
    fetcher: &PriceFetcher,
    settings: &DashboardSettings,
    now: DateTime<Utc>,
) -> DashboardSnapshot {
    let local_now = now.with_timezone(&settings.timezone);

    let (prices, (range_start, range_end)) =
        prices_for_timeframe(fetcher, settings.timeframe, local_now).await;
    let current = fetcher.fetch_current().await;

    let previous = current
        .as_ref()
        .and_then(|current| previous_point(&prices, current));
    let trend = current
        .as_ref()
        .zip(previous.as_ref())
        .map(|(current, previous)| price_trend(current, previous, settings.tax));

    let statistics = compute_statistics(prices.points(), settings.tax);
    let cheapest_window = settings.window.and_then(|request| {
        find_cheapest_window(
            prices.points(),
            request.hours,
            request.deadline,
            local_now,
            settings.tax,
        )
    });

    info!(
        "🔄 [DASHBOARD] Refreshed {}: {} prices ({} predicted), current {}",
        settings.timeframe,
        prices.len(),
        prices.predicted_count(),
        current.map_or_else(|| "n/a".to_owned(), |p| format!("{:.2}", settings.tax.price(p.display_price)))
    );

    DashboardSnapshot {
        timeframe: settings.timeframe,
        range_start: Some(range_start),
        range_end: Some(range_end),
        series: prices,
        current,
        previous,
        trend,
        statistics,
        cheapest_window,
        fetched_at: Some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FetchError, FetchResult};
    use crate::traits::PriceDataSource;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    /// Serves a fixed set of published prices and records requested ranges
    struct FixedSource {
        published: PriceSeries,
        current: Option<PricePoint>,
        requests: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl FixedSource {
        fn new(published: PriceSeries, current: Option<PricePoint>) -> Arc<Self> {
            Arc::new(Self {
                published,
                current,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PriceDataSource for FixedSource {
        async fn price_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> FetchResult<PriceSeries> {
            self.requests.lock().unwrap().push((start, end));
            Ok(self.published.within(start, end))
        }

        async fn current_price(&self) -> FetchResult<Option<PricePoint>> {
            Ok(self.current)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct DownSource;

    #[async_trait]
    impl PriceDataSource for DownSource {
        async fn price_range(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> FetchResult<PriceSeries> {
            Err(FetchError::Status {
                status: 502,
                message: "bad gateway".to_owned(),
            })
        }

        async fn current_price(&self) -> FetchResult<Option<PricePoint>> {
            Err(FetchError::Format("truncated".to_owned()))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn hour(h: i64) -> DateTime<Utc> {
        base() + Duration::hours(h)
    }

    /// Published prices for hours `[0, hours)`, raw price = 10 * (h % 24)
    fn published(hours: i64) -> PriceSeries {
        PriceSeries::from_unsorted(
            (0..hours)
                .map(|h| PricePoint::actual(hour(h), 10.0 * (h % 24) as f64))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_past_range_is_not_predicted() {
        let source = FixedSource::new(published(24 * 10), None);
        let fetcher = PriceFetcher::new(source.clone());

        let now = hour(24 * 10);
        let result = prices_with_prediction(&fetcher, hour(24), hour(47), now).await;

        assert_eq!(result.len(), 24);
        assert_eq!(result.predicted_count(), 0);
        assert_eq!(source.requests.lock().unwrap()[0], (hour(24), hour(47)));
    }

    #[tokio::test]
    async fn test_future_range_fetches_history_and_predicts() {
        // Published up to day 10 hour 23, now is day 10 noon
        let source = FixedSource::new(published(24 * 11), None);
        let fetcher = PriceFetcher::new(source.clone());

        let now = hour(24 * 10 + 12) + Duration::minutes(20);
        let start = hour(24 * 10);
        let end = hour(24 * 12 + 23);

        let result = prices_with_prediction(&fetcher, start, end, now).await;

        let (fetch_start, fetch_end) = source.requests.lock().unwrap()[0];
        assert_eq!(fetch_start, hour(24 * 2 + 12));
        assert_eq!(fetch_end, end);

        assert_eq!(result.first().unwrap().timestamp, start);
        assert_eq!(result.last().unwrap().timestamp, hour(24 * 12 + 22));
        assert_eq!(result.len(), 24 * 3 - 1);
        assert_eq!(result.predicted_count(), 24 * 2 - 1);

        // Daily pattern carries into the predicted days
        let predicted = result.at(hour(24 * 11 + 5)).unwrap();
        assert!(predicted.is_predicted());
        assert!(approx_eq(predicted.raw_price, 50.0));
    }

    #[tokio::test]
    async fn test_empty_upstream_stays_empty() {
        let fetcher = PriceFetcher::new(Arc::new(DownSource));
        let now = hour(12);

        let result = prices_with_prediction(&fetcher, hour(0), hour(72), now).await;
        assert!(result.is_empty());
    }

    #[test]
    fn test_price_trend() {
        let previous = PricePoint::actual(hour(0), 100.0);
        let current = PricePoint::actual(hour(1), 150.0);

        let trend = price_trend(&current, &previous, TaxPolicy::excluded());
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(approx_eq(trend.difference, 5.0));

        let trend = price_trend(&previous, &current, TaxPolicy::included());
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!(approx_eq(trend.difference, 6.1));

        let trend = price_trend(&current, &current, TaxPolicy::included());
        assert_eq!(trend.direction, TrendDirection::Flat);
        assert!(approx_eq(trend.difference, 0.0));
    }

    #[test]
    fn test_classify_point() {
        let now = hour(5) + Duration::minutes(30);

        assert_eq!(classify_point(&PricePoint::actual(hour(4), 1.0), now), PricePhase::Past);
        assert_eq!(classify_point(&PricePoint::actual(hour(5), 1.0), now), PricePhase::Current);
        assert_eq!(classify_point(&PricePoint::predicted(hour(6), 1.0), now), PricePhase::Future);
    }

    #[tokio::test]
    async fn test_refresh_dashboard_snapshot() {
        // Now is 2025-01-10 12:20 UTC (14:20 in Tallinn)
        let now = hour(24 * 9 + 12) + Duration::minutes(20);
        let current = PricePoint::actual(hour(24 * 9 + 12), 120.0);
        let source = FixedSource::new(published(24 * 10), Some(current));
        let fetcher = PriceFetcher::new(source);

        let settings = DashboardSettings {
            timeframe: Timeframe::Today,
            tax: TaxPolicy::excluded(),
            window: Some(WindowRequest {
                hours: 2,
                deadline: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            }),
            ..Default::default()
        };

        let snapshot = refresh_dashboard(&fetcher, &settings, now).await;

        assert_eq!(snapshot.fetched_at, Some(now));
        assert_eq!(snapshot.timeframe, Timeframe::Today);
        // Local day 2025-01-10 is 2025-01-09 22:00 .. 2025-01-10 21:59:59.999 UTC
        assert_eq!(snapshot.range_start, Some(hour(24 * 8 + 22)));
        assert_eq!(
            snapshot.range_end,
            Some(hour(24 * 9 + 22) - Duration::milliseconds(1))
        );
        assert_eq!(snapshot.series.len(), 24);
        assert_eq!(snapshot.series.predicted_count(), 0);

        assert_eq!(snapshot.current, Some(current));
        let previous = snapshot.previous.unwrap();
        assert_eq!(previous.timestamp, hour(24 * 9 + 11));
        let trend = snapshot.trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(approx_eq(trend.difference, 1.0));

        let stats = snapshot.statistics.unwrap();
        assert!(approx_eq(stats.min, 0.0));
        assert!(approx_eq(stats.max, 23.0));

        // Remaining local hours 14:00..23:00 map to UTC 12..20, cheapest pair is 12-13 UTC
        let window = snapshot.cheapest_window.unwrap();
        assert_eq!(window.start, hour(24 * 9 + 12));
        assert!(approx_eq(window.average_price, 12.5));
    }

    #[tokio::test]
    async fn test_refresh_dashboard_with_upstream_down() {
        let fetcher = PriceFetcher::new(Arc::new(DownSource));
        let settings = DashboardSettings {
            window: Some(WindowRequest {
                hours: 3,
                deadline: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            }),
            ..Default::default()
        };

        let snapshot = refresh_dashboard(&fetcher, &settings, hour(100)).await;

        // The requested range survives an upstream outage
        assert!(snapshot.series.is_empty());
        assert!(snapshot.range_start.is_some());
        assert!(snapshot.range_start < snapshot.range_end);
        assert_eq!(snapshot.current, None);
        assert_eq!(snapshot.previous, None);
        assert_eq!(snapshot.trend, None);
        assert_eq!(snapshot.statistics, None);
        assert_eq!(snapshot.cheapest_window, None);
    }

    #[tokio::test]
    async fn test_previous_missing_when_current_is_first() {
        let current = PricePoint::actual(hour(0), 10.0);
        let source = FixedSource::new(published(1), Some(current));
        let fetcher = PriceFetcher::new(source);

        let settings = DashboardSettings {
            timeframe: Timeframe::LastWeek,
            ..Default::default()
        };
        let snapshot = refresh_dashboard(&fetcher, &settings, hour(0)).await;

        assert_eq!(snapshot.current, Some(current));
        assert_eq!(snapshot.previous, None);
        assert_eq!(snapshot.trend, None);
    }
}
