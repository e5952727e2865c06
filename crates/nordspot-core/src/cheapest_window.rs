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

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use nordspot_types::{CheapestWindow, PricePoint, TaxPolicy};
use tracing::debug;

use crate::time::{floor_to_hour, resolve_deadline};

/// Find the cheapest run of `window_hours` consecutive points that starts no
/// earlier than the current hour and finishes by `deadline`
///
/// `series` must be ordered by timestamp. The deadline is a wall-clock time
/// in the time zone of `now`. Ties go to the earliest window.
pub fn find_cheapest_window(
    series: &[PricePoint],
    window_hours: usize,
    deadline: NaiveTime,
    now: DateTime<Tz>,
    tax: TaxPolicy,
) -> Option<CheapestWindow> {
    if window_hours == 0 {
        return None;
    }

    let hour_start = floor_to_hour(now.with_timezone(&Utc));
    let deadline_at = resolve_deadline(deadline, now);

    let first = series.iter().position(|p| p.timestamp >= hour_start)?;
    let candidates = &series[first..];
    if candidates.len() < window_hours {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;

    for (offset, window) in candidates.windows(window_hours).enumerate() {
        let last = window[window_hours - 1];
        if last.timestamp + Duration::hours(1) > deadline_at {
            break;
        }

        let sum: f64 = window.iter().map(|p| tax.price(p.display_price)).sum();
        if best.is_none_or(|(_, best_sum)| sum < best_sum) {
            best = Some((offset, sum));
        }
    }

    let (offset, sum) = best?;
    let window = &candidates[offset..offset + window_hours];
    let end = candidates
        .get(offset + window_hours)
        .map_or(window[window_hours - 1].timestamp, |next| next.timestamp);

    #[expect(clippy::cast_precision_loss, reason = "window length is small")]
    let average_price = sum / window_hours as f64;

    debug!(
        "⏱️ [WINDOW] {}h window {} .. {} avg {:.2} (deadline {})",
        window_hours, window[0].timestamp, end, average_price, deadline_at
    );

    Some(CheapestWindow {
        start: window[0].timestamp,
        end,
        average_price,
    })
}
