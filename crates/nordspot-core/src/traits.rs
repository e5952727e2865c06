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

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nordspot_types::{PricePoint, PriceSeries};

use crate::errors::FetchResult;

/// Upstream source of published spot prices
///
/// Implementations report failures; turning them into "no data" is the
/// job of [`crate::fetcher::PriceFetcher`].
#[async_trait]
pub trait PriceDataSource: Send + Sync {
    /// Published hourly prices with `start <= timestamp <= end`, ascending
    async fn price_range(&self, start: DateTime<Utc>, end: DateTime<Utc>)
    -> FetchResult<PriceSeries>;

    /// Price of the current hour, `None` if the upstream has none
    async fn current_price(&self) -> FetchResult<Option<PricePoint>>;

    /// Get data source name for logging
    fn name(&self) -> &str;
}
