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

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nordspot_types::{PricePoint, PriceSeries};
use tracing::{debug, warn};

use crate::errors::FetchResult;
use crate::traits::PriceDataSource;

/// Price fetcher over any [`PriceDataSource`]
///
/// The `try_*` methods surface failures. `fetch_range` and `fetch_current`
/// log them and degrade to an empty series or `None`.
#[derive(Clone)]
pub struct PriceFetcher {
    source: Arc<dyn PriceDataSource>,
}

impl std::fmt::Debug for PriceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceFetcher")
            .field("source", &self.source.name())
            .finish()
    }
}

impl PriceFetcher {
    pub fn new(source: Arc<dyn PriceDataSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn try_fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> FetchResult<PriceSeries> {
        self.source.price_range(start, end).await
    }

    pub async fn try_fetch_current(&self) -> FetchResult<Option<PricePoint>> {
        self.source.current_price().await
    }

    /// Published prices in `[start, end]`, empty on any failure
    pub async fn fetch_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> PriceSeries {
        match self.try_fetch_range(start, end).await {
            Ok(series) => {
                debug!(
                    "📈 [{}] {} prices for {} .. {}",
                    self.source.name(),
                    series.len(),
                    start,
                    end
                );
                series
            }
            Err(e) => {
                warn!(
                    "⚠️ [{}] Price range unavailable ({:?}): {}",
                    self.source.name(),
                    e.kind(),
                    e
                );
                PriceSeries::new()
            }
        }
    }

    /// Price of the current hour, `None` on any failure
    pub async fn fetch_current(&self) -> Option<PricePoint> {
        match self.try_fetch_current().await {
            Ok(point) => point,
            Err(e) => {
                warn!(
                    "⚠️ [{}] Current price unavailable ({:?}): {}",
                    self.source.name(),
                    e.kind(),
                    e
                );
                None
            }
        }
    }
}
