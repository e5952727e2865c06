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

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nordspot_types::{PricePoint, PriceSeries};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::UpstreamConfig;
use crate::errors::{FetchError, FetchResult};
use crate::time::{floor_to_hour, format_api_instant};
use crate::traits::PriceDataSource;

#[derive(Debug, Deserialize)]
struct PriceRangeResponse {
    success: bool,
    data: Option<HashMap<String, Vec<RawPriceEntry>>>,
}

#[derive(Debug, Deserialize)]
struct CurrentPriceResponse {
    success: bool,
    data: Option<Vec<RawPriceEntry>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPriceEntry {
    /// Unix seconds
    timestamp: i64,
    /// EUR/MWh
    price: f64,
}

impl RawPriceEntry {
    fn to_point(self) -> FetchResult<PricePoint> {
        let timestamp = DateTime::from_timestamp(self.timestamp, 0).ok_or_else(|| {
            FetchError::Format(format!("timestamp out of range: {}", self.timestamp))
        })?;
        Ok(PricePoint::actual(floor_to_hour(timestamp), self.price))
    }
}

/// Normalize upstream entries into an hourly series
///
/// Entries within the same hour (quarter-hour resolution) are averaged.
fn normalize_entries(entries: &[RawPriceEntry]) -> FetchResult<PriceSeries> {
    let points = entries
        .iter()
        .map(|entry| entry.to_point())
        .collect::<FetchResult<Vec<_>>>()?;
    Ok(PriceSeries::from_unsorted(points))
}

/// Elering Nord Pool price API client
#[derive(Debug, Clone)]
pub struct EleringClient {
    base_url: String,
    market: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl EleringClient {
    /// Create a client for `market` with default timeout and retry settings
    pub fn new(base_url: impl Into<String>, market: impl Into<String>) -> FetchResult<Self> {
        Self::with_timeout(base_url, market, Duration::from_secs(10))
    }

    fn with_timeout(
        base_url: impl Into<String>,
        market: impl Into<String>,
        timeout: Duration,
    ) -> FetchResult<Self> {
        let market = market.into();
        if market.trim().is_empty() {
            return Err(FetchError::Config("market code must not be empty".to_owned()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            market: market.trim().to_lowercase(),
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> FetchResult<Self> {
        info!(
            "Initializing Elering client: {} (market {})",
            config.base_url, config.market
        );
        Ok(Self::with_timeout(
            config.base_url.clone(),
            config.market.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_retry_config(config.max_retries, Duration::from_millis(config.retry_delay_ms)))
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// Get published prices between `start` and `end` (both inclusive)
    pub async fn get_price_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> FetchResult<PriceSeries> {
        let start_str = format_api_instant(start, false);
        let end_str = format_api_instant(end, true);
        let url = format!(
            "{}?start={}&end={}",
            self.base_url,
            urlencoding::encode(&start_str),
            urlencoding::encode(&end_str)
        );

        debug!("💰 [ELERING] Fetching prices {} .. {}", start_str, end_str);
        debug!("   URL: {}", url);

        let response = self
            .retry_request(|| async { self.client.get(&url).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let payload: PriceRangeResponse = serde_json::from_str(&body)?;

                if !payload.success {
                    return Err(FetchError::Format(
                        "upstream reported success=false".to_owned(),
                    ));
                }

                let entries = payload
                    .data
                    .as_ref()
                    .and_then(|data| data.get(&self.market))
                    .ok_or_else(|| {
                        FetchError::Format(format!("no data for market '{}'", self.market))
                    })?;

                let series = normalize_entries(entries)?;
                info!(
                    "✅ [ELERING] Retrieved {} entries, {} hourly prices",
                    entries.len(),
                    series.len()
                );
                Ok(series)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [ELERING] Status {}: {}", status, error_text);
                Err(FetchError::Status {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Get the price of the current hour
    ///
    /// The timestamp is floored to the hour but the price is the one the
    /// upstream quotes right now. With quarter-hour data that is the price of
    /// the running quarter, not the hourly mean found in the range series.
    pub async fn get_current_price(&self) -> FetchResult<Option<PricePoint>> {
        let url = format!(
            "{}/{}/current",
            self.base_url,
            self.market.to_uppercase()
        );
        debug!("💰 [ELERING] Fetching current price");
        debug!("   URL: {}", url);

        let response = self
            .retry_request(|| async { self.client.get(&url).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let payload: CurrentPriceResponse = serde_json::from_str(&body)?;

                if !payload.success {
                    return Err(FetchError::Format(
                        "upstream reported success=false".to_owned(),
                    ));
                }

                let Some(entry) = payload.data.and_then(|data| data.into_iter().next()) else {
                    debug!("⚠️ [ELERING] No current price published");
                    return Ok(None);
                };

                let point = entry.to_point()?;
                info!(
                    "✅ [ELERING] Current price {} = {:.2} EUR/MWh",
                    point.timestamp.format("%Y-%m-%d %H:%M"),
                    point.raw_price
                );
                Ok(Some(point))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [ELERING] Status {}: {}", status, error_text);
                Err(FetchError::Status {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut>(&self, mut request_fn: F) -> FetchResult<reqwest::Response>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(FetchError::Http(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl PriceDataSource for EleringClient {
    async fn price_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> FetchResult<PriceSeries> {
        self.get_price_range(start, end).await
    }

    async fn current_price(&self) -> FetchResult<Option<PricePoint>> {
        self.get_current_price().await
    }

    fn name(&self) -> &str {
        "Elering"
    }
}
