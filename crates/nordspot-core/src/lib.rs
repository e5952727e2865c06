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

pub mod cheapest_window;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod fetcher;
pub mod prediction;
pub mod refresh;
pub mod statistics;
pub mod time;
pub mod timeframe;
pub mod traits;

pub use cheapest_window::find_cheapest_window;
pub use client::EleringClient;
pub use config::UpstreamConfig;
pub use dashboard::{
    DashboardSettings, DashboardSnapshot, WindowRequest, classify_point, price_trend,
    prices_for_timeframe, prices_with_prediction, refresh_dashboard,
};
pub use errors::{FailureKind, FetchError, FetchResult};
pub use fetcher::PriceFetcher;
pub use nordspot_types::*;
pub use prediction::extend_with_prediction;
pub use refresh::run_refresh_loop;
pub use statistics::{compute_statistics, percentile};
pub use timeframe::Timeframe;
pub use traits::PriceDataSource;
