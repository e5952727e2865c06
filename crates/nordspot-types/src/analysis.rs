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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive statistics over published prices (cents/kWh)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Cheapest contiguous run of hours before a deadline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheapestWindow {
    /// Start of the first hour in the window
    pub start: DateTime<Utc>,

    /// Start of the hour following the window, or the start of the last
    /// window hour when the series has no further points
    pub end: DateTime<Utc>,

    /// Mean price over the window (cents/kWh)
    pub average_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Change of the current hour's price against the previous hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub direction: TrendDirection,

    /// Absolute price difference (cents/kWh)
    pub difference: f64,
}

/// Position of a price hour relative to the current clock hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePhase {
    Past,
    Current,
    Future,
}
