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

pub mod analysis;
pub mod pricing;
pub mod units;

// Re-export common types for convenience
pub use analysis::{CheapestWindow, PricePhase, PriceTrend, Statistics, TrendDirection};
pub use pricing::{PriceOrigin, PricePoint, PriceSeries};
pub use units::{DEFAULT_TAX_RATE, TaxPolicy, apply_tax, to_display_unit};
