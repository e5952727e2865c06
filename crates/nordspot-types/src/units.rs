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

//! Price unit conversion and consumption tax

use serde::{Deserialize, Serialize};

/// Estonian VAT applied to electricity (22%)
pub const DEFAULT_TAX_RATE: f64 = 0.22;

/// Convert EUR/MWh to cents/kWh
///
/// 1 EUR = 100 cents and 1 MWh = 1000 kWh, so the factor is 1/10.
pub fn to_display_unit(raw_price: f64) -> f64 {
    raw_price / 10.0
}

/// Apply a multiplicative tax rate to a price
pub fn apply_tax(price: f64, rate: f64) -> f64 {
    price * (1.0 + rate)
}

/// Whether prices are shown with consumption tax, and at which rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub include: bool,
    pub rate: f64,
}

impl TaxPolicy {
    pub fn new(include: bool, rate: f64) -> Self {
        Self { include, rate }
    }

    /// Prices without tax
    pub fn excluded() -> Self {
        Self::new(false, DEFAULT_TAX_RATE)
    }

    /// Prices with the default tax rate applied
    pub fn included() -> Self {
        Self::new(true, DEFAULT_TAX_RATE)
    }

    /// Price presented to the user for a base display price (cents/kWh)
    pub fn price(&self, display_price: f64) -> f64 {
        if self.include {
            apply_tax(display_price, self.rate)
        } else {
            display_price
        }
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::included()
    }
}

impl From<bool> for TaxPolicy {
    fn from(include: bool) -> Self {
        Self::new(include, DEFAULT_TAX_RATE)
    }
}
