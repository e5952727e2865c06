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

//! Upstream API settings

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://dashboard.elering.ee/api/nps/price";
pub const DEFAULT_MARKET: &str = "ee";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_market() -> String {
    DEFAULT_MARKET.to_owned()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Price endpoint; the current price lives under `{base_url}/{MARKET}/current`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Market code as used by the API (`ee`, `fi`, `lv`, `lt`)
    #[serde(default = "default_market")]
    pub market: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request on transport errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled after each attempt (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            market: default_market(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}
