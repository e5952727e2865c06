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

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveTime;
use chrono_tz::Tz;
use nordspot_core::{DashboardSettings, TaxPolicy, Timeframe, UpstreamConfig, WindowRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "nordspot.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub cheapest_window: CheapestWindowSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// IANA name of the market time zone
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_include_vat")]
    pub include_vat: bool,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,
    #[serde(default)]
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheapestWindowSettings {
    /// Window length in hours, 0 disables the search
    #[serde(default)]
    pub hours: usize,
    /// Local time (`HH:MM`) by which the window must be over
    #[serde(default = "default_deadline")]
    pub deadline: String,
}

fn default_timezone() -> String {
    "Europe/Tallinn".to_owned()
}

fn default_include_vat() -> bool {
    true
}

fn default_vat_rate() -> f64 {
    nordspot_core::DEFAULT_TAX_RATE
}

fn default_interval_secs() -> u64 {
    15 * 60
}

fn default_deadline() -> String {
    "07:00".to_owned()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            include_vat: default_include_vat(),
            vat_rate: default_vat_rate(),
            timeframe: Timeframe::default(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for CheapestWindowSettings {
    fn default() -> Self {
        Self {
            hours: 0,
            deadline: default_deadline(),
        }
    }
}

pub fn parse_deadline(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid deadline '{value}', expected HH:MM"))
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.upstream.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!("upstream.base_url must be an http(s) URL, got '{base_url}'");
        }
        if self.upstream.market.trim().is_empty() {
            bail!("upstream.market must be set");
        }
        if self.upstream.timeout_secs == 0 {
            bail!("upstream.timeout_secs must be greater than 0");
        }
        if self.upstream.max_retries == 0 {
            bail!("upstream.max_retries must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.display.vat_rate) {
            bail!(
                "display.vat_rate must be between 0 and 1, got {}",
                self.display.vat_rate
            );
        }
        if self.refresh.interval_secs == 0 {
            bail!("refresh.interval_secs must be greater than 0");
        }
        if self.cheapest_window.hours > 48 {
            bail!(
                "cheapest_window.hours must be at most 48, got {}",
                self.cheapest_window.hours
            );
        }
        self.timezone()?;
        parse_deadline(&self.cheapest_window.deadline)?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.display
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid display.timezone '{}': {e}", self.display.timezone))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Dashboard settings described by this configuration
    pub fn dashboard_settings(&self) -> Result<DashboardSettings> {
        let window = if self.cheapest_window.hours == 0 {
            None
        } else {
            Some(WindowRequest {
                hours: self.cheapest_window.hours,
                deadline: parse_deadline(&self.cheapest_window.deadline)?,
            })
        };

        Ok(DashboardSettings {
            timeframe: self.display.timeframe,
            tax: TaxPolicy::new(self.display.include_vat, self.display.vat_rate),
            timezone: self.timezone()?,
            window,
        })
    }
}
