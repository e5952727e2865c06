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

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use nordspot_core::{
    DashboardSettings, DashboardSnapshot, EleringClient, PricePhase, PriceFetcher, Timeframe,
    TrendDirection, classify_point, refresh_dashboard, run_refresh_loop,
};
use tokio::sync::{Notify, watch};
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "nordspot")]
#[command(author, version, about = "Nord Pool spot prices for the Baltic and Finnish markets")]
struct Cli {
    /// Path to the TOML configuration file (defaults are used if it is missing)
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Refresh once, print the summary and exit
    #[arg(long)]
    once: bool,

    /// Date range to show (dashboard, today, tomorrow, week)
    #[arg(long, value_name = "TIMEFRAME")]
    timeframe: Option<Timeframe>,

    /// Show prices with VAT
    #[arg(long, conflicts_with = "exclude_vat")]
    include_vat: bool,

    /// Show prices without VAT
    #[arg(long)]
    exclude_vat: bool,

    /// Length of the cheapest window to look for, 0 disables the search
    #[arg(long, value_name = "N")]
    window_hours: Option<usize>,

    /// Local time by which the cheapest window must be over
    #[arg(long, value_name = "HH:MM")]
    deadline: Option<String>,
}

impl Cli {
    /// Apply command line overrides on top of the file configuration
    fn apply(&self, config: &mut AppConfig) {
        if let Some(timeframe) = self.timeframe {
            config.display.timeframe = timeframe;
        }
        if self.include_vat {
            config.display.include_vat = true;
        }
        if self.exclude_vat {
            config.display.include_vat = false;
        }
        if let Some(hours) = self.window_hours {
            config.cheapest_window.hours = hours;
        }
        if let Some(deadline) = &self.deadline {
            config.cheapest_window.deadline.clone_from(deadline);
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(&self.config)?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Respects RUST_LOG environment variable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let settings = config.dashboard_settings()?;

    info!("🚀 Starting NordSpot");
    info!("📋 Configuration Summary:");
    info!("   Upstream: {} (market {})", config.upstream.base_url, config.upstream.market);
    info!("   Timeframe: {}", settings.timeframe);
    info!("   Time zone: {}", settings.timezone);
    info!(
        "   VAT: {}",
        if settings.tax.include {
            format!("included ({:.1}%)", settings.tax.rate * 100.0)
        } else {
            "excluded".to_owned()
        }
    );
    if let Some(window) = settings.window {
        info!("   Cheapest window: {}h before {}", window.hours, window.deadline.format("%H:%M"));
    }

    let client =
        EleringClient::from_config(&config.upstream).context("Failed to create Elering client")?;
    let fetcher = PriceFetcher::new(Arc::new(client));

    if cli.once {
        let snapshot = refresh_dashboard(&fetcher, &settings, Utc::now()).await;
        report_snapshot(&snapshot, &settings);
        return Ok(());
    }

    let (settings_tx, settings_rx) = watch::channel(settings);
    let (snapshot_tx, mut snapshot_rx) = watch::channel(DashboardSnapshot::default());
    let shutdown = Arc::new(Notify::new());
    let report_settings = settings_rx.clone();

    tokio::spawn(handle_signals(cli, settings_tx, shutdown.clone()));

    let refresh = tokio::spawn(run_refresh_loop(
        fetcher,
        settings_rx,
        snapshot_tx,
        shutdown,
        config.refresh_interval(),
    ));

    // Ends once the refresh loop drops the snapshot sender
    while snapshot_rx.changed().await.is_ok() {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        let settings = report_settings.borrow().clone();
        report_snapshot(&snapshot, &settings);
    }

    refresh.await.context("Refresh loop panicked")?;
    info!("Shutting down");
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Ctrl-C requests shutdown. On unix, SIGHUP reloads the configuration file
/// and pushes the new dashboard settings to the refresh loop. Upstream
/// settings are only read at startup.
async fn handle_signals(
    cli: Cli,
    settings_tx: watch::Sender<DashboardSettings>,
    shutdown: Arc<Notify>,
) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::hangup()) {
            Ok(mut hangup) => loop {
                tokio::select! {
                    () = wait_for_ctrl_c() => break,
                    _ = hangup.recv() => {
                        info!("SIGHUP received - reloading {}", cli.config.display());
                        match cli.load_config().and_then(|config| config.dashboard_settings()) {
                            Ok(settings) => {
                                settings_tx.send_replace(settings);
                            }
                            Err(e) => error!("Config reload failed, keeping current settings: {e:#}"),
                        }
                    }
                }
            },
            Err(e) => {
                warn!("SIGHUP handler unavailable: {e}");
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (&cli, &settings_tx);
        wait_for_ctrl_c().await;
    }

    info!("Shutdown signal received");
    shutdown.notify_one();
}

fn report_snapshot(snapshot: &DashboardSnapshot, settings: &DashboardSettings) {
    let tax = settings.tax;
    let tz = settings.timezone;
    let local = |ts: chrono::DateTime<Utc>| ts.with_timezone(&tz).format("%a %d.%m %H:%M");

    if snapshot.series.is_empty() {
        match snapshot.range_start.zip(snapshot.range_end) {
            Some((start, end)) => warn!(
                "⚠️ No price data for {} ({} .. {})",
                snapshot.timeframe,
                local(start),
                local(end)
            ),
            None => warn!("⚠️ No price data for {}", snapshot.timeframe),
        }
    } else {
        info!(
            "📈 {} hourly prices for {} ({} predicted)",
            snapshot.series.len(),
            snapshot.timeframe,
            snapshot.series.predicted_count()
        );
    }

    match snapshot.current {
        Some(current) => info!(
            "💰 Current price {}: {:.2} ¢/kWh",
            local(current.timestamp),
            tax.price(current.display_price)
        ),
        None => warn!("⚠️ Current price unavailable"),
    }

    if let Some(trend) = snapshot.trend {
        let arrow = match trend.direction {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Flat => "→",
        };
        info!("   {arrow} {:.2} ¢ vs previous hour", trend.difference);
    }

    if let Some(stats) = snapshot.statistics {
        info!(
            "📊 min {:.2} | max {:.2} | mean {:.2} | median {:.2} | p75 {:.2} | p90 {:.2} | p95 {:.2}",
            stats.min, stats.max, stats.mean, stats.median, stats.p75, stats.p90, stats.p95
        );
    }

    match (snapshot.cheapest_window, settings.window) {
        (Some(window), _) => info!(
            "⏱️ Cheapest window: {} .. {} at {:.2} ¢/kWh",
            local(window.start),
            local(window.end),
            window.average_price
        ),
        (None, Some(request)) => info!(
            "⏱️ No {}h window ends before {}",
            request.hours,
            request.deadline.format("%H:%M")
        ),
        (None, None) => {}
    }

    let now = snapshot.fetched_at.unwrap_or_else(Utc::now);
    for point in &snapshot.series {
        let phase = classify_point(point, now);
        if phase == PricePhase::Past {
            continue;
        }
        debug!(
            "   {} {:>7.2}{}{}",
            local(point.timestamp),
            tax.price(point.display_price),
            if point.is_predicted() { " (predicted)" } else { "" },
            if phase == PricePhase::Current { " <- now" } else { "" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "nordspot",
            "--timeframe",
            "tomorrow",
            "--exclude-vat",
            "--window-hours",
            "4",
            "--deadline",
            "06:00",
        ]);

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.display.timeframe, Timeframe::Tomorrow);
        assert!(!config.display.include_vat);
        assert_eq!(config.cheapest_window.hours, 4);
        assert_eq!(config.cheapest_window.deadline, "06:00");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["nordspot"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.once);

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_cli_rejects_conflicting_vat_flags() {
        let result = Cli::try_parse_from(["nordspot", "--include-vat", "--exclude-vat"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["nordspot", "--timeframe", "month"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nordspot.toml");
        std::fs::write(&path, "[cheapest_window]\nhours = 2\n").unwrap();

        let cli = Cli::parse_from([
            "nordspot",
            "--config",
            path.to_str().unwrap(),
            "--deadline",
            "99:00",
        ]);
        assert!(cli.load_config().is_err());

        let cli = Cli::parse_from(["nordspot", "--config", path.to_str().unwrap(), "--once"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.cheapest_window.hours, 2);
        assert!(cli.once);
    }
}
