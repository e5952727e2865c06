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
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::dashboard::{DashboardSettings, DashboardSnapshot, refresh_dashboard};
use crate::fetcher::PriceFetcher;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Keep the dashboard snapshot fresh until shutdown
///
/// Refreshes immediately, then on every `interval` tick and whenever the
/// settings change. A refresh that is still running when the settings change
/// or shutdown is requested is dropped, so a snapshot built from outdated
/// settings is never published.
///
/// Shutdown is requested with [`Notify::notify_one`]. The loop also ends when
/// the settings sender is dropped.
///
/// An `interval` shorter than one second is raised to one second.
pub async fn run_refresh_loop(
    fetcher: PriceFetcher,
    mut settings_rx: watch::Receiver<DashboardSettings>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
    shutdown: Arc<Notify>,
    interval: Duration,
) {
    let interval = if interval < MIN_INTERVAL {
        warn!(
            "⚠️ [REFRESH] Interval {:?} too short, using {:?}",
            interval, MIN_INTERVAL
        );
        MIN_INTERVAL
    } else {
        interval
    };

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    let mut refresh_now = true;
    info!(
        "🚀 [REFRESH] Loop started (source {}, every {:?})",
        fetcher.source_name(),
        interval
    );

    loop {
        if !refresh_now {
            tokio::select! {
                biased;
                () = shutdown.notified() => break,
                changed = settings_rx.changed() => {
                    if changed.is_err() {
                        debug!("Settings channel closed");
                        break;
                    }
                    debug!("⚙️ [REFRESH] Settings changed");
                }
                _ = ticker.tick() => {}
            }
        }
        refresh_now = false;

        let settings = settings_rx.borrow_and_update().clone();

        tokio::select! {
            biased;
            () = shutdown.notified() => {
                debug!("Refresh abandoned for shutdown");
                break;
            }
            changed = settings_rx.changed() => {
                if changed.is_err() {
                    debug!("Settings channel closed");
                    break;
                }
                debug!("⚙️ [REFRESH] Settings changed mid-refresh, starting over");
                refresh_now = true;
            }
            snapshot = refresh_dashboard(&fetcher, &settings, Utc::now()) => {
                snapshot_tx.send_replace(snapshot);
                ticker.reset();
            }
        }
    }

    info!("🛑 [REFRESH] Loop stopped");
}
