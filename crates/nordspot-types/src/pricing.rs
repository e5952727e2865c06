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
use serde::{Deserialize, Deserializer, Serialize};

use crate::units::to_display_unit;

/// Where a price value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceOrigin {
    /// Published by the market
    Actual,
    /// Synthesized for an hour the market has not priced yet
    Predicted,
}

/// One hourly spot price quotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Start of the hour (UTC)
    pub timestamp: DateTime<Utc>,

    /// Price in EUR/MWh as published upstream
    pub raw_price: f64,

    /// Price in cents/kWh, without tax
    pub display_price: f64,

    pub origin: PriceOrigin,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, raw_price: f64, origin: PriceOrigin) -> Self {
        Self {
            timestamp,
            raw_price,
            display_price: to_display_unit(raw_price),
            origin,
        }
    }

    /// Market-published price
    pub fn actual(timestamp: DateTime<Utc>, raw_price: f64) -> Self {
        Self::new(timestamp, raw_price, PriceOrigin::Actual)
    }

    /// Synthesized price
    pub fn predicted(timestamp: DateTime<Utc>, raw_price: f64) -> Self {
        Self::new(timestamp, raw_price, PriceOrigin::Predicted)
    }

    pub fn is_predicted(&self) -> bool {
        matches!(self.origin, PriceOrigin::Predicted)
    }
}

/// Hourly price points ordered by timestamp, one point per hour
///
/// Serialized as a plain array. Deserializing goes through
/// [`PriceSeries::from_unsorted`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<PricePoint>);

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<PricePoint>::deserialize(deserializer).map(Self::from_unsorted)
    }
}

impl PriceSeries {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a series from points in any order
    ///
    /// Points sharing a timestamp are merged into one whose raw price is the
    /// mean of the merged points. The merged point keeps the origin of the
    /// first point seen for that timestamp.
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);

        let mut merged: Vec<PricePoint> = Vec::with_capacity(points.len());
        let mut run_len = 0_u32;
        let mut run_sum = 0.0_f64;

        for point in points {
            match merged.last_mut() {
                Some(last) if last.timestamp == point.timestamp => {
                    run_len += 1;
                    run_sum += point.raw_price;
                    *last = PricePoint::new(last.timestamp, run_sum / f64::from(run_len), last.origin);
                }
                _ => {
                    run_len = 1;
                    run_sum = point.raw_price;
                    merged.push(point);
                }
            }
        }

        Self(merged)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.0.last()
    }

    /// Point starting exactly at `timestamp`
    pub fn at(&self, timestamp: DateTime<Utc>) -> Option<&PricePoint> {
        self.position_of(timestamp).map(|idx| &self.0[idx])
    }

    /// Index of the point starting exactly at `timestamp`
    pub fn position_of(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.0.binary_search_by_key(&timestamp, |p| p.timestamp).ok()
    }

    /// Points with `start <= timestamp <= end`
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self(
            self.0
                .iter()
                .filter(|p| p.timestamp >= start && p.timestamp <= end)
                .copied()
                .collect(),
        )
    }

    /// Number of points that were synthesized rather than published
    pub fn predicted_count(&self) -> usize {
        self.0.iter().filter(|p| p.is_predicted()).count()
    }
}

impl AsRef<[PricePoint]> for PriceSeries {
    fn as_ref(&self) -> &[PricePoint] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
