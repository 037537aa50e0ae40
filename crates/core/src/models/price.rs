use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::normalize_code;

/// A single price data point (date → price) within one asset's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Quoted price in the smallest currency unit
    pub price: i64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: i64) -> Self {
        Self { date, price }
    }
}

/// A price observation for a specific asset.
/// `(asset_code, date)` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub asset_code: String,
    pub date: NaiveDate,
    pub price: i64,
}

impl PriceObservation {
    pub fn new(asset_code: impl AsRef<str>, date: NaiveDate, price: i64) -> Self {
        Self {
            asset_code: normalize_code(asset_code.as_ref()),
            date,
            price,
        }
    }

    pub fn point(&self) -> PricePoint {
        PricePoint::new(self.date, self.price)
    }
}

/// Daily price observations per asset code.
///
/// Each series is kept sorted by date with at most one point per date,
/// so writes are idempotent upserts and range reads are binary searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    /// asset_code → date-sorted points
    pub series: HashMap<String, Vec<PricePoint>>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the observation for `(asset_code, date)`.
    pub fn upsert(&mut self, observation: &PriceObservation) {
        let points = self
            .series
            .entry(normalize_code(&observation.asset_code))
            .or_default();

        match points.binary_search_by_key(&observation.date, |p| p.date) {
            Ok(idx) => points[idx].price = observation.price,
            Err(idx) => points.insert(idx, observation.point()),
        }
    }

    /// The full ascending series for an asset (empty if unknown).
    pub fn series_for(&self, asset_code: &str) -> &[PricePoint] {
        self.series
            .get(&normalize_code(asset_code))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Points in `[from, to]` (either bound optional), ascending.
    pub fn range(
        &self,
        asset_code: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<PricePoint> {
        let points = self.series_for(asset_code);
        let start = match from {
            Some(from) => points.partition_point(|p| p.date < from),
            None => 0,
        };
        let end = match to {
            Some(to) => points.partition_point(|p| p.date <= to),
            None => points.len(),
        };
        if start >= end {
            return Vec::new();
        }
        points[start..end].to_vec()
    }

    /// The most recent `n` points, still in ascending date order.
    pub fn latest_n(&self, asset_code: &str, n: usize) -> Vec<PricePoint> {
        let points = self.series_for(asset_code);
        points[points.len().saturating_sub(n)..].to_vec()
    }

    /// Total number of observations across all assets.
    pub fn total_entries(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Remove all observations dated before `before`. Returns the number removed.
    pub fn prune_before(&mut self, before: NaiveDate) -> usize {
        let mut removed = 0;
        for points in self.series.values_mut() {
            let split = points.partition_point(|p| p.date < before);
            removed += split;
            points.drain(..split);
        }
        self.series.retain(|_, v| !v.is_empty());
        removed
    }
}
