use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset::{checked_total, AssetDescriptor};
use crate::errors::CoreError;

/// Aggregated purchases of one asset.
///
/// Keeps units per purchase date so "holdings before day d" can be
/// reconstructed without going back to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsSummary {
    pub asset_code: String,
    pub total_units: i64,
    pub total_amount_paid: i64,
    pub units_by_date: BTreeMap<NaiveDate, i64>,
}

impl HoldingsSummary {
    pub fn new(asset_code: impl Into<String>) -> Self {
        Self {
            asset_code: asset_code.into(),
            ..Self::default()
        }
    }

    /// Fold one purchase into the summary.
    /// Leaves the summary untouched when a total would leave the `i64` range.
    pub fn add_purchase(&mut self, date: NaiveDate, unit_count: i64, amount_paid: i64) -> Result<(), CoreError> {
        let what = format!("Holdings of {}", self.asset_code);
        let total_units = checked_total(self.total_units, unit_count, &what)?;
        let total_amount_paid = checked_total(self.total_amount_paid, amount_paid, &what)?;
        let on_date = checked_total(
            self.units_by_date.get(&date).copied().unwrap_or(0),
            unit_count,
            &what,
        )?;

        self.total_units = total_units;
        self.total_amount_paid = total_amount_paid;
        self.units_by_date.insert(date, on_date);
        Ok(())
    }

    /// Units summed over every purchase not dated `date`.
    pub fn total_units_excluding_date(&self, date: NaiveDate) -> i64 {
        self.total_units
            .saturating_sub(self.units_by_date.get(&date).copied().unwrap_or(0))
    }

    pub fn has_units(&self) -> bool {
        self.total_units != 0
    }
}

/// Holdings of one asset paired with its catalog descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub holdings: HoldingsSummary,
    pub asset: AssetDescriptor,
}

impl Position {
    pub fn new(holdings: HoldingsSummary, asset: AssetDescriptor) -> Self {
        Self { holdings, asset }
    }

    /// `basis * total_amount_paid / total_units`, `0.0` when nothing is held.
    pub fn average_unit_price(&self) -> f64 {
        self.asset
            .instrument_type
            .average_unit_price(self.holdings.total_amount_paid, self.holdings.total_units)
    }
}
