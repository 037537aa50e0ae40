use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::asset::normalize_code;

/// A single buy event. Immutable once recorded.
///
/// **Important**: amounts are integers in the smallest currency unit;
/// units for investment trusts are individual units (quoted per 10,000).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub asset_code: String,

    /// Purchase date (daily granularity)
    pub date: NaiveDate,

    /// Number of units bought
    pub unit_count: i64,

    /// Amount paid, smallest currency unit
    pub amount_paid: i64,
}

impl PurchaseRecord {
    pub fn new(asset_code: impl AsRef<str>, date: NaiveDate, unit_count: i64, amount_paid: i64) -> Self {
        Self {
            asset_code: normalize_code(asset_code.as_ref()),
            date,
            unit_count,
            amount_paid,
        }
    }
}

/// What the buyer specified; the missing side is derived from that day's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseQuantity {
    /// Units given, amount derived
    Units(i64),
    /// Amount given, units derived
    Amount(i64),
    /// Both given, stored as-is
    Both { units: i64, amount: i64 },
}

/// Request to record a buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub asset_code: String,
    pub date: NaiveDate,
    pub quantity: PurchaseQuantity,
}

impl PurchaseRequest {
    pub fn new(asset_code: impl AsRef<str>, date: NaiveDate, quantity: PurchaseQuantity) -> Self {
        Self {
            asset_code: normalize_code(asset_code.as_ref()),
            date,
            quantity,
        }
    }
}

/// Append-only ledger of purchase records, kept in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseLedger {
    pub records: Vec<PurchaseRecord>,
}

impl PurchaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: PurchaseRecord) {
        self.records.push(record);
    }

    /// All records, or only those of one asset when `asset_code` is given.
    pub fn filter(&self, asset_code: Option<&str>) -> Vec<PurchaseRecord> {
        match asset_code.map(normalize_code) {
            Some(code) => self
                .records
                .iter()
                .filter(|r| r.asset_code == code)
                .cloned()
                .collect(),
            None => self.records.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
