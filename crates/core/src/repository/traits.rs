use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::AssetDescriptor;
use crate::models::price::{PriceObservation, PricePoint};
use crate::models::purchase::PurchaseRecord;

// The valuation engine only reads through these traits. Backing stores
// (in-memory, file, database) implement them; failures surface unchanged.

/// Read side of the purchase ledger.
pub trait PurchaseLedgerReader {
    /// All purchases, or only those of `asset_code` when given.
    fn fetch_purchases(&self, asset_code: Option<&str>) -> Result<Vec<PurchaseRecord>, CoreError>;
}

/// Write side of the purchase ledger. Append-only.
pub trait PurchaseLedgerWriter {
    fn record_purchase(&mut self, record: PurchaseRecord) -> Result<(), CoreError>;
}

/// Read side of the price series store. Results are ascending by date.
pub trait PriceSeriesReader {
    /// Observations in `[from, to]`; open bounds when `None`.
    fn fetch_prices(
        &self,
        asset_code: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, CoreError>;

    /// The most recent `n` observations.
    fn fetch_latest_n(&self, asset_code: &str, n: usize) -> Result<Vec<PricePoint>, CoreError>;
}

/// Write side of the price series store.
pub trait PriceSeriesWriter {
    /// Insert or replace the observation for `(asset_code, date)`.
    fn upsert_price(&mut self, observation: PriceObservation) -> Result<(), CoreError>;
}

/// Read side of the asset catalog.
pub trait AssetCatalogReader {
    fn fetch_descriptor(&self, asset_code: &str) -> Result<Option<AssetDescriptor>, CoreError>;
}

/// Write side of the asset catalog.
pub trait AssetCatalogWriter {
    fn upsert_descriptor(&mut self, descriptor: AssetDescriptor) -> Result<(), CoreError>;
}
