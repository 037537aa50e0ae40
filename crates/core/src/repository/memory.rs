use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::AssetDescriptor;
use crate::models::catalog::AssetCatalog;
use crate::models::price::{PriceHistory, PriceObservation, PricePoint};
use crate::models::purchase::{PurchaseLedger, PurchaseRecord};

use super::traits::{
    AssetCatalogReader, AssetCatalogWriter, PriceSeriesReader, PriceSeriesWriter,
    PurchaseLedgerReader, PurchaseLedgerWriter,
};

// In-memory stores backing the persisted portfolio file. They never fail.

impl PurchaseLedgerReader for PurchaseLedger {
    fn fetch_purchases(&self, asset_code: Option<&str>) -> Result<Vec<PurchaseRecord>, CoreError> {
        Ok(self.filter(asset_code))
    }
}

impl PurchaseLedgerWriter for PurchaseLedger {
    fn record_purchase(&mut self, record: PurchaseRecord) -> Result<(), CoreError> {
        self.append(record);
        Ok(())
    }
}

impl PriceSeriesReader for PriceHistory {
    fn fetch_prices(
        &self,
        asset_code: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, CoreError> {
        Ok(self.range(asset_code, from, to))
    }

    fn fetch_latest_n(&self, asset_code: &str, n: usize) -> Result<Vec<PricePoint>, CoreError> {
        Ok(self.latest_n(asset_code, n))
    }
}

impl PriceSeriesWriter for PriceHistory {
    fn upsert_price(&mut self, observation: PriceObservation) -> Result<(), CoreError> {
        self.upsert(&observation);
        Ok(())
    }
}

impl AssetCatalogReader for AssetCatalog {
    fn fetch_descriptor(&self, asset_code: &str) -> Result<Option<AssetDescriptor>, CoreError> {
        Ok(self.get(asset_code).cloned())
    }
}

impl AssetCatalogWriter for AssetCatalog {
    fn upsert_descriptor(&mut self, descriptor: AssetDescriptor) -> Result<(), CoreError> {
        self.upsert(descriptor);
        Ok(())
    }
}
