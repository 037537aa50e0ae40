use chrono::Utc;
use log::info;

use crate::errors::CoreError;
use crate::models::asset::AssetDescriptor;
use crate::models::purchase::{PurchaseQuantity, PurchaseRecord, PurchaseRequest};
use crate::repository::traits::{AssetCatalogReader, PriceSeriesReader, PurchaseLedgerWriter};

/// Records buys into the ledger.
///
/// A buy may give units, amount, or both. The missing side is derived from
/// the price observed on the purchase date, rounding the same way valuation does.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a request, derive the missing quantity and append the record.
    pub fn record_purchase(
        &self,
        ledger: &mut dyn PurchaseLedgerWriter,
        catalog: &dyn AssetCatalogReader,
        prices: &dyn PriceSeriesReader,
        request: &PurchaseRequest,
    ) -> Result<PurchaseRecord, CoreError> {
        let asset = catalog
            .fetch_descriptor(&request.asset_code)?
            .ok_or_else(|| CoreError::AssetNotFound(request.asset_code.clone()))?;

        let record = self.build_record(&asset, prices, request)?;
        ledger.record_purchase(record.clone())?;

        info!(
            "Recorded purchase of {} {} for {} on {}",
            record.unit_count, record.asset_code, record.amount_paid, record.date
        );
        Ok(record)
    }

    /// Resolve a request into a full record without writing it.
    pub fn build_record(
        &self,
        asset: &AssetDescriptor,
        prices: &dyn PriceSeriesReader,
        request: &PurchaseRequest,
    ) -> Result<PurchaseRecord, CoreError> {
        self.validate_request(request)?;
        let instrument = asset.instrument_type;

        let (units, amount) = match request.quantity {
            // Cash units are currency.
            PurchaseQuantity::Both { units, amount } if !instrument.is_priced() && units != amount => {
                return Err(CoreError::ValidationError(format!(
                    "Cash purchase of {} must have equal units and amount, got {units} and {amount}",
                    request.asset_code
                )));
            }
            PurchaseQuantity::Units(units) if !instrument.is_priced() => (units, units),
            PurchaseQuantity::Amount(amount) if !instrument.is_priced() => (amount, amount),
            PurchaseQuantity::Both { units, amount } => (units, amount),
            PurchaseQuantity::Units(units) => {
                let price = self.price_on_purchase_date(prices, request)?;
                (units, instrument.value_of(price, units))
            }
            PurchaseQuantity::Amount(amount) => {
                let price = self.price_on_purchase_date(prices, request)?;
                let units = instrument.units_for_amount(amount, price).ok_or_else(|| {
                    CoreError::ValidationError(format!(
                        "Price of {} on {} is zero, cannot derive units",
                        request.asset_code, request.date
                    ))
                })?;
                (units, amount)
            }
        };

        Ok(PurchaseRecord::new(&request.asset_code, request.date, units, amount))
    }

    /// Rules:
    /// - Given quantities must be positive
    /// - Date may not be in the future (one day of timezone tolerance)
    fn validate_request(&self, request: &PurchaseRequest) -> Result<(), CoreError> {
        let positive = match request.quantity {
            PurchaseQuantity::Units(units) => units > 0,
            PurchaseQuantity::Amount(amount) => amount > 0,
            PurchaseQuantity::Both { units, amount } => units > 0 && amount > 0,
        };
        if !positive {
            return Err(CoreError::ValidationError(
                "Purchase units and amount must be positive".into(),
            ));
        }

        let today = Utc::now().date_naive();
        if let Some(tomorrow) = today.succ_opt() {
            if request.date > tomorrow {
                return Err(CoreError::ValidationError(format!(
                    "Purchase date {} is in the future",
                    request.date
                )));
            }
        }

        Ok(())
    }

    fn price_on_purchase_date(
        &self,
        prices: &dyn PriceSeriesReader,
        request: &PurchaseRequest,
    ) -> Result<i64, CoreError> {
        prices
            .fetch_prices(&request.asset_code, Some(request.date), Some(request.date))?
            .first()
            .map(|p| p.price)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                asset_code: request.asset_code.clone(),
                date: request.date.to_string(),
            })
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
