use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::InstrumentType;
use crate::models::price::PricePoint;

/// Trait abstraction for every price ingestion source.
///
/// A source normalizes whatever it reads (scraped HTML, JSON chart data)
/// into date-sorted `PricePoint`s. Markup and wire formats stay behind this
/// trait; the valuation engine only ever sees normalized points.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Which instrument types this source can price.
    fn supported_instruments(&self) -> Vec<InstrumentType>;

    /// Daily prices for `asset_code` in `[from, to]`, ascending by date.
    async fn fetch_history(
        &self,
        asset_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
