use chrono::NaiveDate;
use log::{info, warn};

use crate::errors::CoreError;
use crate::models::asset::{AssetDescriptor, InstrumentType};
use crate::models::price::{PriceObservation, PricePoint};
use crate::providers::registry::PriceSourceRegistry;
use crate::repository::traits::PriceSeriesWriter;

/// Pulls daily prices from the registered sources into the price store.
///
/// Sources are tried in registration order; the first one that answers
/// wins. Writes are upserts, so re-ingesting a range is harmless.
pub struct PriceService {
    registry: PriceSourceRegistry,
}

impl PriceService {
    pub fn new(registry: PriceSourceRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one source is available for an instrument type.
    pub fn has_source_for(&self, instrument: InstrumentType) -> bool {
        self.registry.get_source_for(instrument).is_some()
    }

    /// Names of all sources for an instrument type, in fallback order.
    pub fn source_names(&self, instrument: InstrumentType) -> Vec<String> {
        self.registry
            .get_sources_for(instrument)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Fetch `[from, to]` for an asset with automatic fallback.
    ///
    /// A source returning a negative price is treated as failed.
    pub async fn fetch_history(
        &self,
        asset: &AssetDescriptor,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        if from > to {
            return Err(CoreError::ValidationError(format!(
                "Price range start {from} is after end {to}"
            )));
        }

        let instrument = asset.instrument_type;
        let sources = self.registry.get_sources_for(instrument);
        if sources.is_empty() {
            return Err(CoreError::NoProvider(instrument.to_string()));
        }

        let mut last_error = None;
        for source in &sources {
            match source.fetch_history(&asset.asset_code, from, to).await {
                Ok(points) => {
                    if let Some(bad) = points.iter().find(|p| p.price < 0) {
                        warn!(
                            "{} returned negative price {} for {} on {}",
                            source.name(),
                            bad.price,
                            asset.asset_code,
                            bad.date
                        );
                        last_error = Some(CoreError::Api {
                            provider: source.name().to_string(),
                            message: format!(
                                "Invalid price returned for {}: {} (must be non-negative)",
                                asset.asset_code, bad.price
                            ),
                        });
                        continue;
                    }
                    return Ok(points);
                }
                Err(e) => {
                    warn!("{} failed for {}: {e}", source.name(), asset.asset_code);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(instrument.to_string())))
    }

    /// Fetch and upsert `[from, to]` for an asset. Returns the number of
    /// points written. Cash has no price series and writes nothing.
    pub async fn ingest(
        &self,
        store: &mut dyn PriceSeriesWriter,
        asset: &AssetDescriptor,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<usize, CoreError> {
        if !asset.instrument_type.is_priced() {
            return Ok(0);
        }

        let points = self.fetch_history(asset, from, to).await?;
        for point in &points {
            store.upsert_price(PriceObservation::new(&asset.asset_code, point.date, point.price))?;
        }

        info!(
            "Ingested {} prices for {} between {from} and {to}",
            points.len(),
            asset.asset_code
        );
        Ok(points.len())
    }
}
