pub mod errors;
pub mod models;
pub mod providers;
pub mod repository;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use log::info;
use models::{
    asset::{normalize_code, AssetDescriptor, InstrumentType},
    category::CategoryId,
    portfolio::Portfolio,
    price::{PriceObservation, PricePoint},
    purchase::{PurchaseRecord, PurchaseRequest},
    settings::Settings,
    valuation::{PortfolioSnapshot, TransitionSeries},
};
use providers::{config::ProviderConfig, registry::PriceSourceRegistry};
use repository::traits::{AssetCatalogWriter, PriceSeriesWriter, PurchaseLedgerWriter};
use services::{
    holdings_service::HoldingsService, ledger_service::LedgerService, price_service::PriceService,
    snapshot_service::SnapshotService,
};
use storage::manager::StorageManager;

use errors::CoreError;

/// Main entry point for the portfolio valuation library.
/// Holds the portfolio state and all services needed to operate on it.
#[must_use]
pub struct PortfolioTracker {
    portfolio: Portfolio,
    ledger_service: LedgerService,
    snapshot_service: SnapshotService,
    price_service: PriceService,
    provider_config: ProviderConfig,
    storage: StorageManager,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("purchases", &self.portfolio.ledger.len())
            .field("assets", &self.portfolio.catalog.len())
            .field("prices", &self.portfolio.prices.total_entries())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PortfolioTracker {
    /// Create a brand new empty portfolio. Provider settings come from the environment.
    pub fn create_new() -> Self {
        Self::build(Portfolio::default(), ProviderConfig::from_env(), StorageManager::new())
    }

    /// Load an existing portfolio from encrypted bytes (password required).
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let storage = StorageManager::new();
        let portfolio = storage.load_from_bytes(encrypted, password)?;
        Ok(Self::build(portfolio, ProviderConfig::from_env(), storage))
    }

    /// Save the current portfolio to encrypted bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = self.storage.save_to_bytes(&self.portfolio, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from an encrypted file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>, password: &str) -> Result<Self, CoreError> {
        let storage = StorageManager::new();
        let portfolio = storage.load_from_file(path, password)?;
        Ok(Self::build(portfolio, ProviderConfig::from_env(), storage))
    }

    /// Save to an encrypted file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: impl AsRef<std::path::Path>, password: &str) -> Result<(), CoreError> {
        self.storage.save_to_file(&self.portfolio, path, password)?;
        self.dirty = false;
        Ok(())
    }

    /// Replace the provider settings and rebuild the default sources.
    pub fn with_provider_config(mut self, config: ProviderConfig) -> Self {
        self.provider_config = config;
        self.rebuild_sources();
        self
    }

    /// Replace the price sources entirely (e.g., with a local feed).
    /// Changing API keys afterwards restores the default sources.
    pub fn with_registry(mut self, registry: PriceSourceRegistry) -> Self {
        self.price_service = PriceService::new(registry);
        self
    }

    /// Use a different storage manager (e.g., custom KDF costs) for saving.
    pub fn with_storage(mut self, storage: StorageManager) -> Self {
        self.storage = storage;
        self
    }

    // ── Asset Catalog ───────────────────────────────────────────────

    /// Add or replace an asset's metadata.
    pub fn register_asset(&mut self, descriptor: AssetDescriptor) -> Result<(), CoreError> {
        if descriptor.asset_code.is_empty() {
            return Err(CoreError::ValidationError("Asset code must not be empty".into()));
        }
        if descriptor.name.trim().is_empty() {
            return Err(CoreError::ValidationError(format!(
                "Asset {} needs a display name",
                descriptor.asset_code
            )));
        }
        self.portfolio.catalog.upsert_descriptor(descriptor)?;
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn get_asset(&self, asset_code: &str) -> Option<&AssetDescriptor> {
        self.portfolio.catalog.get(asset_code)
    }

    #[must_use]
    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.portfolio.catalog.descriptors
    }

    #[must_use]
    pub fn assets_in_category(&self, category_id: CategoryId) -> Vec<&AssetDescriptor> {
        self.portfolio.catalog.in_category(category_id)
    }

    // ── Purchases ───────────────────────────────────────────────────

    /// Record a buy; a missing unit count or amount is derived from that day's price.
    pub fn record_purchase(&mut self, request: &PurchaseRequest) -> Result<PurchaseRecord, CoreError> {
        let record = self.ledger_service.record_purchase(
            &mut self.portfolio.ledger,
            &self.portfolio.catalog,
            &self.portfolio.prices,
            request,
        )?;
        self.dirty = true;
        Ok(record)
    }

    /// All purchases in insertion order, or those of one asset.
    #[must_use]
    pub fn get_purchases(&self, asset_code: Option<&str>) -> Vec<PurchaseRecord> {
        self.portfolio.ledger.filter(asset_code)
    }

    #[must_use]
    pub fn purchase_count(&self) -> usize {
        self.portfolio.ledger.len()
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Insert or replace one daily price.
    pub fn upsert_price(&mut self, asset_code: &str, date: NaiveDate, price: i64) -> Result<(), CoreError> {
        if price < 0 {
            return Err(CoreError::ValidationError(format!(
                "Price of {asset_code} on {date} must be non-negative, got {price}"
            )));
        }
        self.portfolio
            .prices
            .upsert_price(PriceObservation::new(asset_code, date, price))?;
        self.dirty = true;
        Ok(())
    }

    /// Stored prices in `[from, to]`; `None` leaves that side open.
    #[must_use]
    pub fn get_prices(&self, asset_code: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<PricePoint> {
        self.portfolio.prices.range(asset_code, from, to)
    }

    /// The most recent `n` stored prices, oldest first.
    #[must_use]
    pub fn latest_prices(&self, asset_code: &str, n: usize) -> Vec<PricePoint> {
        self.portfolio.prices.latest_n(asset_code, n)
    }

    #[must_use]
    pub fn price_entry_count(&self) -> usize {
        self.portfolio.prices.total_entries()
    }

    /// Drop stored prices older than `before`. Returns the number removed.
    pub fn prune_prices_before(&mut self, before: NaiveDate) -> usize {
        let removed = self.portfolio.prices.prune_before(before);
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Fetch `[from, to]` for one registered asset from its sources and store it.
    /// Returns the number of prices written.
    pub async fn ingest_prices(
        &mut self,
        asset_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<usize, CoreError> {
        let asset = self
            .portfolio
            .catalog
            .get(asset_code)
            .cloned()
            .ok_or_else(|| CoreError::AssetNotFound(normalize_code(asset_code)))?;

        let written = self
            .price_service
            .ingest(&mut self.portfolio.prices, &asset, from, to)
            .await?;
        if written > 0 {
            self.dirty = true;
        }
        Ok(written)
    }

    /// Ingest `[from, to]` for every priced asset that has purchases.
    /// Stops at the first failing asset.
    pub async fn refresh_prices(&mut self, from: NaiveDate, to: NaiveDate) -> Result<usize, CoreError> {
        let positions = self
            .snapshot_service
            .positions(&self.portfolio.ledger, &self.portfolio.catalog)?;

        let priced: Vec<String> = positions
            .into_iter()
            .filter(|p| p.asset.instrument_type.is_priced())
            .map(|p| p.asset.asset_code)
            .collect();

        let mut total = 0;
        for asset_code in &priced {
            total += self.ingest_prices(asset_code, from, to).await?;
        }
        info!("Refreshed prices for {} priced assets, {total} points written", priced.len());
        Ok(total)
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value every holding using prices up to `as_of` and roll up by category.
    pub fn snapshot(&self, as_of: NaiveDate) -> Result<PortfolioSnapshot, CoreError> {
        self.snapshot_service.snapshot(
            &self.portfolio.ledger,
            &self.portfolio.catalog,
            &self.portfolio.prices,
            as_of,
        )
    }

    /// Trailing value/profit series; `None` uses the window from settings.
    pub fn transition(&self, window: Option<usize>) -> Result<TransitionSeries, CoreError> {
        self.snapshot_service.transition(
            &self.portfolio.ledger,
            &self.portfolio.catalog,
            &self.portfolio.prices,
            window.unwrap_or(self.portfolio.settings.transition_window),
        )
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Set the default number of trading days in the transition series.
    pub fn set_transition_window(&mut self, window: usize) -> Result<(), CoreError> {
        if window == 0 {
            return Err(CoreError::ValidationError(
                "Transition window must be at least one trading day".into(),
            ));
        }
        self.portfolio.settings.transition_window = window;
        self.dirty = true;
        Ok(())
    }

    /// Set an API key for a source (e.g., "rapidapi").
    /// Rebuilds the source registry so the new key takes effect immediately.
    pub fn set_api_key(&mut self, source: String, key: String) {
        self.portfolio.settings.api_keys.insert(source, key);
        self.rebuild_sources();
        self.dirty = true;
    }

    /// Remove an API key for a source.
    pub fn remove_api_key(&mut self, source: &str) -> bool {
        let removed = self.portfolio.settings.api_keys.remove(source).is_some();
        if removed {
            self.rebuild_sources();
            self.dirty = true;
        }
        removed
    }

    // ── Password & Dirty State ──────────────────────────────────────

    /// Re-encrypt the portfolio with a new password.
    ///
    /// `last_saved_bytes` must be the most recently saved encrypted bytes;
    /// the current password is verified by decrypting them.
    pub fn change_password(
        &mut self,
        last_saved_bytes: &[u8],
        current_password: &str,
        new_password: &str,
    ) -> Result<Vec<u8>, CoreError> {
        self.storage.load_from_bytes(last_saved_bytes, current_password)?;
        let new_bytes = self.storage.save_to_bytes(&self.portfolio, new_password)?;
        self.dirty = false;
        Ok(new_bytes)
    }

    /// Returns `true` if the portfolio has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the purchase ledger as a JSON array.
    pub fn export_purchases_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio.ledger.records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize purchases to JSON: {e}")))
    }

    /// Import purchases from a JSON array, all-or-nothing.
    /// Every record must name a registered asset and carry non-negative quantities
    /// (equal for cash). The resulting holdings must stay within the `i64` range.
    /// Returns the number of purchases imported.
    pub fn import_purchases_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let records: Vec<PurchaseRecord> = serde_json::from_str(json)?;

        for record in &records {
            let Some(asset) = self.portfolio.catalog.get(&record.asset_code) else {
                return Err(CoreError::AssetNotFound(record.asset_code.clone()));
            };
            if record.unit_count < 0 || record.amount_paid < 0 {
                return Err(CoreError::ValidationError(format!(
                    "Imported purchase of {} on {} has negative quantities",
                    record.asset_code, record.date
                )));
            }
            if !asset.instrument_type.is_priced() && record.unit_count != record.amount_paid {
                return Err(CoreError::ValidationError(format!(
                    "Imported cash purchase of {} on {} must have equal units and amount",
                    record.asset_code, record.date
                )));
            }
        }

        let records: Vec<PurchaseRecord> = records
            .into_iter()
            .map(|r| PurchaseRecord::new(&r.asset_code, r.date, r.unit_count, r.amount_paid))
            .collect();

        let mut combined = self.portfolio.ledger.records.clone();
        combined.extend(records.iter().cloned());
        HoldingsService::new().aggregate(&combined)?;

        let count = records.len();
        for record in records {
            self.portfolio.ledger.record_purchase(record)?;
        }
        if count > 0 {
            self.dirty = true;
        }
        Ok(count)
    }

    /// Export a snapshot as JSON (unencrypted, for display).
    pub fn snapshot_to_json(&self, as_of: NaiveDate) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.snapshot(as_of)?)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))
    }

    // ── Source Availability ─────────────────────────────────────────

    /// Check if at least one price source is available for an instrument type.
    #[must_use]
    pub fn is_source_available(&self, instrument: InstrumentType) -> bool {
        self.price_service.has_source_for(instrument)
    }

    /// Names of the sources for an instrument type, in fallback order.
    #[must_use]
    pub fn source_names(&self, instrument: InstrumentType) -> Vec<String> {
        self.price_service.source_names(instrument)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio, provider_config: ProviderConfig, storage: StorageManager) -> Self {
        let registry = PriceSourceRegistry::new_with_defaults(&portfolio.settings.api_keys, &provider_config);
        Self {
            portfolio,
            ledger_service: LedgerService::new(),
            snapshot_service: SnapshotService::new(),
            price_service: PriceService::new(registry),
            provider_config,
            storage,
            dirty: false,
        }
    }

    fn rebuild_sources(&mut self) {
        let registry =
            PriceSourceRegistry::new_with_defaults(&self.portfolio.settings.api_keys, &self.provider_config);
        self.price_service = PriceService::new(registry);
    }
}
