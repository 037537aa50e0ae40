use std::collections::HashMap;

use crate::models::asset::InstrumentType;

use super::broker_history::BrokerHistoryScraper;
use super::config::ProviderConfig;
use super::traits::PriceSource;
use super::yahoo_chart::YahooChartProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;

/// Settings key holding the RapidAPI key for the chart endpoint.
pub const RAPIDAPI_KEY_NAME: &str = "rapidapi";

/// Registry of all available price sources.
///
/// Routes requests to the correct source based on `InstrumentType`.
/// Registration order is fallback priority.
pub struct PriceSourceRegistry {
    sources: Vec<Box<dyn PriceSource>>,
}

impl PriceSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with all default sources pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>, config: &ProviderConfig) -> Self {
        let mut registry = Self::new();

        // Broker history page: investment trusts, no API key needed
        registry.register(Box::new(BrokerHistoryScraper::new(config.clone())));

        // Yahoo Finance: equities, no API key needed (primary)
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooFinanceProvider::new() {
                registry.register(Box::new(yahoo));
            }
        }

        // RapidAPI chart: equities, requires API key (fallback)
        let rapidapi_key = api_keys
            .get(RAPIDAPI_KEY_NAME)
            .cloned()
            .or_else(|| config.rapidapi_key.clone());
        if let Some(key) = rapidapi_key {
            registry.register(Box::new(YahooChartProvider::new(key, config)));
        }

        registry
    }

    /// Register a new price source.
    pub fn register(&mut self, source: Box<dyn PriceSource>) {
        self.sources.push(source);
    }

    /// Find the first source that supports the given instrument type.
    pub fn get_source_for(&self, instrument: InstrumentType) -> Option<&dyn PriceSource> {
        self.sources
            .iter()
            .find(|s| s.supported_instruments().contains(&instrument))
            .map(|s| s.as_ref())
    }

    /// Return ALL sources that support the given instrument type, in priority order.
    pub fn get_sources_for(&self, instrument: InstrumentType) -> Vec<&dyn PriceSource> {
        self.sources
            .iter()
            .filter(|s| s.supported_instruments().contains(&instrument))
            .map(|s| s.as_ref())
            .collect()
    }
}

impl Default for PriceSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
