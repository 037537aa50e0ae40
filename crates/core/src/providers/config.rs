use std::time::Duration;

/// Default endpoint of the broker's fund price-history page.
pub const DEFAULT_BROKER_HISTORY_URL: &str =
    "https://site0.sbisec.co.jp/marble/fund/history/standardprice.do";

/// Default RapidAPI host for the Yahoo Finance chart endpoint.
pub const DEFAULT_RAPIDAPI_HOST: &str = "apidojo-yahoo-finance-v1.p.rapidapi.com";

/// Connection settings handed to price sources at construction time.
///
/// The valuation engine takes no configuration; only the I/O adapters do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Broker price-history page (fund code appended as a query parameter)
    pub broker_history_url: String,
    /// Rows requested per scraped page
    pub broker_rows_per_page: u32,
    /// Pages fetched at most per ingestion
    pub broker_max_pages: u32,
    /// Pause between page requests
    pub broker_page_delay: Duration,
    pub rapidapi_host: String,
    /// Fallback RapidAPI key when none is stored in settings
    pub rapidapi_key: Option<String>,
    /// Market region passed to the chart endpoint (e.g., "JP", "US")
    pub chart_region: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            broker_history_url: DEFAULT_BROKER_HISTORY_URL.to_string(),
            broker_rows_per_page: 100,
            broker_max_pages: 3,
            broker_page_delay: Duration::from_secs(5),
            rapidapi_host: DEFAULT_RAPIDAPI_HOST.to_string(),
            rapidapi_key: None,
            chart_region: "US".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by `PVC_BROKER_HISTORY_URL`, `PVC_HTTP_TIMEOUT_SECS`,
    /// `PVC_BROKER_PAGE_DELAY_MS`, `PVC_CHART_REGION` and `RAPIDAPI_KEY` when set.
    /// Unparseable numbers are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PVC_BROKER_HISTORY_URL") {
            config.broker_history_url = url;
        }
        if let Some(secs) = env_number("PVC_HTTP_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = env_number("PVC_BROKER_PAGE_DELAY_MS") {
            config.broker_page_delay = Duration::from_millis(millis);
        }
        if let Ok(region) = std::env::var("PVC_CHART_REGION") {
            config.chart_region = region;
        }
        if let Ok(key) = std::env::var("RAPIDAPI_KEY") {
            if !key.trim().is_empty() {
                config.rapidapi_key = Some(key);
            }
        }
        config
    }
}

fn env_number(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}
