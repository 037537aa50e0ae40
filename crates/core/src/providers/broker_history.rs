use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::errors::CoreError;
use crate::models::asset::InstrumentType;
use crate::models::price::PricePoint;
use super::config::ProviderConfig;
use super::traits::PriceSource;

const SOURCE_NAME: &str = "Broker price history";

/// The browser-like agent the history page expects.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome";

/// Scrapes a broker's fund price-history page for investment-trust prices.
///
/// - **Free**: no API key, but the page is HTML meant for browsers.
/// - **Paging**: `rows_per_page` rows per POST, at most `max_pages` pages,
///   with a pause between requests.
/// - **Encoding**: detected per response (the page is usually Shift_JIS).
///
/// The markup is treated as untrusted: anything that does not parse into
/// a `(date, price)` pair fails the page with `CoreError::Parse`.
pub struct BrokerHistoryScraper {
    client: Client,
    config: ProviderConfig,
}

impl BrokerHistoryScraper {
    pub fn new(config: ProviderConfig) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// Form fields for one page of the history query.
    fn form_params(&self, from: NaiveDate, to: NaiveDate, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("in_term_from_yyyy", from.year().to_string()),
            ("in_term_from_mm", format!("{:02}", from.month())),
            ("in_term_from_dd", format!("{:02}", from.day())),
            ("in_term_to_yyyy", to.year().to_string()),
            ("in_term_to_mm", format!("{:02}", to.month())),
            ("in_term_to_dd", format!("{:02}", to.day())),
            ("dispRows", self.config.broker_rows_per_page.to_string()),
            ("page", page.to_string()),
        ]
    }

    async fn fetch_page(
        &self,
        fund_code: &str,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let bytes = self
            .client
            .post(&self.config.broker_history_url)
            .query(&[("fund_sec_code", fund_code)])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&self.form_params(from, to, page))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        parse_history_page(&decode_page(&bytes))
    }
}

/// Decode a response body using its detected character encoding.
pub fn decode_page(bytes: &[u8]) -> String {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Malformed {} sequences replaced while decoding page", encoding.name());
    }
    text.into_owned()
}

/// Extract `(date, price)` rows from a price-history page.
///
/// Dates sit in `div.alC` cells as `YYYY/MM/DD`. Prices are every third
/// `div.alR` cell (the others hold day-over-day change and net assets),
/// written like `12,345円`. Rows come back oldest first.
pub fn parse_history_page(html: &str) -> Result<Vec<PricePoint>, CoreError> {
    let document = Html::parse_document(html);
    let date_cells = selector("div.alC")?;
    let value_cells = selector("div.alR")?;

    let dates = document
        .select(&date_cells)
        .map(|cell| parse_date(&cell.text().collect::<String>()))
        .collect::<Result<Vec<_>, _>>()?;

    let prices = document
        .select(&value_cells)
        .step_by(3)
        .map(|cell| parse_price(&cell.text().collect::<String>()))
        .collect::<Result<Vec<_>, _>>()?;

    if dates.len() != prices.len() {
        return Err(parse_error(format!(
            "{} dates but {} prices on page",
            dates.len(),
            prices.len()
        )));
    }

    let mut points: Vec<PricePoint> = dates
        .into_iter()
        .zip(prices)
        .map(|(date, price)| PricePoint::new(date, price))
        .collect();
    points.sort_by_key(|p| p.date);
    Ok(points)
}

fn selector(css: &str) -> Result<Selector, CoreError> {
    Selector::parse(css).map_err(|e| parse_error(format!("invalid selector {css}: {e}")))
}

fn parse_date(text: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y/%m/%d")
        .map_err(|e| parse_error(format!("invalid date '{trimmed}': {e}")))
}

fn parse_price(text: &str) -> Result<i64, CoreError> {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '円') && !c.is_whitespace())
        .collect();
    digits
        .parse()
        .map_err(|e| parse_error(format!("invalid price '{}': {e}", text.trim())))
}

fn parse_error(message: String) -> CoreError {
    CoreError::Parse {
        source_name: SOURCE_NAME.into(),
        message,
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PriceSource for BrokerHistoryScraper {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn supported_instruments(&self) -> Vec<InstrumentType> {
        vec![InstrumentType::InvestmentTrust]
    }

    async fn fetch_history(
        &self,
        asset_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let mut points = Vec::new();

        for page in 0..self.config.broker_max_pages {
            if page > 0 {
                #[cfg(not(target_arch = "wasm32"))]
                tokio::time::sleep(self.config.broker_page_delay).await;
            }

            let rows = self.fetch_page(asset_code, from, to, page).await?;
            debug!("{asset_code}: page {page} returned {} rows", rows.len());
            // An empty page means the range is exhausted.
            if rows.is_empty() {
                break;
            }
            points.extend(rows);
        }

        points.retain(|p| p.date >= from && p.date <= to);
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);

        info!("{asset_code}: scraped {} prices between {from} and {to}", points.len());
        Ok(points)
    }
}
