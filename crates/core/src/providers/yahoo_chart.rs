use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::CoreError;
use crate::models::asset::InstrumentType;
use crate::models::price::PricePoint;
use super::config::ProviderConfig;
use super::traits::PriceSource;

const SOURCE_NAME: &str = "Yahoo Finance chart (RapidAPI)";

/// Chart ranges the endpoint accepts, with the calendar days each covers.
const RANGES: [(&str, i64); 8] = [
    ("5d", 5),
    ("1mo", 31),
    ("3mo", 92),
    ("6mo", 183),
    ("1y", 366),
    ("2y", 731),
    ("5y", 1827),
    ("10y", 3653),
];

/// Yahoo Finance daily chart via RapidAPI, for equities.
///
/// - **Requires**: RapidAPI key (settings key "rapidapi").
/// - **Data**: daily OHLC; the adjusted close is used as the price.
/// - **Dates**: shifted by the exchange's GMT offset so a Tokyo close
///   lands on the Tokyo trading date.
pub struct YahooChartProvider {
    client: Client,
    api_key: String,
    host: String,
    region: String,
}

impl YahooChartProvider {
    pub fn new(api_key: String, config: &ProviderConfig) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            host: config.rapidapi_host.clone(),
            region: config.chart_region.clone(),
        }
    }
}

// ── Chart API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Smallest chart range reaching back to `from`.
pub fn range_covering(from: NaiveDate, today: NaiveDate) -> &'static str {
    let days = (today - from).num_days();
    RANGES
        .iter()
        .find(|(_, span)| *span >= days)
        .map(|(name, _)| *name)
        .unwrap_or("max")
}

/// Normalize a chart response body into ascending daily prices.
///
/// Null closes (halted days) are skipped; prices are rounded to integers.
pub fn parse_chart(body: &str) -> Result<Vec<PricePoint>, CoreError> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| CoreError::Parse {
        source_name: SOURCE_NAME.into(),
        message: e.to_string(),
    })?;

    if let Some(error) = response.chart.error.filter(|e| !e.is_null()) {
        return Err(CoreError::Api {
            provider: SOURCE_NAME.into(),
            message: error.to_string(),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| CoreError::Api {
            provider: SOURCE_NAME.into(),
            message: "Chart response has no result".into(),
        })?;

    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut points: Vec<PricePoint> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PricePoint::new(date, close.round() as i64))
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    Ok(points)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PriceSource for YahooChartProvider {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn supported_instruments(&self) -> Vec<InstrumentType> {
        vec![InstrumentType::Equity]
    }

    async fn fetch_history(
        &self,
        asset_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let url = format!("https://{}/stock/v2/get-chart", self.host);

        let body = self
            .client
            .get(url)
            .query(&[
                ("interval", "1d"),
                ("symbol", asset_code),
                ("range", range_covering(from, today)),
                ("region", self.region.as_str()),
            ])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await?
            .text()
            .await?;

        let mut points = parse_chart(&body)?;
        points.retain(|p| p.date >= from && p.date <= to);
        Ok(points)
    }
}
