use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::asset::InstrumentType;
use crate::models::price::PricePoint;
use super::traits::PriceSource;

const SOURCE_NAME: &str = "Yahoo Finance";

/// Yahoo Finance provider for equity prices.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices.
/// - **Price**: adjusted close, rounded to the smallest currency unit.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's
/// public endpoints.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| api_error(format!(
            "Failed to create connector: {e}"
        )))?;
        Ok(Self { connector })
    }

    /// Midnight UTC of `date` as a `time::OffsetDateTime`.
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let month = time::Month::try_from(date.month() as u8)
            .map_err(|e| api_error(format!("Invalid month in {date}: {e}")))?;
        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| api_error(format!("Invalid date {date}: {e}")))?
            .midnight()
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: SOURCE_NAME.into(),
        message,
    }
}

#[async_trait]
impl PriceSource for YahooFinanceProvider {
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
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to + chrono::Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(asset_code, start, end)
            .await
            .map_err(|e| api_error(format!("Failed to fetch history for {asset_code}: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| api_error(format!("Failed to parse quotes for {asset_code}: {e}")))?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .filter(|q| q.adjclose.is_finite())
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp as i64)?;
                (date >= from && date <= to).then(|| PricePoint::new(date, q.adjclose.round() as i64))
            })
            .collect();

        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Ok(points)
    }
}
