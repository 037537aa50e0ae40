use chrono::NaiveDate;
use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::asset::AssetDescriptor;
use crate::models::holdings::{HoldingsSummary, Position};
use crate::models::price::PricePoint;
use crate::models::valuation::{DataCondition, ValuationResult};
use crate::repository::traits::PriceSeriesReader;

/// Turns holdings plus a price series into present value and day-over-day deltas.
///
/// Valuation rules:
/// - Cash is worth its unit count; no price is looked up.
/// - Otherwise the latest observation on or before the trading date is P1 and
///   the one before it is P0. `present_value = round(P1 * units / basis)`.
/// - Yesterday's value uses yesterday's units: purchases dated on P1's date are
///   excluded, since they could not have been part of the prior valuation.
/// - The delta ratio is relative to P0: 100 → 110 is `10.0`.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value one asset against an ascending price series.
    ///
    /// Observations after `latest_trading_date` are ignored. Short or missing
    /// history degrades the result (undefined deltas, zero value) and is
    /// recorded in `conditions`.
    ///
    /// Prior-day units drop only purchases dated on P1's date. When the
    /// latest purchase is older than P1, nothing is dropped and the delta is
    /// pure price movement on the full holding. Purchases dated after P1 but
    /// on or before `latest_trading_date` count on both days.
    pub fn valuate(
        &self,
        holdings: &HoldingsSummary,
        asset: &AssetDescriptor,
        price_series: &[PricePoint],
        latest_trading_date: NaiveDate,
    ) -> ValuationResult {
        let instrument = asset.instrument_type;
        let mut result = ValuationResult {
            asset_code: asset.asset_code.clone(),
            asset_name: asset.name.clone(),
            category_id: asset.category_id,
            instrument_type: instrument,
            total_units: holdings.total_units,
            total_amount_paid: holdings.total_amount_paid,
            present_value: 0,
            present_value_delta: None,
            current_price: None,
            price_delta: None,
            price_delta_ratio_percent: None,
            price_date: None,
            average_unit_price: 0.0,
            conditions: Vec::new(),
        };

        if !holdings.has_units() {
            warn!("{}: no units held, average price reported as 0", asset.asset_code);
            result.conditions.push(DataCondition::ZeroHoldings {
                asset_code: asset.asset_code.clone(),
            });
        }

        if !instrument.is_priced() {
            result.present_value = holdings.total_units;
            return result;
        }

        result.average_unit_price =
            instrument.average_unit_price(holdings.total_amount_paid, holdings.total_units);

        let visible = &price_series[..price_series.partition_point(|p| p.date <= latest_trading_date)];

        match visible {
            [] => {
                warn!(
                    "{}: no price observation on or before {latest_trading_date}",
                    asset.asset_code
                );
                result.conditions.push(DataCondition::NoPriceHistory {
                    asset_code: asset.asset_code.clone(),
                });
            }
            [.., prior, current] => {
                result.present_value = instrument.value_of(current.price, holdings.total_units);
                result.current_price = Some(current.price);
                result.price_date = Some(current.date);

                // Keyed on P1's date, not on the latest purchase date.
                let prior_units = holdings.total_units_excluding_date(current.date);
                let prior_value = instrument.value_of(prior.price, prior_units);
                let price_delta = current.price - prior.price;

                result.present_value_delta = Some(result.present_value - prior_value);
                result.price_delta = Some(price_delta);
                result.price_delta_ratio_percent = (prior.price != 0)
                    .then(|| (price_delta as f64 * 100.0) / prior.price as f64);
            }
            [only] => {
                warn!(
                    "{}: single price observation, day-over-day deltas undefined",
                    asset.asset_code
                );
                result.present_value = instrument.value_of(only.price, holdings.total_units);
                result.current_price = Some(only.price);
                result.price_date = Some(only.date);
                result.conditions.push(DataCondition::ShortPriceHistory {
                    asset_code: asset.asset_code.clone(),
                    available: 1,
                    required: 2,
                });
            }
        }

        debug!(
            "Valued {} ({}): units={} price={:?} value={}",
            asset.asset_code, instrument, holdings.total_units, result.current_price, result.present_value
        );
        result
    }

    /// Value a resolved position.
    pub fn valuate_position(
        &self,
        position: &Position,
        price_series: &[PricePoint],
        latest_trading_date: NaiveDate,
    ) -> ValuationResult {
        self.valuate(&position.holdings, &position.asset, price_series, latest_trading_date)
    }

    /// Value one asset, reading its prices from a store.
    /// Cash never touches the store.
    pub fn valuate_from_store(
        &self,
        position: &Position,
        prices: &dyn PriceSeriesReader,
        latest_trading_date: NaiveDate,
    ) -> Result<ValuationResult, CoreError> {
        if !position.asset.instrument_type.is_priced() {
            return Ok(self.valuate_position(position, &[], latest_trading_date));
        }
        let series = prices.fetch_prices(&position.asset.asset_code, None, Some(latest_trading_date))?;
        Ok(self.valuate_position(position, &series, latest_trading_date))
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
