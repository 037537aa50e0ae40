use log::{debug, warn};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::asset::checked_total;
use crate::models::holdings::Position;
use crate::models::price::PricePoint;
use crate::models::valuation::{DataCondition, TransitionPoint, TransitionSeries};

/// Builds the trailing portfolio value/profit curve.
///
/// Each priced asset contributes its most recent `window` observations.
/// Series are aligned on their latest observation and the portfolio curve
/// is cut to the shortest contributing series; day `i` of each asset is its
/// own i-th retained observation, so assets on different calendars may
/// disagree about what "day i" is. Date labels come from the first priced
/// position in the given order.
///
/// Profit on each day is that day's value minus the total ever paid, not
/// the amount paid as of that day.
pub struct TransitionService;

impl TransitionService {
    pub fn new() -> Self {
        Self
    }

    /// `price_series` maps asset code → ascending observations.
    /// Cash positions contribute their unit count on every day.
    pub fn build_transition(
        &self,
        positions: &[Position],
        price_series: &HashMap<String, Vec<PricePoint>>,
        window: usize,
    ) -> Result<TransitionSeries, CoreError> {
        if window == 0 {
            return Err(CoreError::ValidationError(
                "Transition window must be at least one day".into(),
            ));
        }

        let mut conditions = Vec::new();
        let mut cash_value = 0;
        let mut cash_paid = 0;
        let mut priced: Vec<(&Position, &[PricePoint])> = Vec::new();

        for position in positions {
            let code = &position.asset.asset_code;
            if !position.asset.instrument_type.is_priced() {
                cash_value = checked_total(cash_value, position.holdings.total_units, "Cash total")?;
                cash_paid = checked_total(cash_paid, position.holdings.total_amount_paid, "Cash total")?;
                continue;
            }

            let series = price_series.get(code).map(Vec::as_slice).unwrap_or(&[]);
            if series.is_empty() {
                warn!("{code}: no price history, left out of the transition series");
                conditions.push(DataCondition::NoPriceHistory {
                    asset_code: code.clone(),
                });
                continue;
            }

            let tail = &series[series.len().saturating_sub(window)..];
            if tail.len() < window {
                warn!("{code}: only {} of {window} trading days available", tail.len());
                conditions.push(DataCondition::ShortPriceHistory {
                    asset_code: code.clone(),
                    available: tail.len(),
                    required: window,
                });
            }
            priced.push((position, tail));
        }

        let Some(length) = priced.iter().map(|(_, tail)| tail.len()).min() else {
            debug!("No priced assets, transition series is empty");
            return Ok(TransitionSeries {
                points: Vec::new(),
                conditions,
            });
        };

        let (_, label_series) = priced[0];
        let label_offset = label_series.len() - length;

        let points = (0..length)
            .map(|i| {
                let mut total_value = cash_value;
                let mut total_profit = cash_value - cash_paid;
                for (position, tail) in &priced {
                    let point = tail[tail.len() - length + i];
                    let value = position
                        .asset
                        .instrument_type
                        .value_of(point.price, position.holdings.total_units);
                    total_value = checked_total(total_value, value, "Transition value")?;
                    total_profit = checked_total(
                        total_profit,
                        value - position.holdings.total_amount_paid,
                        "Transition profit",
                    )?;
                }
                Ok(TransitionPoint {
                    date: label_series[label_offset + i].date,
                    total_value,
                    total_profit,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        debug!(
            "Built transition series of {} days over {} priced assets",
            points.len(),
            priced.len()
        );
        Ok(TransitionSeries { points, conditions })
    }
}

impl Default for TransitionService {
    fn default() -> Self {
        Self::new()
    }
}
