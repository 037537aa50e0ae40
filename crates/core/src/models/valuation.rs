use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::asset::InstrumentType;
use super::category::CategoryId;

/// A data condition noticed while valuing the portfolio.
///
/// These degrade results (zero sentinels, missing deltas, shorter series)
/// but never fail a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataCondition {
    /// No units held, average price reported as 0
    ZeroHoldings { asset_code: String },
    /// Priced asset without any observation on or before the valuation date
    NoPriceHistory { asset_code: String },
    /// Fewer observations than needed (2 for day-over-day, the window for transitions)
    ShortPriceHistory {
        asset_code: String,
        available: usize,
        required: usize,
    },
}

impl std::fmt::Display for DataCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataCondition::ZeroHoldings { asset_code } => {
                write!(f, "{asset_code}: no units held")
            }
            DataCondition::NoPriceHistory { asset_code } => {
                write!(f, "{asset_code}: no price history")
            }
            DataCondition::ShortPriceHistory {
                asset_code,
                available,
                required,
            } => write!(
                f,
                "{asset_code}: {available} price observations available, {required} required"
            ),
        }
    }
}

/// Valuation of one held asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub asset_code: String,
    pub asset_name: String,
    pub category_id: CategoryId,
    pub instrument_type: InstrumentType,

    pub total_units: i64,
    pub total_amount_paid: i64,

    /// `round(current_price * total_units / basis)`; cash: its unit count
    pub present_value: i64,

    /// Present value minus yesterday's value of yesterday's units.
    /// `None` for cash and with fewer than two observations.
    pub present_value_delta: Option<i64>,

    /// Latest observed price; `None` for cash or without history
    pub current_price: Option<i64>,

    /// `current_price - prior_price`
    pub price_delta: Option<i64>,

    /// `(current - prior) / prior * 100`
    pub price_delta_ratio_percent: Option<f64>,

    /// Date of the price used for `current_price`
    pub price_date: Option<NaiveDate>,

    /// `basis * total_amount_paid / total_units`, 0 for cash or zero units
    pub average_unit_price: f64,

    /// Conditions that degraded this result
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<DataCondition>,
}

impl ValuationResult {
    /// Unrealized gain against everything paid.
    pub fn profit(&self) -> i64 {
        self.present_value - self.total_amount_paid
    }
}

/// Portfolio totals for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category_id: CategoryId,
    pub category_name: String,
    pub present_value: i64,
    pub total_amount_paid: i64,
}

/// One day of the transition series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPoint {
    pub date: NaiveDate,
    /// Sum of every asset's value at that day's price
    pub total_value: i64,
    /// `total_value` minus everything ever paid (not a point-in-time P&L)
    pub total_profit: i64,
}

/// Trailing portfolio value/profit curve, oldest day first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionSeries {
    pub points: Vec<TransitionPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<DataCondition>,
}

impl TransitionSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Point-in-time view of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Latest trading date considered for prices
    pub as_of_date: NaiveDate,

    /// Per-asset valuations, ordered by asset code
    pub details: Vec<ValuationResult>,

    /// One bucket per category, in category-id order
    pub categories: Vec<CategoryBucket>,

    pub total_present_value: i64,
    pub total_amount_paid: i64,

    /// Sum of the defined per-asset day-over-day deltas
    pub total_present_value_delta: i64,
}

impl PortfolioSnapshot {
    pub fn total_profit(&self) -> i64 {
        self.total_present_value - self.total_amount_paid
    }

    /// Every data condition reported by the per-asset valuations.
    pub fn conditions(&self) -> impl Iterator<Item = &DataCondition> {
        self.details.iter().flat_map(|d| d.conditions.iter())
    }

    pub fn detail(&self, asset_code: &str) -> Option<&ValuationResult> {
        let code = super::asset::normalize_code(asset_code);
        self.details.iter().find(|d| d.asset_code == code)
    }
}
