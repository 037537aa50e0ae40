use serde::{Deserialize, Serialize};

use super::category::CategoryId;
use crate::errors::CoreError;

/// Basis factor for investment trusts: their prices are quoted per 10,000 units.
pub const INVESTMENT_TRUST_BASIS: i64 = 10_000;

/// The kind of instrument an asset is.
/// Determines the basis factor and whether a price series is needed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    /// Ordinary listed equity, quoted per unit
    Equity,
    /// Investment trust (mutual fund), quoted per 10,000 units
    InvestmentTrust,
    /// Cash: units and currency share the same scale, no price series
    Cash,
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentType::Equity => write!(f, "Equity"),
            InstrumentType::InvestmentTrust => write!(f, "InvestmentTrust"),
            InstrumentType::Cash => write!(f, "Cash"),
        }
    }
}

impl InstrumentType {
    /// Scaling constant between a quoted price and the currency value of one held unit.
    pub const fn basis_factor(&self) -> i64 {
        match self {
            InstrumentType::InvestmentTrust => INVESTMENT_TRUST_BASIS,
            InstrumentType::Equity | InstrumentType::Cash => 1,
        }
    }

    /// Whether valuation needs a price series. Cash never does.
    pub const fn is_priced(&self) -> bool {
        !matches!(self, InstrumentType::Cash)
    }

    /// Currency value of `units` at `price`: `round(price * units / basis)`.
    pub fn value_of(&self, price: i64, units: i64) -> i64 {
        round_half_away(
            i128::from(price) * i128::from(units),
            i128::from(self.basis_factor()),
        )
    }

    /// Units bought for `amount` at `price`: `round(amount * basis / price)`.
    /// Returns `None` when `price` is zero.
    pub fn units_for_amount(&self, amount: i64, price: i64) -> Option<i64> {
        if price == 0 {
            return None;
        }
        Some(round_half_away(
            i128::from(amount) * i128::from(self.basis_factor()),
            i128::from(price),
        ))
    }

    /// Average acquisition price in quoted units: `basis * amount_paid / units`.
    /// Zero units yields the `0.0` sentinel instead of a division fault.
    pub fn average_unit_price(&self, amount_paid: i64, units: i64) -> f64 {
        if units == 0 {
            return 0.0;
        }
        (self.basis_factor() as f64) * (amount_paid as f64) / (units as f64)
    }
}

/// Integer division rounding half away from zero.
///
/// Every currency-scale conversion in the crate goes through here so that
/// value and unit derivations round the same way. Saturates at the `i64` bounds.
pub fn round_half_away(numerator: i128, denominator: i128) -> i64 {
    if denominator == 0 {
        return 0;
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let rounded = if 2 * remainder.abs() >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    };
    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}

/// `lhs + rhs` for unit and currency totals, failing instead of wrapping.
pub fn checked_total(lhs: i64, rhs: i64, what: &str) -> Result<i64, CoreError> {
    lhs.checked_add(rhs)
        .ok_or_else(|| CoreError::ValidationError(format!("{what} exceeds the supported range")))
}

/// Canonical form of an asset code: trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Catalog entry describing one asset.
///
/// **Equality and hashing** are based solely on `asset_code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Ticker or fund code, normalized (e.g., "VOO", "89311199")
    pub asset_code: String,

    /// Category bucket this asset rolls up into
    pub category_id: CategoryId,

    /// Human-readable name
    pub name: String,

    /// Determines basis factor and pricing
    pub instrument_type: InstrumentType,
}

impl PartialEq for AssetDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.asset_code == other.asset_code
    }
}

impl Eq for AssetDescriptor {}

impl std::hash::Hash for AssetDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.asset_code.hash(state);
    }
}

impl AssetDescriptor {
    pub fn new(
        asset_code: impl AsRef<str>,
        category_id: CategoryId,
        name: impl Into<String>,
        instrument_type: InstrumentType,
    ) -> Self {
        Self {
            asset_code: normalize_code(asset_code.as_ref()),
            category_id,
            name: name.into(),
            instrument_type,
        }
    }

    pub fn equity(asset_code: impl AsRef<str>, category_id: CategoryId, name: impl Into<String>) -> Self {
        Self::new(asset_code, category_id, name, InstrumentType::Equity)
    }

    pub fn investment_trust(
        asset_code: impl AsRef<str>,
        category_id: CategoryId,
        name: impl Into<String>,
    ) -> Self {
        Self::new(asset_code, category_id, name, InstrumentType::InvestmentTrust)
    }

    pub fn cash(asset_code: impl AsRef<str>, category_id: CategoryId, name: impl Into<String>) -> Self {
        Self::new(asset_code, category_id, name, InstrumentType::Cash)
    }

    pub fn basis_factor(&self) -> i64 {
        self.instrument_type.basis_factor()
    }
}
