use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::asset::checked_total;
use crate::models::category::CATEGORY_COUNT;
use crate::models::holdings::Position;
use crate::models::valuation::{PortfolioSnapshot, TransitionSeries};
use crate::repository::traits::{AssetCatalogReader, PriceSeriesReader, PurchaseLedgerReader};
use crate::services::holdings_service::HoldingsService;
use crate::services::rollup_service::RollupService;
use crate::services::transition_service::TransitionService;
use crate::services::valuation_service::ValuationService;

/// Wires the engine to the stores: ledger + catalog → holdings → valuation
/// → category rollup (snapshot) or transition series (history).
///
/// Store failures propagate unchanged; nothing is retried here.
pub struct SnapshotService {
    holdings_service: HoldingsService,
    valuation_service: ValuationService,
    rollup_service: RollupService,
    transition_service: TransitionService,
}

impl SnapshotService {
    pub fn new() -> Self {
        Self {
            holdings_service: HoldingsService::new(),
            valuation_service: ValuationService::new(),
            rollup_service: RollupService::new(),
            transition_service: TransitionService::new(),
        }
    }

    /// Aggregate the ledger and pair each holding with its descriptor.
    pub fn positions(
        &self,
        ledger: &dyn PurchaseLedgerReader,
        catalog: &dyn AssetCatalogReader,
    ) -> Result<Vec<Position>, CoreError> {
        let records = ledger.fetch_purchases(None)?;
        let holdings = self.holdings_service.aggregate(&records)?;
        self.holdings_service.resolve_positions(holdings, catalog)
    }

    /// Value every held asset as of `as_of` and roll the results up by category.
    pub fn snapshot(
        &self,
        ledger: &dyn PurchaseLedgerReader,
        catalog: &dyn AssetCatalogReader,
        prices: &dyn PriceSeriesReader,
        as_of: NaiveDate,
    ) -> Result<PortfolioSnapshot, CoreError> {
        let positions = self.positions(ledger, catalog)?;

        let details = positions
            .iter()
            .map(|position| self.valuation_service.valuate_from_store(position, prices, as_of))
            .collect::<Result<Vec<_>, CoreError>>()?;

        let categories = self.rollup_service.rollup(
            details.iter().zip(positions.iter().map(|p| &p.asset)),
            CATEGORY_COUNT,
        )?;

        let total_present_value = details.iter().try_fold(0, |acc, d| {
            checked_total(acc, d.present_value, "Portfolio present value")
        })?;
        let total_amount_paid = details.iter().try_fold(0, |acc, d| {
            checked_total(acc, d.total_amount_paid, "Portfolio amount paid")
        })?;
        let total_present_value_delta = details
            .iter()
            .filter_map(|d| d.present_value_delta)
            .try_fold(0, |acc, delta| checked_total(acc, delta, "Portfolio value delta"))?;

        info!(
            "Snapshot as of {as_of}: {} assets, value {total_present_value}, paid {total_amount_paid}",
            details.len()
        );

        Ok(PortfolioSnapshot {
            as_of_date: as_of,
            details,
            categories,
            total_present_value,
            total_amount_paid,
            total_present_value_delta,
        })
    }

    /// Trailing value/profit curve over the last `window` trading days.
    pub fn transition(
        &self,
        ledger: &dyn PurchaseLedgerReader,
        catalog: &dyn AssetCatalogReader,
        prices: &dyn PriceSeriesReader,
        window: usize,
    ) -> Result<TransitionSeries, CoreError> {
        let positions = self.positions(ledger, catalog)?;

        let mut series = HashMap::new();
        for position in positions.iter().filter(|p| p.asset.instrument_type.is_priced()) {
            let code = &position.asset.asset_code;
            series.insert(code.clone(), prices.fetch_latest_n(code, window)?);
        }

        self.transition_service
            .build_transition(&positions, &series, window)
    }
}

impl Default for SnapshotService {
    fn default() -> Self {
        Self::new()
    }
}
