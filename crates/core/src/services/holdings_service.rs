use log::debug;
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::holdings::{HoldingsSummary, Position};
use crate::models::purchase::PurchaseRecord;
use crate::repository::traits::AssetCatalogReader;

/// Groups purchase records into per-asset holdings.
///
/// Pure business logic, no I/O. Summation only, so the result does not
/// depend on the order of the input records.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Sum units and amount paid per asset code.
    /// Returned map is ordered by asset code. Totals outside the `i64`
    /// range fail with `ValidationError`.
    pub fn aggregate(&self, records: &[PurchaseRecord]) -> Result<BTreeMap<String, HoldingsSummary>, CoreError> {
        let mut holdings: BTreeMap<String, HoldingsSummary> = BTreeMap::new();

        for record in records {
            holdings
                .entry(record.asset_code.clone())
                .or_insert_with(|| HoldingsSummary::new(record.asset_code.clone()))
                .add_purchase(record.date, record.unit_count, record.amount_paid)?;
        }

        debug!(
            "Aggregated {} purchase records into {} holdings",
            records.len(),
            holdings.len()
        );
        Ok(holdings)
    }

    /// Pair every holding with its catalog descriptor.
    ///
    /// An asset present in the ledger but missing from the catalog is a
    /// data-integrity fault and fails with `AssetNotFound`.
    pub fn resolve_positions(
        &self,
        holdings: BTreeMap<String, HoldingsSummary>,
        catalog: &dyn AssetCatalogReader,
    ) -> Result<Vec<Position>, CoreError> {
        holdings
            .into_values()
            .map(|summary| {
                let asset = catalog
                    .fetch_descriptor(&summary.asset_code)?
                    .ok_or_else(|| CoreError::AssetNotFound(summary.asset_code.clone()))?;
                Ok(Position::new(summary, asset))
            })
            .collect()
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
