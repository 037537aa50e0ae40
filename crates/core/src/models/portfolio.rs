use serde::{Deserialize, Serialize};

use super::catalog::AssetCatalog;
use super::price::PriceHistory;
use super::purchase::PurchaseLedger;
use super::settings::Settings;

/// The main data container. Everything in here gets serialized,
/// encrypted, and saved to the portable portfolio file.
///
/// Contains the purchase ledger, the price history, the asset catalog
/// and user settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    /// Every recorded buy, append-only
    pub ledger: PurchaseLedger,

    /// Daily prices per asset code
    pub prices: PriceHistory,

    /// Asset metadata
    pub catalog: AssetCatalog,

    /// User settings (API keys, transition window)
    pub settings: Settings,
}
