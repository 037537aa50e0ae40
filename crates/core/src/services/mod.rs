pub mod holdings_service;
pub mod ledger_service;
pub mod price_service;
pub mod rollup_service;
pub mod snapshot_service;
pub mod transition_service;
pub mod valuation_service;
