pub mod config;
pub mod registry;
pub mod traits;

// Price source implementations
pub mod broker_history;
pub mod yahoo_chart;
#[cfg(not(target_arch = "wasm32"))]
pub mod yahoo_finance;
