pub mod asset;
pub mod catalog;
pub mod category;
pub mod holdings;
pub mod portfolio;
pub mod price;
pub mod purchase;
pub mod settings;
pub mod valuation;
