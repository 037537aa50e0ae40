use serde::{Deserialize, Serialize};

use super::asset::{normalize_code, AssetDescriptor};
use super::category::CategoryId;

/// Asset metadata keyed by asset code.
///
/// Upserts keep one descriptor per code. Data loaded from elsewhere may
/// still carry duplicates; lookups return the first match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetCatalog {
    pub descriptors: Vec<AssetDescriptor>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, asset_code: &str) -> Option<&AssetDescriptor> {
        let code = normalize_code(asset_code);
        self.descriptors.iter().find(|d| d.asset_code == code)
    }

    /// Insert a new descriptor or replace the first one with the same code.
    pub fn upsert(&mut self, descriptor: AssetDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.asset_code == descriptor.asset_code)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn in_category(&self, category_id: CategoryId) -> Vec<&AssetDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.category_id == category_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
