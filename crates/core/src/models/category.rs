use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Number of categories in the taxonomy.
pub const CATEGORY_COUNT: usize = 8;

/// One entry of the category taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: u8,
    pub name: &'static str,
}

/// The category taxonomy, ordered by id. Shared by catalog validation and rollups.
pub const CATEGORY_TAXONOMY: [Category; CATEGORY_COUNT] = [
    Category { id: 1, name: "Domestic Equity" },
    Category { id: 2, name: "Developed-Market Equity" },
    Category { id: 3, name: "Emerging-Market Equity" },
    Category { id: 4, name: "Developed-Market Bonds" },
    Category { id: 5, name: "Emerging-Market Bonds" },
    Category { id: 6, name: "Commodities" },
    Category { id: 7, name: "Crypto Assets" },
    Category { id: 8, name: "Cash" },
];

/// A validated category id in `1..=CATEGORY_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CategoryId(u8);

impl CategoryId {
    pub fn new(id: u8) -> Result<Self, CoreError> {
        if id == 0 || usize::from(id) > CATEGORY_COUNT {
            return Err(CoreError::ValidationError(format!(
                "Category id {id} is outside 1..={CATEGORY_COUNT}"
            )));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position of this category in bucket arrays.
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    pub fn name(self) -> &'static str {
        CATEGORY_TAXONOMY[self.index()].name
    }

    /// All category ids in taxonomy order.
    pub fn all() -> impl Iterator<Item = CategoryId> {
        CATEGORY_TAXONOMY.iter().map(|c| CategoryId(c.id))
    }
}

impl TryFrom<u8> for CategoryId {
    type Error = CoreError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<CategoryId> for u8 {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
