use crate::errors::CoreError;
use crate::models::asset::{checked_total, AssetDescriptor};
use crate::models::category::{CategoryId, CATEGORY_COUNT};
use crate::models::valuation::{CategoryBucket, ValuationResult};

/// Sums present value and amount paid into category buckets.
pub struct RollupService;

impl RollupService {
    pub fn new() -> Self {
        Self
    }

    /// Roll valuations up into `category_count` buckets, ordered by category id.
    ///
    /// Every bucket exists even when nothing in that category is held. Each
    /// valuation lands in the bucket of its descriptor's category id.
    pub fn rollup<'a, I>(
        &self,
        valuations: I,
        category_count: usize,
    ) -> Result<Vec<CategoryBucket>, CoreError>
    where
        I: IntoIterator<Item = (&'a ValuationResult, &'a AssetDescriptor)>,
    {
        if category_count > CATEGORY_COUNT {
            return Err(CoreError::ValidationError(format!(
                "Category count {category_count} exceeds the taxonomy size {CATEGORY_COUNT}"
            )));
        }

        let mut buckets: Vec<CategoryBucket> = CategoryId::all()
            .take(category_count)
            .map(|category_id| CategoryBucket {
                category_id,
                category_name: category_id.name().to_string(),
                present_value: 0,
                total_amount_paid: 0,
            })
            .collect();

        for (valuation, asset) in valuations {
            let bucket = buckets.get_mut(asset.category_id.index()).ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "{} has category {} outside the first {category_count} categories",
                    asset.asset_code, asset.category_id
                ))
            })?;
            let what = format!("Category {} total", asset.category_id);
            bucket.present_value = checked_total(bucket.present_value, valuation.present_value, &what)?;
            bucket.total_amount_paid =
                checked_total(bucket.total_amount_paid, valuation.total_amount_paid, &what)?;
        }

        Ok(buckets)
    }
}

impl Default for RollupService {
    fn default() -> Self {
        Self::new()
    }
}
