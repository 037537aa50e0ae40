// ═══════════════════════════════════════════════════════════════════
// Engine Tests: holdings aggregation, valuation, category rollup,
// transition series
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::HashMap;

use portfolio_valuation_core::errors::CoreError;
use portfolio_valuation_core::models::asset::AssetDescriptor;
use portfolio_valuation_core::models::catalog::AssetCatalog;
use portfolio_valuation_core::models::category::{CategoryId, CATEGORY_COUNT};
use portfolio_valuation_core::models::holdings::{HoldingsSummary, Position};
use portfolio_valuation_core::models::price::PricePoint;
use portfolio_valuation_core::models::purchase::PurchaseRecord;
use portfolio_valuation_core::models::valuation::{DataCondition, ValuationResult};
use portfolio_valuation_core::repository::traits::PriceSeriesReader;
use portfolio_valuation_core::services::holdings_service::HoldingsService;
use portfolio_valuation_core::services::rollup_service::RollupService;
use portfolio_valuation_core::services::transition_service::TransitionService;
use portfolio_valuation_core::services::valuation_service::ValuationService;

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn cat(id: u8) -> CategoryId {
    CategoryId::new(id).unwrap()
}

fn series(points: &[(NaiveDate, i64)]) -> Vec<PricePoint> {
    points.iter().map(|&(date, price)| PricePoint::new(date, price)).collect()
}

fn holdings(code: &str, purchases: &[(NaiveDate, i64, i64)]) -> HoldingsSummary {
    let mut summary = HoldingsSummary::new(code);
    for &(date, units, amount) in purchases {
        summary.add_purchase(date, units, amount).unwrap();
    }
    summary
}

/// Price reader that fails the test if it is ever consulted.
struct UntouchablePrices;

impl PriceSeriesReader for UntouchablePrices {
    fn fetch_prices(
        &self,
        asset_code: &str,
        _from: Option<NaiveDate>,
        _to: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, CoreError> {
        panic!("price series read for {asset_code}");
    }

    fn fetch_latest_n(&self, asset_code: &str, _n: usize) -> Result<Vec<PricePoint>, CoreError> {
        panic!("latest prices read for {asset_code}");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Holdings aggregation
// ═══════════════════════════════════════════════════════════════════

mod holdings_aggregation {
    use super::*;

    #[test]
    fn sums_units_and_amounts_per_asset() {
        let records = vec![
            PurchaseRecord::new("VOO", d(2024, 1, 10), 10, 1000),
            PurchaseRecord::new("89311199", d(2024, 1, 10), 6527, 10_000),
            PurchaseRecord::new("VOO", d(2024, 1, 11), 5, 600),
        ];

        let result = HoldingsService::new().aggregate(&records).unwrap();

        assert_eq!(result.len(), 2);
        let voo = &result["VOO"];
        assert_eq!(voo.total_units, 15);
        assert_eq!(voo.total_amount_paid, 1600);
        assert_eq!(result["89311199"].total_units, 6527);
    }

    #[test]
    fn groups_are_ordered_by_asset_code() {
        let records = vec![
            PurchaseRecord::new("ZZZ", d(2024, 1, 1), 1, 1),
            PurchaseRecord::new("AAA", d(2024, 1, 1), 1, 1),
            PurchaseRecord::new("MMM", d(2024, 1, 1), 1, 1),
        ];
        let codes: Vec<_> = HoldingsService::new().aggregate(&records).unwrap().into_keys().collect();
        assert_eq!(codes, vec!["AAA", "MMM", "ZZZ"]);
    }

    #[test]
    fn units_excluding_a_date_drop_every_purchase_on_that_day() {
        let summary = holdings(
            "VOO",
            &[
                (d(2024, 1, 10), 10, 1000),
                (d(2024, 1, 11), 5, 600),
                (d(2024, 1, 11), 2, 250),
            ],
        );
        assert_eq!(summary.total_units, 17);
        assert_eq!(summary.total_units_excluding_date(d(2024, 1, 11)), 10);
        assert_eq!(summary.total_units_excluding_date(d(2024, 1, 9)), 17);
    }

    #[test]
    fn totals_beyond_i64_fail_instead_of_wrapping() {
        let records = vec![
            PurchaseRecord::new("VOO", d(2024, 1, 10), i64::MAX, 1),
            PurchaseRecord::new("VOO", d(2024, 1, 11), i64::MAX, 1),
        ];
        let err = HoldingsService::new().aggregate(&records).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(msg) if msg.contains("VOO")));
    }

    #[test]
    fn overflowing_purchase_leaves_the_summary_untouched() {
        let mut summary = holdings("VOO", &[(d(2024, 1, 10), 10, i64::MAX)]);
        assert!(summary.add_purchase(d(2024, 1, 11), 5, 1).is_err());
        assert_eq!(summary.total_units, 10);
        assert_eq!(summary.total_units_excluding_date(d(2024, 1, 11)), 10);
    }

    #[test]
    fn empty_ledger_has_no_holdings() {
        assert!(HoldingsService::new().aggregate(&[]).unwrap().is_empty());
    }

    #[test]
    fn missing_descriptor_is_reported() {
        let records = vec![PurchaseRecord::new("GHOST", d(2024, 1, 1), 1, 100)];
        let service = HoldingsService::new();
        let grouped = service.aggregate(&records).unwrap();

        let err = service
            .resolve_positions(grouped, &AssetCatalog::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::AssetNotFound(code) if code == "GHOST"));
    }

    #[test]
    fn positions_pair_holdings_with_descriptors() {
        let mut catalog = AssetCatalog::new();
        catalog.upsert(AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500"));
        let records = vec![PurchaseRecord::new("voo", d(2024, 1, 1), 3, 1200)];
        let service = HoldingsService::new();

        let positions = service
            .resolve_positions(service.aggregate(&records).unwrap(), &catalog)
            .unwrap();

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].asset.name, "Vanguard S&P 500");
        assert_eq!(positions[0].average_unit_price(), 400.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Valuation
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn investment_trust_uses_basis_of_ten_thousand() {
        let asset = AssetDescriptor::investment_trust("89311199", cat(2), "Global Index Fund");
        let summary = holdings("89311199", &[(d(2024, 1, 9), 50_000, 55_000)]);
        let prices = series(&[(d(2024, 1, 9), 11_500), (d(2024, 1, 10), 12_000)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));

        assert_eq!(result.present_value, 60_000);
        assert_eq!(result.present_value_delta, Some(60_000 - 57_500));
        assert_eq!(result.current_price, Some(12_000));
        assert_eq!(result.average_unit_price, 11_000.0);
        assert!(result.conditions.is_empty());
    }

    #[test]
    fn cash_is_worth_its_units_without_a_price_lookup() {
        let asset = AssetDescriptor::cash("JPY", cat(8), "Yen deposit");
        let position = Position::new(holdings("JPY", &[(d(2024, 1, 1), 100_000, 100_000)]), asset);

        let result = ValuationService::new()
            .valuate_from_store(&position, &UntouchablePrices, d(2024, 1, 10))
            .unwrap();

        assert_eq!(result.present_value, 100_000);
        assert_eq!(result.current_price, None);
        assert_eq!(result.price_delta, None);
        assert_eq!(result.price_delta_ratio_percent, None);
        assert_eq!(result.present_value_delta, None);
        assert_eq!(result.average_unit_price, 0.0);
        assert_eq!(result.profit(), 0);
    }

    #[test]
    fn zero_units_give_sentinel_average_and_a_condition() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 9), 0, 0)]);
        let prices = series(&[(d(2024, 1, 9), 100), (d(2024, 1, 10), 110)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));

        assert_eq!(result.average_unit_price, 0.0);
        assert_eq!(result.present_value, 0);
        assert_eq!(
            result.conditions,
            vec![DataCondition::ZeroHoldings {
                asset_code: "VOO".into()
            }]
        );
    }

    #[test]
    fn delta_ratio_is_relative_to_the_prior_price() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 1), 1, 100)]);
        let prices = series(&[(d(2024, 1, 9), 100), (d(2024, 1, 10), 110)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));

        assert_eq!(result.price_delta, Some(10));
        assert_eq!(result.price_delta_ratio_percent, Some(10.0));
    }

    #[test]
    fn zero_prior_price_leaves_ratio_undefined() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 1), 1, 100)]);
        let prices = series(&[(d(2024, 1, 9), 0), (d(2024, 1, 10), 110)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));

        assert_eq!(result.price_delta, Some(110));
        assert_eq!(result.price_delta_ratio_percent, None);
    }

    #[test]
    fn end_to_end_two_purchases_two_prices() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let records = vec![
            PurchaseRecord::new("VOO", d(2024, 1, 10), 10, 1000),
            PurchaseRecord::new("VOO", d(2024, 1, 11), 5, 600),
        ];
        let grouped = HoldingsService::new().aggregate(&records).unwrap();
        let prices = series(&[(d(2024, 1, 10), 100), (d(2024, 1, 11), 120)]);

        let result = ValuationService::new().valuate(&grouped["VOO"], &asset, &prices, d(2024, 1, 11));

        assert_eq!(result.total_units, 15);
        assert_eq!(result.total_amount_paid, 1600);
        assert_eq!(result.present_value, 1800);
        // Prior day: 100 * 10 units (day-2 purchase excluded) = 1000
        assert_eq!(result.present_value_delta, Some(800));
        assert_eq!(result.price_delta, Some(20));
        assert_eq!(result.price_delta_ratio_percent, Some(20.0));
        assert_eq!(result.price_date, Some(d(2024, 1, 11)));
        assert_eq!(result.profit(), 200);
    }

    #[test]
    fn purchases_older_than_the_latest_price_count_on_both_days() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 3), 10, 1000), (d(2024, 1, 8), 5, 500)]);
        let prices = series(&[(d(2024, 1, 9), 100), (d(2024, 1, 10), 110)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));

        // 15 units on both days: 1650 - 1500
        assert_eq!(result.present_value, 1650);
        assert_eq!(result.present_value_delta, Some(150));
    }

    #[test]
    fn single_observation_leaves_deltas_undefined() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 1), 4, 400)]);
        let prices = series(&[(d(2024, 1, 10), 125)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));

        assert_eq!(result.present_value, 500);
        assert_eq!(result.current_price, Some(125));
        assert_eq!(result.present_value_delta, None);
        assert_eq!(result.price_delta, None);
        assert_eq!(result.price_delta_ratio_percent, None);
        assert_eq!(
            result.conditions,
            vec![DataCondition::ShortPriceHistory {
                asset_code: "VOO".into(),
                available: 1,
                required: 2,
            }]
        );
    }

    #[test]
    fn no_history_values_at_zero_with_a_condition() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 1), 4, 400)]);

        let result = ValuationService::new().valuate(&summary, &asset, &[], d(2024, 1, 10));

        assert_eq!(result.present_value, 0);
        assert_eq!(result.current_price, None);
        assert_eq!(result.average_unit_price, 100.0);
        assert_eq!(
            result.conditions,
            vec![DataCondition::NoPriceHistory {
                asset_code: "VOO".into()
            }]
        );
    }

    #[test]
    fn observations_after_the_trading_date_are_ignored() {
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let summary = holdings("VOO", &[(d(2024, 1, 1), 2, 200)]);
        let prices = series(&[
            (d(2024, 1, 8), 100),
            (d(2024, 1, 9), 105),
            (d(2024, 1, 10), 999),
        ]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 9));

        assert_eq!(result.current_price, Some(105));
        assert_eq!(result.present_value, 210);
        assert_eq!(result.present_value_delta, Some(10));
    }

    #[test]
    fn present_value_rounds_half_away_from_zero() {
        let asset = AssetDescriptor::investment_trust("89311199", cat(2), "Global Index Fund");
        // 15_321 * 6_527 / 10_000 = 10_000.0167
        let summary = holdings("89311199", &[(d(2024, 1, 1), 6_527, 10_000)]);
        let prices = series(&[(d(2024, 1, 10), 15_321)]);

        let result = ValuationService::new().valuate(&summary, &asset, &prices, d(2024, 1, 10));
        assert_eq!(result.present_value, 10_000);

        // 5_000 * 1 / 10_000 = 0.5 rounds up
        let one_unit = holdings("89311199", &[(d(2024, 1, 1), 1, 1)]);
        let half = ValuationService::new().valuate(&one_unit, &asset, &series(&[(d(2024, 1, 10), 5_000)]), d(2024, 1, 10));
        assert_eq!(half.present_value, 1);
    }

    #[test]
    fn store_reads_are_bounded_by_the_trading_date() {
        use portfolio_valuation_core::models::price::{PriceHistory, PriceObservation};

        let mut history = PriceHistory::new();
        for (date, price) in [(d(2024, 1, 8), 100), (d(2024, 1, 9), 101), (d(2024, 1, 10), 102)] {
            history.upsert(&PriceObservation::new("VOO", date, price));
        }
        let asset = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let position = Position::new(holdings("VOO", &[(d(2024, 1, 1), 1, 100)]), asset);

        let result = ValuationService::new()
            .valuate_from_store(&position, &history, d(2024, 1, 9))
            .unwrap();
        assert_eq!(result.current_price, Some(101));
        assert_eq!(result.price_delta, Some(1));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Category rollup
// ═══════════════════════════════════════════════════════════════════

mod rollup {
    use super::*;

    fn valued(asset: &AssetDescriptor, value: i64, paid: i64) -> ValuationResult {
        ValuationResult {
            asset_code: asset.asset_code.clone(),
            asset_name: asset.name.clone(),
            category_id: asset.category_id,
            instrument_type: asset.instrument_type,
            total_units: 1,
            total_amount_paid: paid,
            present_value: value,
            present_value_delta: None,
            current_price: None,
            price_delta: None,
            price_delta_ratio_percent: None,
            price_date: None,
            average_unit_price: 0.0,
            conditions: Vec::new(),
        }
    }

    #[test]
    fn every_category_gets_a_labelled_bucket() {
        let buckets = RollupService::new()
            .rollup(std::iter::empty(), CATEGORY_COUNT)
            .unwrap();

        assert_eq!(buckets.len(), CATEGORY_COUNT);
        assert_eq!(buckets[0].category_id.get(), 1);
        assert_eq!(buckets[0].category_name, "Domestic Equity");
        assert_eq!(buckets[7].category_name, "Cash");
        assert!(buckets.iter().all(|b| b.present_value == 0 && b.total_amount_paid == 0));
    }

    #[test]
    fn valuations_land_in_their_category_bucket() {
        let voo = AssetDescriptor::equity("VOO", cat(2), "Vanguard S&P 500");
        let vwo = AssetDescriptor::equity("VWO", cat(3), "Vanguard EM");
        let spy = AssetDescriptor::equity("SPY", cat(2), "SPDR S&P 500");
        let vals = [valued(&voo, 1800, 1600), valued(&vwo, 500, 550), valued(&spy, 200, 100)];
        let assets = [voo, vwo, spy];

        let buckets = RollupService::new()
            .rollup(vals.iter().zip(assets.iter()), CATEGORY_COUNT)
            .unwrap();

        assert_eq!(buckets[1].present_value, 2000);
        assert_eq!(buckets[1].total_amount_paid, 1700);
        assert_eq!(buckets[2].present_value, 500);
        assert_eq!(buckets[2].total_amount_paid, 550);
        assert_eq!(buckets[0].present_value, 0);
    }

    #[test]
    fn bucket_totals_ignore_iteration_order() {
        let a = AssetDescriptor::equity("A", cat(1), "A");
        let b = AssetDescriptor::cash("B", cat(8), "B");
        let c = AssetDescriptor::equity("C", cat(1), "C");
        let vals = [valued(&a, 10, 7), valued(&b, 20, 20), valued(&c, 30, 25)];
        let assets = [a, b, c];

        let forward = RollupService::new()
            .rollup(vals.iter().zip(assets.iter()), CATEGORY_COUNT)
            .unwrap();
        let backward = RollupService::new()
            .rollup(vals.iter().zip(assets.iter()).rev(), CATEGORY_COUNT)
            .unwrap();

        assert_eq!(forward, backward);
    }

    #[test]
    fn bucket_overflow_is_an_error() {
        let a = AssetDescriptor::equity("A", cat(1), "A");
        let b = AssetDescriptor::equity("B", cat(1), "B");
        let vals = [valued(&a, i64::MAX, 1), valued(&b, 1, 1)];
        let assets = [a, b];

        let err = RollupService::new()
            .rollup(vals.iter().zip(assets.iter()), CATEGORY_COUNT)
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn category_beyond_requested_count_is_rejected() {
        let cash = AssetDescriptor::cash("JPY", cat(8), "Yen");
        let vals = [valued(&cash, 1, 1)];

        let err = RollupService::new()
            .rollup(vals.iter().zip(std::iter::once(&cash)), 7)
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn count_larger_than_taxonomy_is_rejected() {
        let err = RollupService::new()
            .rollup(std::iter::empty(), CATEGORY_COUNT + 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Transition series
// ═══════════════════════════════════════════════════════════════════

mod transition {
    use super::*;

    /// AAA: equity, 10 units, paid 1000, 5 days of prices.
    /// BBB: trust, 20_000 units, paid 30_000, 3 days of prices.
    /// CASH: 5_000 units, paid 5_000.
    fn fixture() -> (Vec<Position>, HashMap<String, Vec<PricePoint>>) {
        let positions = vec![
            Position::new(
                holdings("AAA", &[(d(2024, 1, 1), 10, 1000)]),
                AssetDescriptor::equity("AAA", cat(1), "Alpha"),
            ),
            Position::new(
                holdings("BBB", &[(d(2024, 1, 1), 20_000, 30_000)]),
                AssetDescriptor::investment_trust("BBB", cat(4), "Bond Fund"),
            ),
            Position::new(
                holdings("CASH", &[(d(2024, 1, 1), 5_000, 5_000)]),
                AssetDescriptor::cash("CASH", cat(8), "Deposit"),
            ),
        ];

        let mut prices = HashMap::new();
        prices.insert(
            "AAA".to_string(),
            series(&[
                (d(2024, 1, 1), 100),
                (d(2024, 1, 2), 110),
                (d(2024, 1, 3), 120),
                (d(2024, 1, 4), 130),
                (d(2024, 1, 5), 140),
            ]),
        );
        prices.insert(
            "BBB".to_string(),
            series(&[(d(2024, 1, 3), 15_000), (d(2024, 1, 4), 16_000), (d(2024, 1, 5), 17_000)]),
        );
        (positions, prices)
    }

    #[test]
    fn series_is_cut_to_the_shortest_asset() {
        let (positions, prices) = fixture();

        let result = TransitionService::new()
            .build_transition(&positions, &prices, 4)
            .unwrap();

        assert_eq!(result.len(), 3);
        let dates: Vec<_> = result.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)]);

        let values: Vec<_> = result.points.iter().map(|p| p.total_value).collect();
        assert_eq!(values, vec![36_200, 38_300, 40_400]);
        let profits: Vec<_> = result.points.iter().map(|p| p.total_profit).collect();
        assert_eq!(profits, vec![200, 2_300, 4_400]);

        assert_eq!(
            result.conditions,
            vec![DataCondition::ShortPriceHistory {
                asset_code: "BBB".into(),
                available: 3,
                required: 4,
            }]
        );
    }

    #[test]
    fn full_window_when_history_is_long_enough() {
        let (positions, prices) = fixture();
        let result = TransitionService::new()
            .build_transition(&positions[..1], &prices, 2)
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.points[0].date, d(2024, 1, 4));
        assert_eq!(result.points[1].total_value, 1400);
        assert!(result.conditions.is_empty());
    }

    #[test]
    fn assets_without_history_are_skipped_and_reported() {
        let (mut positions, prices) = fixture();
        positions.push(Position::new(
            holdings("ZZZ", &[(d(2024, 1, 1), 1, 50)]),
            AssetDescriptor::equity("ZZZ", cat(2), "Unpriced"),
        ));

        let result = TransitionService::new()
            .build_transition(&positions, &prices, 3)
            .unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.conditions.contains(&DataCondition::NoPriceHistory {
            asset_code: "ZZZ".into()
        }));
        // ZZZ paid-in is not netted against any value either
        assert_eq!(result.points[0].total_profit, 200);
    }

    #[test]
    fn cash_only_portfolio_has_no_points() {
        let (positions, prices) = fixture();
        let result = TransitionService::new()
            .build_transition(&positions[2..], &prices, 100)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn zero_window_is_rejected() {
        let (positions, prices) = fixture();
        let err = TransitionService::new()
            .build_transition(&positions, &prices, 0)
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════

const CODES: [&str; 3] = ["EQ", "FUND", "CASH"];

fn catalog() -> AssetCatalog {
    let mut catalog = AssetCatalog::new();
    catalog.upsert(AssetDescriptor::equity("EQ", cat(1), "Equity"));
    catalog.upsert(AssetDescriptor::investment_trust("FUND", cat(4), "Fund"));
    catalog.upsert(AssetDescriptor::cash("CASH", cat(8), "Cash"));
    catalog
}

fn record_strategy() -> impl Strategy<Value = PurchaseRecord> {
    (0usize..3, 0u32..20, 0i64..100_000, 0i64..10_000_000).prop_map(|(asset, day, units, amount)| {
        PurchaseRecord::new(CODES[asset], d(2024, 1, 1) + chrono::Duration::days(i64::from(day)), units, amount)
    })
}

proptest! {
    #[test]
    fn aggregation_is_independent_of_record_order(
        records in prop::collection::vec(record_strategy(), 0..40),
        rotation in 0usize..40,
    ) {
        let service = HoldingsService::new();
        let mut shuffled = records.clone();
        shuffled.reverse();
        if !shuffled.is_empty() {
            let k = rotation % shuffled.len();
            shuffled.rotate_left(k);
        }

        prop_assert_eq!(service.aggregate(&records).unwrap(), service.aggregate(&shuffled).unwrap());
    }

    #[test]
    fn rollup_conserves_paid_in_capital(
        records in prop::collection::vec(record_strategy(), 0..40),
        eq_price in 0i64..50_000,
        fund_price in 0i64..50_000,
    ) {
        let catalog = catalog();
        let holdings = HoldingsService::new();
        let positions = holdings
            .resolve_positions(holdings.aggregate(&records).unwrap(), &catalog)
            .unwrap();

        let as_of = d(2024, 2, 1);
        let valuations: Vec<_> = positions
            .iter()
            .map(|p| {
                let price = if p.asset.asset_code == "EQ" { eq_price } else { fund_price };
                ValuationService::new().valuate_position(p, &series(&[(as_of, price)]), as_of)
            })
            .collect();

        let buckets = RollupService::new()
            .rollup(valuations.iter().zip(positions.iter().map(|p| &p.asset)), CATEGORY_COUNT)
            .unwrap();

        let paid_in: i64 = records.iter().map(|r| r.amount_paid).sum();
        let rolled_up: i64 = buckets.iter().map(|b| b.total_amount_paid).sum();
        prop_assert_eq!(paid_in, rolled_up);

        let valued: i64 = valuations.iter().map(|v| v.present_value).sum();
        let bucket_value: i64 = buckets.iter().map(|b| b.present_value).sum();
        prop_assert_eq!(valued, bucket_value);
    }
}
