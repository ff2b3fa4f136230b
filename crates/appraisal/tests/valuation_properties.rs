// Property-based checks of the valuation invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use appraisal::valuation::{
    calculate_comparable_sales_approach, calculate_comparable_sales_approach_professional,
    calculate_cost_approach, calculate_income_approach, reconcile_valuations, Address, Amenities,
    CoefficientTables, ComparableTransaction, CostApproachInputs, IncomeAssumptions,
    MarketContext, MethodDetails, MethodWeights, PropertyCondition, PropertyDetails, PropertyType,
    SubjectProperty, ValuationResult,
};
use chrono::NaiveDate;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_condition() -> impl Strategy<Value = PropertyCondition> {
    prop::sample::select(PropertyCondition::ordered().to_vec())
}

fn arb_subject() -> impl Strategy<Value = SubjectProperty> {
    (
        40.0f64..250.0,
        1.0f64..8.0,
        -1i32..20,
        1900i32..2026,
        arb_condition(),
        0u32..3,
        prop::bool::ANY,
    )
        .prop_map(
            |(built_area, rooms, floor, build_year, condition, parking_spaces, elevator)| {
                SubjectProperty {
                    id: "prop-subject".to_string(),
                    address: Address::new("Arlozorov 100", "Tel Aviv"),
                    property_type: PropertyType::Apartment,
                    details: PropertyDetails {
                        built_area,
                        rooms,
                        bathrooms: 1,
                        bedrooms: 2,
                        floor,
                        total_floors: None,
                        build_year,
                        condition,
                        amenities: Amenities {
                            parking_spaces,
                            elevator,
                            ..Amenities::default()
                        },
                    },
                    features: Vec::new(),
                }
            },
        )
}

fn arb_comparable() -> impl Strategy<Value = ComparableTransaction> {
    (
        500_000.0f64..8_000_000.0,
        40.0f64..250.0,
        -1i32..20,
        prop::option::of(0.0f64..5.0),
        prop::option::of(0.0f64..100.0),
        prop::option::of(arb_condition()),
        prop::option::of(1900i32..2026),
        prop::option::of(0i64..2_000),
    )
        .prop_map(
            |(price, area, floor, distance, similarity, condition, build_year, age_days)| {
                let mut comparable = ComparableTransaction::new(
                    "Generated St 1",
                    PropertyType::Apartment,
                    price,
                    area,
                );
                comparable.rooms = 3.0;
                comparable.floor = floor;
                comparable.distance_km = distance;
                comparable.similarity_score = similarity;
                comparable.condition = condition;
                comparable.build_year = build_year;
                comparable.sale_date =
                    age_days.map(|days| valuation_date() - chrono::Duration::days(days));
                comparable
            },
        )
}

fn valuation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
}

fn depreciation_rate(result: &ValuationResult) -> Option<f64> {
    match &result.details {
        MethodDetails::CostApproach {
            depreciation_rate, ..
        } => Some(*depreciation_rate),
        _ => None,
    }
}

fn assert_invariants(result: &ValuationResult) -> Result<(), TestCaseError> {
    prop_assert!(
        result.value_range.min <= result.estimated_value
            && result.estimated_value <= result.value_range.max,
        "range {:?} does not contain {}",
        result.value_range,
        result.estimated_value
    );
    prop_assert!((40..=95).contains(&result.confidence));
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn sales_comparison_range_contains_estimate(
        subject in arb_subject(),
        comparables in prop::collection::vec(arb_comparable(), 1..8),
    ) {
        let tables = CoefficientTables::default();
        let result = calculate_comparable_sales_approach(&tables, &subject, &comparables)
            .expect("selected comparables are present");
        assert_invariants(&result)?;
    }

    #[test]
    fn professional_range_contains_estimate(
        subject in arb_subject(),
        comparables in prop::collection::vec(arb_comparable(), 1..8),
    ) {
        let tables = CoefficientTables::default();
        let context = MarketContext::new(valuation_date());
        if let Ok(result) = calculate_comparable_sales_approach_professional(
            &tables,
            &subject,
            &comparables,
            &context,
        ) {
            assert_invariants(&result)?;
        }
    }

    #[test]
    fn cost_and_income_hold_fixed_confidence(
        subject in arb_subject(),
        land_value in 100_000.0f64..5_000_000.0,
        cost_per_sqm in 3_000.0f64..20_000.0,
        monthly_rent in 1_000.0f64..50_000.0,
        cap_rate in 0.02f64..0.12,
    ) {
        let tables = CoefficientTables::default();
        let cost = calculate_cost_approach(
            &tables,
            &subject,
            &CostApproachInputs {
                land_value,
                construction_cost_per_sqm: cost_per_sqm,
                valuation_date: valuation_date(),
            },
        );
        let income = calculate_income_approach(
            &subject,
            &IncomeAssumptions::new(monthly_rent).with_cap_rate(cap_rate),
        );

        prop_assert_eq!(cost.confidence, 75);
        prop_assert_eq!(income.confidence, 80);
        prop_assert!(cost.value_range.contains(cost.estimated_value));
        prop_assert!(income.value_range.contains(income.estimated_value));
    }

    #[test]
    fn older_buildings_are_worth_strictly_less(
        subject in arb_subject(),
        years_older in 10i32..60,
    ) {
        let tables = CoefficientTables::default();
        let inputs = CostApproachInputs {
            land_value: 1_000_000.0,
            construction_cost_per_sqm: 8_000.0,
            valuation_date: valuation_date(),
        };
        let mut older = subject.clone();
        older.details.build_year -= years_older;

        let newer = calculate_cost_approach(&tables, &subject, &inputs);
        let aged = calculate_cost_approach(&tables, &older, &inputs);

        let newer_rate = depreciation_rate(&newer);
        prop_assert!(newer_rate.is_some());
        prop_assert!(depreciation_rate(&aged) > newer_rate);
        prop_assert!(aged.estimated_value < newer.estimated_value);
    }

    #[test]
    fn reconciliation_tracks_weights(
        sales_value in 1_000_000.0f64..5_000_000.0,
        spread in 200_000.0f64..2_000_000.0,
        tilt in 0.55f64..1.0,
        subject in arb_subject(),
    ) {
        let tables = CoefficientTables::default();
        let mut comparable = ComparableTransaction::new(
            "Generated St 2",
            PropertyType::Apartment,
            sales_value,
            subject.details.built_area,
        );
        comparable.floor = subject.details.floor;
        let sales = calculate_comparable_sales_approach(&tables, &subject, &[comparable])
            .expect("one comparable is selected");
        let income_value = sales.estimated_value + spread.round();
        let mut income = calculate_income_approach(&subject, &IncomeAssumptions::new(10_000.0));
        income.estimated_value = income_value;
        income.value_range.min = income.estimated_value;
        income.value_range.max = income.estimated_value;
        let results = vec![sales.clone(), income.clone()];

        let even = MethodWeights {
            sales_comparison: 0.5,
            income_approach: 0.5,
            ..MethodWeights::default()
        };
        let toward_sales = MethodWeights {
            sales_comparison: tilt,
            income_approach: 1.0 - tilt,
            ..MethodWeights::default()
        };
        let toward_income = MethodWeights {
            sales_comparison: 1.0 - tilt,
            income_approach: tilt,
            ..MethodWeights::default()
        };

        let balanced = reconcile_valuations(&results, Some(&even)).expect("reconciles");
        let sales_heavy = reconcile_valuations(&results, Some(&toward_sales)).expect("reconciles");
        let income_heavy =
            reconcile_valuations(&results, Some(&toward_income)).expect("reconciles");

        let distance = |value: f64, target: f64| (value - target).abs();
        prop_assert!(
            distance(sales_heavy.estimated_value, sales.estimated_value)
                < distance(balanced.estimated_value, sales.estimated_value)
        );
        prop_assert!(
            distance(income_heavy.estimated_value, income.estimated_value)
                < distance(balanced.estimated_value, income.estimated_value)
        );
        assert_invariants(&balanced)?;
        assert_invariants(&sales_heavy)?;
        assert_invariants(&income_heavy)?;
    }
}
