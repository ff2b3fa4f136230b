use super::common::*;
use crate::valuation::domain::ValuationError;
use crate::valuation::reconciliation::{reconcile_valuations, MethodWeights};
use crate::valuation::result::{CheckCode, MethodDetails, QualityCheck, ValuationMethod};

fn sales_and_cost() -> Vec<crate::valuation::result::ValuationResult> {
    vec![
        fixed_result(ValuationMethod::SalesComparison, 3_000_000.0, 90),
        fixed_result(ValuationMethod::CostApproach, 2_000_000.0, 75),
    ]
}

#[test]
fn default_weights_blend_value_and_confidence() {
    let result = reconcile_valuations(&sales_and_cost(), None).expect("reconciles");

    assert_eq!(result.method, ValuationMethod::Hybrid);
    assert_eq!(result.estimated_value, 2_600_000.0);
    assert_eq!(result.confidence, 84);
    assert_eq!(result.value_range.min, 1_900_000.0);
    assert_eq!(result.value_range.max, 3_150_000.0);
    assert_eq!(result.checks_with(CheckCode::MethodDivergence).count(), 1);
    assert!(result
        .reconciliation
        .as_deref()
        .is_some_and(|text| text.contains("Sales Comparison")));
    assert_eq!(result.assumptions.len(), 2);
}

#[test]
fn shifting_weight_moves_the_estimate() {
    let weights = MethodWeights {
        sales_comparison: 0.9,
        cost_approach: 0.1,
        ..MethodWeights::default()
    };
    let result = reconcile_valuations(&sales_and_cost(), Some(&weights)).expect("reconciles");

    assert_eq!(result.estimated_value, 2_900_000.0);
    match result.details {
        MethodDetails::Hybrid { contributions } => {
            assert_eq!(contributions.len(), 2);
            assert!((contributions[0].share - 0.9).abs() < 1e-12);
        }
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn zero_weight_method_is_left_out() {
    let weights = MethodWeights {
        cost_approach: 0.0,
        ..MethodWeights::default()
    };
    let result = reconcile_valuations(&sales_and_cost(), Some(&weights)).expect("reconciles");

    assert_eq!(result.estimated_value, 3_000_000.0);
    assert_eq!(result.confidence, 90);
    assert_eq!(result.checks_with(CheckCode::MethodDivergence).count(), 0);
    assert_eq!(result.value_range.min, 2_850_000.0);
}

#[test]
fn all_zero_weights_fail() {
    let weights = MethodWeights {
        sales_comparison: 0.0,
        cost_approach: 0.0,
        income_approach: 0.0,
        hybrid: 0.0,
    };
    let error = reconcile_valuations(&sales_and_cost(), Some(&weights)).expect_err("no weight");
    assert_eq!(error, ValuationError::NoWeightedMethods);

    let error = reconcile_valuations(&[], None).expect_err("nothing to reconcile");
    assert_eq!(error, ValuationError::EmptyReconciliation);
}

#[test]
fn carries_every_input_check_forward() {
    let mut results = sales_and_cost();
    results[0]
        .quality_checks
        .push(QualityCheck::warning(CheckCode::LowSampleSize, "two comparables"));
    results[1]
        .quality_checks
        .push(QualityCheck::error(CheckCode::MissingInput, "no land value"));

    let result = reconcile_valuations(&results, None).expect("reconciles");

    assert_eq!(result.checks_with(CheckCode::LowSampleSize).count(), 1);
    assert_eq!(result.checks_with(CheckCode::MissingInput).count(), 1);
    assert!(result.has_errors());
}

#[test]
fn close_estimates_do_not_diverge() {
    let results = vec![
        fixed_result(ValuationMethod::SalesComparison, 3_000_000.0, 90),
        fixed_result(ValuationMethod::IncomeApproach, 2_900_000.0, 80),
    ];
    let result = reconcile_valuations(&results, None).expect("reconciles");

    assert_eq!(result.estimated_value, 2_950_000.0);
    assert_eq!(result.confidence, 85);
    assert!(result.quality_checks.is_empty());
}

#[test]
fn full_weight_lands_strictly_closer_than_an_even_split() {
    let results = sales_and_cost();
    let weighted = |sales_comparison: f64, cost_approach: f64| {
        let weights = MethodWeights {
            sales_comparison,
            cost_approach,
            ..MethodWeights::default()
        };
        reconcile_valuations(&results, Some(&weights))
            .expect("reconciles")
            .estimated_value
    };

    let sales_only = weighted(1.0, 0.0);
    let even = weighted(0.5, 0.5);
    let cost_only = weighted(0.0, 1.0);

    assert_eq!(even, 2_500_000.0);
    assert!(
        (sales_only - 3_000_000.0).abs() < (even - 3_000_000.0).abs()
    );
    assert!((cost_only - 2_000_000.0).abs() < (even - 2_000_000.0).abs());
    assert_eq!(sales_only, 3_000_000.0);
    assert_eq!(cost_only, 2_000_000.0);
}
