use super::common::*;
use crate::valuation::coefficients::CoefficientTables;
use crate::valuation::cost::{calculate_cost_approach, CostApproachInputs};
use crate::valuation::domain::PropertyCondition;
use crate::valuation::result::{CheckCode, MethodDetails, Severity, ValuationMethod};

fn inputs(land_value: f64, construction_cost_per_sqm: f64) -> CostApproachInputs {
    CostApproachInputs {
        land_value,
        construction_cost_per_sqm,
        valuation_date: date(2026, 1, 1),
    }
}

#[test]
fn land_plus_depreciated_replacement_cost() {
    let tables = CoefficientTables::default();
    let result = calculate_cost_approach(&tables, &subject(), &inputs(1_500_000.0, 8_000.0));

    // 800,000 replacement cost, 16 effective years of a 60-year life.
    assert_eq!(result.method, ValuationMethod::CostApproach);
    assert_eq!(result.estimated_value, 2_087_000.0);
    assert_eq!(result.value_range.min, 1_878_000.0);
    assert_eq!(result.value_range.max, 2_296_000.0);
    assert_eq!(result.confidence, 75);
    assert!(result.quality_checks.is_empty());

    match result.details {
        MethodDetails::CostApproach {
            actual_age,
            effective_age,
            building_cost,
            ..
        } => {
            assert_eq!(actual_age, 16);
            assert_eq!(effective_age, 16);
            assert_eq!(building_cost, 800_000.0);
        }
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn older_buildings_are_worth_less() {
    let tables = CoefficientTables::default();
    let modern = calculate_cost_approach(&tables, &subject(), &inputs(1_500_000.0, 8_000.0));

    let mut old = subject();
    old.details.build_year = 1950;
    let aged = calculate_cost_approach(&tables, &old, &inputs(1_500_000.0, 8_000.0));

    assert!(aged.estimated_value < modern.estimated_value);
    assert_eq!(aged.estimated_value, 1_287_000.0);
    assert_eq!(aged.checks_with(CheckCode::HighDepreciation).count(), 1);
}

#[test]
fn condition_scales_effective_age() {
    let tables = CoefficientTables::default();
    let mut renovated = subject();
    renovated.details.condition = PropertyCondition::Renovated;
    let mut neglected = subject();
    neglected.details.condition = PropertyCondition::NeedsRenovation;

    let fresh = calculate_cost_approach(&tables, &renovated, &inputs(1_500_000.0, 8_000.0));
    let tired = calculate_cost_approach(&tables, &neglected, &inputs(1_500_000.0, 8_000.0));

    assert!(fresh.estimated_value > tired.estimated_value);
    match tired.details {
        MethodDetails::CostApproach { effective_age, .. } => assert_eq!(effective_age, 24),
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn future_build_year_has_no_depreciation() {
    let tables = CoefficientTables::default();
    let mut planned = subject();
    planned.details.build_year = 2028;

    let result = calculate_cost_approach(&tables, &planned, &inputs(1_000_000.0, 10_000.0));

    assert_eq!(result.estimated_value, 2_000_000.0);
}

#[test]
fn missing_inputs_are_errors_not_panics() {
    let tables = CoefficientTables::default();
    let result = calculate_cost_approach(&tables, &subject(), &inputs(0.0, 0.0));

    let missing: Vec<_> = result.checks_with(CheckCode::MissingInput).collect();
    assert_eq!(missing.len(), 2);
    assert!(
        missing.iter().all(|check| check.severity == Severity::Error)
    );
    assert!(result.has_errors());
}

#[test]
fn unusual_construction_cost_is_flagged() {
    let tables = CoefficientTables::default();
    let cheap = calculate_cost_approach(&tables, &subject(), &inputs(1_500_000.0, 1_200.0));
    let lavish = calculate_cost_approach(&tables, &subject(), &inputs(1_500_000.0, 25_000.0));

    assert_eq!(cheap.checks_with(CheckCode::CostOutOfRange).count(), 1);
    assert_eq!(lavish.checks_with(CheckCode::CostOutOfRange).count(), 1);
    assert!(!cheap.has_errors());
}
