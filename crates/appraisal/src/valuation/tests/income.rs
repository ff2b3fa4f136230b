use super::common::*;
use crate::valuation::income::{calculate_income_approach, IncomeAssumptions};
use crate::valuation::result::{CheckCode, MethodDetails, ValuationMethod};

#[test]
fn capitalizes_net_operating_income() {
    let result = calculate_income_approach(&subject(), &IncomeAssumptions::new(10_000.0));

    // 120,000 gross, 114,000 effective, 79,800 NOI at 5%.
    assert_eq!(result.method, ValuationMethod::IncomeApproach);
    assert_eq!(result.estimated_value, 1_596_000.0);
    assert_eq!(result.value_range.min, 1_451_000.0);
    assert_eq!(result.value_range.max, 1_773_000.0);
    assert_eq!(result.confidence, 80);
    assert!(result.quality_checks.is_empty());

    match result.details {
        MethodDetails::IncomeApproach {
            net_operating_income,
            ..
        } => assert!((net_operating_income - 79_800.0).abs() < 1e-6),
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn higher_cap_rate_lowers_value() {
    let base = calculate_income_approach(&subject(), &IncomeAssumptions::new(10_000.0));
    let riskier = calculate_income_approach(
        &subject(),
        &IncomeAssumptions::new(10_000.0).with_cap_rate(0.07),
    );

    assert!(riskier.estimated_value < base.estimated_value);
    assert!(riskier.value_range.contains(riskier.estimated_value));
}

#[test]
fn non_positive_cap_rate_yields_zero_with_error() {
    let result = calculate_income_approach(
        &subject(),
        &IncomeAssumptions::new(10_000.0).with_cap_rate(0.0),
    );

    assert_eq!(result.estimated_value, 0.0);
    assert_eq!(result.value_range.min, 0.0);
    assert_eq!(result.value_range.max, 0.0);
    assert_eq!(result.checks_with(CheckCode::InvalidCapRate).count(), 1);
    assert!(result.has_errors());
}

#[test]
fn missing_rent_is_an_error() {
    let result = calculate_income_approach(&subject(), &IncomeAssumptions::new(0.0));

    assert_eq!(result.estimated_value, 0.0);
    assert_eq!(result.checks_with(CheckCode::InvalidRent).count(), 1);
}

#[test]
fn atypical_assumptions_raise_warnings() {
    let assumptions = IncomeAssumptions::new(10_000.0)
        .with_vacancy_rate(0.4)
        .with_opex_ratio(0.05)
        .with_cap_rate(0.15);
    let result = calculate_income_approach(&subject(), &assumptions);

    assert_eq!(result.checks_with(CheckCode::VacancyOutOfRange).count(), 1);
    assert_eq!(result.checks_with(CheckCode::OpexOutOfRange).count(), 1);
    assert_eq!(result.checks_with(CheckCode::CapRateOutOfRange).count(), 1);
    assert!(!result.has_errors());
}

#[test]
fn assumptions_default_when_omitted_from_json() {
    let parsed: IncomeAssumptions =
        serde_json::from_str(r#"{"monthly_rent": 8000}"#).expect("assumptions parse");
    assert_eq!(parsed, IncomeAssumptions::new(8_000.0));
}
