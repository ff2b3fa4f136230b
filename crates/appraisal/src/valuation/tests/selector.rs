use super::common::*;
use crate::valuation::domain::PropertyType;
use crate::valuation::result::ValuationMethod;
use crate::valuation::selector::{recommend_valuation_method, RequiredInput, SelectionContext};

fn context(selected_comparables: usize) -> SelectionContext {
    SelectionContext {
        selected_comparables,
        ..SelectionContext::default()
    }
}

#[test]
fn residential_prefers_sales_comparison() {
    let recommendation = recommend_valuation_method(&subject(), &context(5));

    assert_eq!(recommendation.recommended, ValuationMethod::SalesComparison);
    assert_eq!(
        recommendation.fallbacks,
        vec![ValuationMethod::CostApproach]
    );
    assert!(recommendation.missing_inputs.is_empty());
    assert!(recommendation.warnings.is_empty());
    assert!(!recommendation.reasons.is_empty());
}

#[test]
fn residential_without_comparables_reports_the_gap() {
    let recommendation = recommend_valuation_method(&subject(), &context(0));

    assert_eq!(recommendation.recommended, ValuationMethod::SalesComparison);
    assert_eq!(
        recommendation.missing_inputs,
        vec![RequiredInput::SelectedComparables]
    );
    assert_eq!(recommendation.warnings.len(), 1);

    let thin = recommend_valuation_method(&subject(), &context(2));
    assert!(thin.missing_inputs.is_empty());
    assert!(thin.warnings[0].contains('2'));
}

#[test]
fn commercial_prefers_income() {
    let mut office = subject();
    office.property_type = PropertyType::Commercial;

    let without_rent = recommend_valuation_method(&office, &context(3));
    assert_eq!(without_rent.recommended, ValuationMethod::IncomeApproach);
    assert_eq!(
        without_rent.fallbacks,
        vec![ValuationMethod::SalesComparison, ValuationMethod::CostApproach]
    );
    assert_eq!(
        without_rent.missing_inputs,
        vec![RequiredInput::MonthlyRent]
    );

    let with_rent = recommend_valuation_method(
        &office,
        &SelectionContext {
            monthly_rent: Some(25_000.0),
            ..context(3)
        },
    );
    assert!(with_rent.missing_inputs.is_empty());
}

#[test]
fn land_prefers_cost_and_warns_about_residual_method() {
    let mut plot = subject();
    plot.property_type = PropertyType::Land;

    let recommendation = recommend_valuation_method(
        &plot,
        &SelectionContext {
            land_value: Some(2_000_000.0),
            ..context(0)
        },
    );

    assert_eq!(recommendation.recommended, ValuationMethod::CostApproach);
    assert_eq!(
        recommendation.fallbacks,
        vec![ValuationMethod::SalesComparison]
    );
    assert_eq!(
        recommendation.missing_inputs,
        vec![RequiredInput::ConstructionCostPerSqm]
    );
    assert!(recommendation
        .warnings
        .iter()
        .any(|warning| warning.contains("land-residual")));
}

#[test]
fn unknown_type_falls_back_to_sales_with_warning() {
    let mut odd = subject();
    odd.property_type = PropertyType::Other;

    let recommendation = recommend_valuation_method(&odd, &context(4));

    assert_eq!(recommendation.recommended, ValuationMethod::SalesComparison);
    assert!(recommendation.fallbacks.is_empty());
    assert_eq!(recommendation.warnings.len(), 1);
}

#[test]
fn context_reports_supported_methods() {
    let full = SelectionContext {
        selected_comparables: 1,
        monthly_rent: Some(9_000.0),
        land_value: Some(1_000_000.0),
        construction_cost_per_sqm: Some(8_000.0),
    };
    assert!(full.supports(ValuationMethod::SalesComparison));
    assert!(full.supports(ValuationMethod::IncomeApproach));
    assert!(full.supports(ValuationMethod::CostApproach));
    assert!(!full.supports(ValuationMethod::Hybrid));

    let partial = SelectionContext {
        construction_cost_per_sqm: None,
        ..full
    };
    assert!(!partial.supports(ValuationMethod::CostApproach));
}
