use super::coefficients::CoefficientTables;
use super::domain::SubjectProperty;
use super::result::{
    CalculationStep, CheckCode, MethodDetails, QualityCheck, ValuationMethod, ValuationResult,
    ValueRange,
};
use super::stats::round_to_thousand;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

const COST_CONFIDENCE: u8 = 75;
const RANGE_SPREAD: f64 = 0.10;
const MIN_SANE_COST_PER_SQM: f64 = 3_000.0;
const MAX_SANE_COST_PER_SQM: f64 = 20_000.0;
const HIGH_DEPRECIATION_RATE: f64 = 0.80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostApproachInputs {
    pub land_value: f64,
    pub construction_cost_per_sqm: f64,
    /// Date the building's actual age is measured at.
    pub valuation_date: NaiveDate,
}

/// Land value plus depreciated replacement cost.
pub fn calculate_cost_approach(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    inputs: &CostApproachInputs,
) -> ValuationResult {
    let details = &subject.details;
    let building_cost = details.built_area * inputs.construction_cost_per_sqm;
    let actual_age = (inputs.valuation_date.year() - details.build_year).max(0);
    let condition_factor = tables.effective_age_factors.get(details.condition);
    let effective_age = (f64::from(actual_age) * condition_factor).round();
    let depreciation_rate = effective_age / tables.economic_life_years;
    let depreciation = building_cost * depreciation_rate;
    let estimated_value = round_to_thousand(inputs.land_value + building_cost - depreciation);
    let value_range = ValueRange::spanning(
        round_to_thousand(estimated_value * (1.0 - RANGE_SPREAD)),
        round_to_thousand(estimated_value * (1.0 + RANGE_SPREAD)),
    );

    let calculation_steps = vec![
        CalculationStep::new(
            "Replacement cost",
            "Cost to construct the improvements new",
            "built_area × construction_cost_per_sqm",
            building_cost,
        )
        .input("built_area", details.built_area)
        .input("construction_cost_per_sqm", inputs.construction_cost_per_sqm),
        CalculationStep::new(
            "Effective age",
            format!(
                "Actual age adjusted for {} condition",
                details.condition.label().to_lowercase()
            ),
            "round(actual_age × condition_factor)",
            effective_age,
        )
        .input("actual_age", f64::from(actual_age))
        .input("condition_factor", condition_factor),
        CalculationStep::new(
            "Depreciation",
            format!(
                "Straight-line depreciation over a {:.0}-year economic life",
                tables.economic_life_years
            ),
            "replacement_cost × effective_age / economic_life",
            depreciation,
        )
        .input("depreciation_rate", depreciation_rate),
        CalculationStep::new(
            "Final estimate",
            "Land plus depreciated improvements, rounded to the nearest 1,000",
            "round((land_value + replacement_cost − depreciation) / 1000) × 1000",
            estimated_value,
        )
        .input("land_value", inputs.land_value)
        .input("replacement_cost", building_cost)
        .input("depreciation", depreciation),
    ];

    let quality_checks = quality_checks(inputs, depreciation_rate);

    debug!(
        subject = %subject.id,
        estimated_value,
        depreciation_rate,
        "cost approach calculated"
    );

    ValuationResult {
        method: ValuationMethod::CostApproach,
        estimated_value,
        value_range,
        confidence: COST_CONFIDENCE,
        calculation_steps,
        methodology: "Cost approach: land value plus the replacement cost of the improvements, \
                      less accumulated depreciation derived from a condition-adjusted \
                      effective age."
            .to_string(),
        reconciliation: None,
        assumptions: vec![
            format!(
                "Economic life of {:.0} years with straight-line depreciation.",
                tables.economic_life_years
            ),
            "Land value is supplied as of the valuation date.".to_string(),
        ],
        limitations: vec![
            "Functional and external obsolescence are not measured separately.".to_string(),
            "Confidence is fixed; the method does not calibrate against market spread."
                .to_string(),
        ],
        quality_checks,
        details: MethodDetails::CostApproach {
            land_value: inputs.land_value,
            building_cost,
            actual_age,
            effective_age: effective_age as i32,
            depreciation_rate,
            depreciation,
        },
    }
}

fn quality_checks(inputs: &CostApproachInputs, depreciation_rate: f64) -> Vec<QualityCheck> {
    let mut checks = Vec::new();

    if inputs.land_value <= 0.0 {
        checks.push(QualityCheck::error(
            CheckCode::MissingInput,
            "land value is missing or not positive",
        ));
    }
    if inputs.construction_cost_per_sqm <= 0.0 {
        checks.push(QualityCheck::error(
            CheckCode::MissingInput,
            "construction cost per sqm is missing or not positive",
        ));
    } else if !(MIN_SANE_COST_PER_SQM..=MAX_SANE_COST_PER_SQM)
        .contains(&inputs.construction_cost_per_sqm)
    {
        checks.push(QualityCheck::warning(
            CheckCode::CostOutOfRange,
            format!(
                "construction cost of {:.0} per sqm is outside the typical {:.0}-{:.0} band",
                inputs.construction_cost_per_sqm, MIN_SANE_COST_PER_SQM, MAX_SANE_COST_PER_SQM
            ),
        ));
    }
    if depreciation_rate > HIGH_DEPRECIATION_RATE {
        checks.push(QualityCheck::warning(
            CheckCode::HighDepreciation,
            format!(
                "accumulated depreciation of {:.0}% exceeds 80%",
                depreciation_rate * 100.0
            ),
        ));
    }

    checks
}
