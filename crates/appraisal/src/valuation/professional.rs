//! Professional sales comparison: hard eligibility filter, shekel-denominated
//! adjustments against a market price-per-sqm baseline, and composite
//! time/distance/data-quality weighting.

use super::coefficients::{CoefficientTables, ProfessionalCoefficients};
use super::domain::{ComparableTransaction, SubjectProperty, ValuationError};
use super::result::{
    AbsoluteAdjustments, CalculationStep, CheckCode, ExcludedComparable, ExclusionReason,
    MethodDetails, QualityCheck, TransactionDetail, ValuationMethod, ValuationResult, ValueRange,
};
use super::stats::{
    clamp_confidence, coefficient_of_variation, mean, round_to_thousand,
    sample_and_spread_penalty, weighted_mean, weighted_std_dev,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const AVERAGE_DAYS_PER_MONTH: f64 = 30.4375;
const BASE_CONFIDENCE: f64 = 90.0;
const LARGE_ADJUSTMENT: f64 = 0.30;

/// Market inputs the professional variant needs beyond the comparables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub valuation_date: NaiveDate,
    /// Baseline price per sqm; derived from the eligible comparables when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_price_per_sqm: Option<f64>,
}

impl MarketContext {
    pub fn new(valuation_date: NaiveDate) -> Self {
        Self {
            valuation_date,
            market_price_per_sqm: None,
        }
    }
}

pub fn calculate_comparable_sales_approach_professional(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparables: &[ComparableTransaction],
    context: &MarketContext,
) -> Result<ValuationResult, ValuationError> {
    let coefficients = &tables.professional;
    let selected: Vec<&ComparableTransaction> =
        comparables.iter().filter(|comp| comp.selected).collect();
    if selected.is_empty() {
        return Err(ValuationError::NoSelectedComparables);
    }

    let search_radius_km = coefficients.search_radius_km(&subject.address.city);
    let mut eligible = Vec::with_capacity(selected.len());
    let mut excluded = Vec::new();
    for comparable in selected {
        match exclusion_reason(coefficients, subject, comparable, search_radius_km) {
            Some(reason) => {
                warn!(
                    address = %comparable.address,
                    reason = reason.label(),
                    "comparable excluded"
                );
                excluded.push(ExcludedComparable {
                    address: comparable.address.clone(),
                    reason,
                });
            }
            None => eligible.push(comparable),
        }
    }

    if eligible.is_empty() {
        return Err(ValuationError::NoEligibleComparables {
            excluded: excluded.len(),
        });
    }

    let market_price_per_sqm = context
        .market_price_per_sqm
        .filter(|value| *value > 0.0)
        .unwrap_or_else(|| {
            let observed: Vec<f64> = eligible
                .iter()
                .map(|comp| comp.sale_price / comp.built_area)
                .collect();
            mean(&observed)
        });

    let mut steps = vec![CalculationStep::new(
        "Market baseline",
        "Price per sqm used to value area differences",
        "Σ (sale_price / built_area) / n, unless supplied",
        market_price_per_sqm,
    )
    .input("search_radius_km", search_radius_km)
    .input("excluded", excluded.len() as f64)];

    let mut assumed_condition = 0usize;
    let mut details = Vec::with_capacity(eligible.len());
    for comparable in &eligible {
        if comparable.condition.is_none() {
            assumed_condition += 1;
        }
        let adjustments =
            absolute_adjustments(coefficients, subject, comparable, market_price_per_sqm);
        let adjusted_price = comparable.sale_price + adjustments.total();

        let months = comparable
            .sale_date
            .map(|sold| (context.valuation_date - sold).num_days() as f64 / AVERAGE_DAYS_PER_MONTH);
        let time_decay = decay(
            months,
            coefficients.time_decay_months,
            coefficients.decay_floor,
        );
        let distance_decay = decay(
            comparable.distance_km,
            coefficients.distance_decay_km,
            coefficients.decay_floor,
        );
        let data_quality =
            if comparable.adjustments.recorded_components() < coefficients.min_recorded_components
            {
                coefficients.sparse_data_quality
            } else {
                1.0
            };

        details.push(TransactionDetail {
            address: comparable.address.clone(),
            sale_price: comparable.sale_price,
            adjustments,
            adjusted_price,
            time_decay,
            distance_decay,
            data_quality,
            weight: time_decay * distance_decay * data_quality,
            normalized_weight: 0.0,
        });
    }

    let prices: Vec<f64> = details.iter().map(|detail| detail.adjusted_price).collect();
    let weights: Vec<f64> = details.iter().map(|detail| detail.weight).collect();
    let total_weight: f64 = weights.iter().sum();
    for detail in &mut details {
        detail.normalized_weight = if total_weight > 0.0 {
            detail.weight / total_weight
        } else {
            1.0 / prices.len() as f64
        };
        steps.push(
            CalculationStep::new(
                format!("Transaction {}", detail.address),
                "Shekel adjustments and composite weight",
                "adjusted = sale_price + area + floor + condition; weight = time × distance × quality",
                detail.adjusted_price,
            )
            .input("sale_price", detail.sale_price)
            .input("area_adjustment", detail.adjustments.area)
            .input("floor_adjustment", detail.adjustments.floor)
            .input("condition_adjustment", detail.adjustments.condition)
            .input("time_decay", detail.time_decay)
            .input("distance_decay", detail.distance_decay)
            .input("data_quality", detail.data_quality)
            .input("weight", detail.normalized_weight),
        );
    }

    let weighted = weighted_mean(&prices, &weights).unwrap_or_else(|| mean(&prices));
    let spread = weighted_std_dev(&prices, &weights, weighted);
    let cv = coefficient_of_variation(spread, weighted);
    let estimated_value = round_to_thousand(weighted);
    let rounded_spread = round_to_thousand(spread);
    let value_range = ValueRange {
        min: estimated_value - rounded_spread,
        max: estimated_value + rounded_spread,
    };

    steps.push(
        CalculationStep::new(
            "Final estimate",
            "Weight-normalised sum of adjusted prices, rounded to the nearest 1,000",
            "round(Σ (adjusted × weight) / Σ weight / 1000) × 1000",
            estimated_value,
        )
        .input("weighted_std_dev", spread)
        .input("coefficient_of_variation", cv),
    );

    let penalty = sample_and_spread_penalty(details.len(), cv);
    let confidence = clamp_confidence(BASE_CONFIDENCE - penalty);

    let mut quality_checks = Vec::new();
    if !excluded.is_empty() {
        quality_checks.push(QualityCheck::info(
            CheckCode::ComparablesExcluded,
            format!(
                "{} comparable(s) excluded by the eligibility filter",
                excluded.len()
            ),
        ));
    }
    if details.len() < 3 {
        quality_checks.push(QualityCheck::warning(
            CheckCode::LowSampleSize,
            format!(
                "only {} eligible comparable(s); at least 3 are recommended",
                details.len()
            ),
        ));
    }
    if cv > 0.20 {
        quality_checks.push(QualityCheck::warning(
            CheckCode::HighVariation,
            format!(
                "adjusted prices vary by {:.1}% of the weighted mean (threshold 20%)",
                cv * 100.0
            ),
        ));
    }
    for detail in &details {
        let share = detail.adjustments.total() / detail.sale_price;
        if share.abs() > LARGE_ADJUSTMENT {
            quality_checks.push(QualityCheck::warning(
                CheckCode::LargeAdjustment,
                format!(
                    "{} required a {:+.1}% total adjustment",
                    detail.address,
                    share * 100.0
                ),
            ));
        }
    }
    if assumed_condition > 0 {
        quality_checks.push(QualityCheck::info(
            CheckCode::ConditionAssumed,
            format!(
                "{assumed_condition} comparable(s) have no recorded condition; their condition \
                 adjustment is zero"
            ),
        ));
    }

    debug!(
        subject = %subject.id,
        eligible = details.len(),
        excluded = excluded.len(),
        estimated_value,
        confidence,
        "professional sales comparison calculated"
    );

    Ok(ValuationResult {
        method: ValuationMethod::SalesComparison,
        estimated_value,
        value_range,
        confidence,
        calculation_steps: steps,
        methodology: format!(
            "Professional sales comparison over {} eligible transaction(s) within {:.1} km. \
             Differences in area, floor and condition are priced in shekels against a market \
             baseline of {:.0} per sqm, and each transaction is weighted by sale recency, \
             distance and data completeness.",
            details.len(),
            search_radius_km,
            market_price_per_sqm
        ),
        reconciliation: None,
        assumptions: vec![
            format!(
                "Area differences are valued at {:.0}% of the market price per sqm.",
                coefficients.area_factor * 100.0
            ),
            format!(
                "Each floor of difference is worth {:.0}.",
                coefficients.floor_value_per_level
            ),
            "Comparables without a recorded condition are assumed to match the subject."
                .to_string(),
        ],
        limitations: vec![
            "Transactions more than 25% larger or smaller than the subject are not considered."
                .to_string(),
            "Recency and distance weights never fall below half weight.".to_string(),
        ],
        quality_checks,
        details: MethodDetails::ProfessionalSalesComparison {
            transaction_details: details,
            excluded,
            market_price_per_sqm,
            search_radius_km,
        },
    })
}

fn exclusion_reason(
    coefficients: &ProfessionalCoefficients,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
    search_radius_km: f64,
) -> Option<ExclusionReason> {
    if comparable.sale_price <= 0.0 {
        return Some(ExclusionReason::NonPositivePrice);
    }

    let subject_area = subject.details.built_area;
    let area_deviation = if subject_area > 0.0 && comparable.built_area > 0.0 {
        (comparable.built_area - subject_area).abs() / subject_area
    } else {
        f64::INFINITY
    };
    if area_deviation > coefficients.max_area_deviation {
        return Some(ExclusionReason::AreaMismatch);
    }

    match comparable.distance_km {
        Some(distance) if distance > search_radius_km => Some(ExclusionReason::OutsideRadius),
        _ => None,
    }
}

fn absolute_adjustments(
    coefficients: &ProfessionalCoefficients,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
    market_price_per_sqm: f64,
) -> AbsoluteAdjustments {
    let area_delta = subject.details.built_area - comparable.built_area;
    let floor_delta = f64::from(subject.details.floor - comparable.floor);
    let subject_condition = subject.details.condition;
    let comparable_condition = comparable.condition.unwrap_or(subject_condition);
    let condition_delta = f64::from(subject_condition.score() - comparable_condition.score());

    AbsoluteAdjustments {
        area: area_delta * market_price_per_sqm * coefficients.area_factor,
        floor: floor_delta * coefficients.floor_value_per_level,
        condition: condition_delta * comparable.sale_price * coefficients.condition_coefficient,
    }
}

/// `max(exp(-x / scale), floor)`, and full weight when `x` is zero or unknown.
fn decay(quantity: Option<f64>, scale: f64, floor: f64) -> f64 {
    match quantity {
        Some(value) if value > 0.0 => (-value / scale).exp().max(floor),
        _ => 1.0,
    }
}

#[cfg(test)]
pub(crate) fn decay_for_tests(quantity: Option<f64>, scale: f64, floor: f64) -> f64 {
    decay(quantity, scale, floor)
}
