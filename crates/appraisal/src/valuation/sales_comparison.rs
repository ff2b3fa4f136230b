use super::adjustments::{adjust, adjusted_price};
use super::coefficients::CoefficientTables;
use super::domain::{ComparableTransaction, SubjectProperty, ValuationError};
use super::result::{
    CalculationStep, CheckCode, ComparableAdjustment, MethodDetails, QualityCheck,
    ValuationMethod, ValuationResult, ValueRange,
};
use super::stats::{
    clamp_confidence, coefficient_of_variation, mean, population_std_dev, round_to_thousand,
    sample_and_spread_penalty, weighted_mean,
};
use tracing::debug;

const DEFAULT_SIMILARITY: f64 = 50.0;
const BASE_CONFIDENCE: f64 = 90.0;
const LARGE_ADJUSTMENT: f64 = 0.30;
const OUTLIER_Z_SCORE: f64 = 2.0;

/// Adjusts every selected comparable toward the subject and aggregates them
/// into a similarity-weighted estimate.
pub fn calculate_comparable_sales_approach(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparables: &[ComparableTransaction],
) -> Result<ValuationResult, ValuationError> {
    let selected: Vec<&ComparableTransaction> =
        comparables.iter().filter(|comp| comp.selected).collect();
    if selected.is_empty() {
        return Err(ValuationError::NoSelectedComparables);
    }

    let mut steps = Vec::with_capacity(selected.len() + 4);
    let mut rows = Vec::with_capacity(selected.len());

    for (index, comparable) in selected.iter().enumerate() {
        let adjustments = adjust(tables, subject, comparable);
        let price = adjusted_price(comparable.sale_price, &adjustments);
        let weight = comparable
            .similarity_score
            .unwrap_or(DEFAULT_SIMILARITY)
            .max(0.0);

        let mut step = CalculationStep::new(
            format!("Comparable {}", index + 1),
            format!("Adjust sale at {} toward the subject", comparable.address),
            "adjusted = sale_price × (1 + total_adjustment)",
            price,
        )
        .input("sale_price", comparable.sale_price);
        for (name, value) in adjustments.components() {
            step = step.input(name, value);
        }
        steps.push(step.input("total_adjustment", adjustments.total()));

        rows.push(ComparableAdjustment {
            address: comparable.address.clone(),
            sale_price: comparable.sale_price,
            adjustments,
            adjusted_price: price,
            weight,
            z_score: 0.0,
        });
    }

    let prices: Vec<f64> = rows.iter().map(|row| row.adjusted_price).collect();
    let weights: Vec<f64> = rows.iter().map(|row| row.weight).collect();

    let unweighted_mean = mean(&prices);
    let weighted = weighted_mean(&prices, &weights).unwrap_or(unweighted_mean);
    let std_dev = population_std_dev(&prices);
    let cv = coefficient_of_variation(std_dev, unweighted_mean);

    for row in &mut rows {
        if std_dev > 0.0 {
            row.z_score = (row.adjusted_price - unweighted_mean) / std_dev;
        }
    }

    let estimated_value = round_to_thousand(weighted);
    let spread = round_to_thousand(std_dev);
    let value_range = ValueRange {
        min: estimated_value - spread,
        max: estimated_value + spread,
    };

    steps.push(
        CalculationStep::new(
            "Unweighted mean",
            "Simple average of adjusted comparable prices",
            "Σ adjusted / n",
            unweighted_mean,
        )
        .input("n", prices.len() as f64),
    );
    steps.push(
        CalculationStep::new(
            "Similarity-weighted mean",
            "Average weighted by similarity score (50 when unscored)",
            "Σ (adjusted × similarity) / Σ similarity",
            weighted,
        )
        .input("total_weight", weights.iter().sum()),
    );
    steps.push(
        CalculationStep::new(
            "Dispersion",
            "Population standard deviation of adjusted prices",
            "sqrt(Σ (adjusted − mean)² / n)",
            std_dev,
        )
        .input("coefficient_of_variation", cv),
    );
    steps.push(
        CalculationStep::new(
            "Final estimate",
            "Weighted mean rounded to the nearest 1,000",
            "round(weighted_mean / 1000) × 1000",
            estimated_value,
        )
        .input("range_min", value_range.min)
        .input("range_max", value_range.max),
    );

    let similarity_penalty = similarity_penalty(&selected);
    let confidence = clamp_confidence(
        BASE_CONFIDENCE - sample_and_spread_penalty(rows.len(), cv) - similarity_penalty,
    );

    let quality_checks = quality_checks(&rows, cv);

    debug!(
        subject = %subject.id,
        comparables = rows.len(),
        estimated_value,
        confidence,
        "sales comparison calculated"
    );

    Ok(ValuationResult {
        method: ValuationMethod::SalesComparison,
        estimated_value,
        value_range,
        confidence,
        calculation_steps: steps,
        methodology: format!(
            "Sales comparison over {} selected comparable transaction(s). Each sale price is \
             adjusted for location, size, condition, floor, age and features, then the adjusted \
             prices are combined in a similarity-weighted mean.",
            rows.len()
        ),
        reconciliation: None,
        assumptions: vec![
            "Comparable transactions were arm's-length sales.".to_string(),
            "Adjustment coefficients reflect current local market behaviour.".to_string(),
            "Unscored comparables carry a neutral similarity weight of 50.".to_string(),
        ],
        limitations: vec![
            "Distances are taken as supplied; addresses are not geocoded.".to_string(),
            "Value range reflects the spread of adjusted prices, not a statistical confidence \
             interval."
                .to_string(),
        ],
        quality_checks,
        details: MethodDetails::SalesComparison {
            comparables: rows,
            unweighted_mean,
            weighted_mean: weighted,
            standard_deviation: std_dev,
            coefficient_of_variation: cv,
        },
    })
}

fn similarity_penalty(selected: &[&ComparableTransaction]) -> f64 {
    let scores: Vec<f64> = selected
        .iter()
        .filter_map(|comp| comp.similarity_score)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    let average = mean(&scores);
    if average < 50.0 {
        20.0
    } else if average < 60.0 {
        10.0
    } else {
        0.0
    }
}

fn quality_checks(rows: &[ComparableAdjustment], cv: f64) -> Vec<QualityCheck> {
    let mut checks = Vec::new();

    if rows.len() < 3 {
        checks.push(QualityCheck::warning(
            CheckCode::LowSampleSize,
            format!(
                "only {} comparable(s) selected; at least 3 are recommended",
                rows.len()
            ),
        ));
    }

    if cv > 0.20 {
        checks.push(QualityCheck::warning(
            CheckCode::HighVariation,
            format!(
                "adjusted prices vary by {:.1}% of the mean (threshold 20%)",
                cv * 100.0
            ),
        ));
    }

    for row in rows {
        if row.adjustments.total().abs() > LARGE_ADJUSTMENT {
            checks.push(QualityCheck::warning(
                CheckCode::LargeAdjustment,
                format!(
                    "{} required a {:+.1}% total adjustment",
                    row.address,
                    row.adjustments.total() * 100.0
                ),
            ));
        }
    }

    for row in rows {
        if row.z_score.abs() > OUTLIER_Z_SCORE {
            checks.push(QualityCheck::warning(
                CheckCode::Outlier,
                format!(
                    "{} is {:.1} standard deviations from the mean",
                    row.address,
                    row.z_score.abs()
                ),
            ));
        }
    }

    checks
}
