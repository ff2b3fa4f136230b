use super::domain::ValuationError;
use super::result::{
    CalculationStep, CheckCode, MethodContribution, MethodDetails, QualityCheck, ValuationMethod,
    ValuationResult, ValueRange,
};
use super::stats::{clamp_confidence, round_to_thousand};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DIVERGENCE_THRESHOLD: f64 = 0.20;

/// Relative influence of each method in a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodWeights {
    pub sales_comparison: f64,
    pub cost_approach: f64,
    pub income_approach: f64,
    pub hybrid: f64,
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self {
            sales_comparison: 0.6,
            cost_approach: 0.4,
            income_approach: 0.6,
            hybrid: 0.0,
        }
    }
}

impl MethodWeights {
    pub fn weight_for(&self, method: ValuationMethod) -> f64 {
        match method {
            ValuationMethod::SalesComparison => self.sales_comparison,
            ValuationMethod::CostApproach => self.cost_approach,
            ValuationMethod::IncomeApproach => self.income_approach,
            ValuationMethod::Hybrid => self.hybrid,
        }
    }
}

/// Merges method outputs into one hybrid estimate. Methods whose weight is
/// zero (or negative) are left out of the normalisation.
pub fn reconcile_valuations(
    results: &[ValuationResult],
    weights: Option<&MethodWeights>,
) -> Result<ValuationResult, ValuationError> {
    if results.is_empty() {
        return Err(ValuationError::EmptyReconciliation);
    }
    let weights = weights.copied().unwrap_or_default();

    let weighted: Vec<(&ValuationResult, f64)> = results
        .iter()
        .map(|result| (result, weights.weight_for(result.method)))
        .filter(|(_, weight)| *weight > 0.0)
        .collect();
    let total_weight: f64 = weighted.iter().map(|(_, weight)| weight).sum();
    if weighted.is_empty() || total_weight <= 0.0 {
        return Err(ValuationError::NoWeightedMethods);
    }

    let blended_value = weighted
        .iter()
        .map(|(result, weight)| result.estimated_value * weight)
        .sum::<f64>()
        / total_weight;
    let blended_confidence = weighted
        .iter()
        .map(|(result, weight)| f64::from(result.confidence) * weight)
        .sum::<f64>()
        / total_weight;

    let estimated_value = round_to_thousand(blended_value);
    let min = weighted
        .iter()
        .map(|(result, _)| result.value_range.min)
        .fold(f64::INFINITY, f64::min);
    let max = weighted
        .iter()
        .map(|(result, _)| result.value_range.max)
        .fold(f64::NEG_INFINITY, f64::max);
    let value_range = ValueRange {
        min: round_to_thousand(min).min(estimated_value),
        max: round_to_thousand(max).max(estimated_value),
    };

    let contributions: Vec<MethodContribution> = weighted
        .iter()
        .map(|(result, weight)| MethodContribution {
            method: result.method,
            estimated_value: result.estimated_value,
            weight: *weight,
            share: weight / total_weight,
        })
        .collect();

    let mut calculation_steps: Vec<CalculationStep> = contributions
        .iter()
        .map(|contribution| {
            CalculationStep::new(
                format!("{} contribution", contribution.method.label()),
                "Method estimate and its normalised weight",
                "estimate × weight / Σ weight",
                contribution.estimated_value * contribution.share,
            )
            .input("estimate", contribution.estimated_value)
            .input("weight", contribution.weight)
            .input("share", contribution.share)
        })
        .collect();
    calculation_steps.push(
        CalculationStep::new(
            "Reconciled value",
            "Weight-normalised mean of method estimates, rounded to the nearest 1,000",
            "round(Σ (estimate × weight) / Σ weight / 1000) × 1000",
            estimated_value,
        )
        .input("total_weight", total_weight)
        .input("range_min", value_range.min)
        .input("range_max", value_range.max),
    );

    let mut quality_checks: Vec<QualityCheck> = results
        .iter()
        .flat_map(|result| result.quality_checks.iter().cloned())
        .collect();
    if let Some(divergence) = divergence(&weighted) {
        if divergence >= DIVERGENCE_THRESHOLD {
            quality_checks.push(QualityCheck::warning(
                CheckCode::MethodDivergence,
                format!(
                    "method estimates diverge by {:.1}% of their midpoint (threshold 20%)",
                    divergence * 100.0
                ),
            ));
        }
    }

    let mut assumptions = Vec::new();
    let mut limitations = Vec::new();
    for (result, _) in &weighted {
        for assumption in &result.assumptions {
            if !assumptions.contains(assumption) {
                assumptions.push(assumption.clone());
            }
        }
        for limitation in &result.limitations {
            if !limitations.contains(limitation) {
                limitations.push(limitation.clone());
            }
        }
    }

    let narrative = contributions
        .iter()
        .map(|contribution| {
            format!(
                "{} {:.0} at {:.0}%",
                contribution.method.label(),
                contribution.estimated_value,
                contribution.share * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    let confidence = clamp_confidence(blended_confidence);
    debug!(
        methods = contributions.len(),
        estimated_value, confidence, "valuations reconciled"
    );

    Ok(ValuationResult {
        method: ValuationMethod::Hybrid,
        estimated_value,
        value_range,
        confidence,
        calculation_steps,
        methodology: format!(
            "Reconciliation of {} method estimate(s) by weighted average.",
            contributions.len()
        ),
        reconciliation: Some(format!("Weighted contributions: {narrative}.")),
        assumptions,
        limitations,
        quality_checks,
        details: MethodDetails::Hybrid { contributions },
    })
}

/// Spread of the input estimates relative to their midpoint.
fn divergence(weighted: &[(&ValuationResult, f64)]) -> Option<f64> {
    if weighted.len() < 2 {
        return None;
    }
    let estimates = weighted.iter().map(|(result, _)| result.estimated_value);
    let low = estimates.clone().fold(f64::INFINITY, f64::min);
    let high = estimates.fold(f64::NEG_INFINITY, f64::max);
    let midpoint = (low + high) / 2.0;
    if midpoint <= 0.0 {
        return None;
    }
    Some((high - low) / midpoint)
}
