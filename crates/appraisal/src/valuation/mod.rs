//! Valuation engine: comparable adjustments, the three appraisal methods,
//! reconciliation and method selection.
//!
//! Every calculator is a pure function of its inputs and a borrowed
//! [`CoefficientTables`]; [`ValuationEngine`] only bundles the tables with the
//! calls so callers can share one engine across threads.

pub mod adjustments;
pub mod coefficients;
pub mod cost;
pub mod domain;
pub mod income;
pub mod professional;
pub mod reconciliation;
pub mod result;
pub mod sales_comparison;
pub mod selector;
mod stats;
pub mod validation;

#[cfg(test)]
pub(crate) mod tests;

pub use adjustments::adjust;
pub use coefficients::{CoefficientError, CoefficientTables};
pub use cost::{calculate_cost_approach, CostApproachInputs};
pub use domain::{
    AdjustmentVector, Address, Amenities, ComparableTransaction, PropertyCondition,
    PropertyDetails, PropertyType, SubjectProperty, ValuationError,
};
pub use income::{calculate_income_approach, IncomeAssumptions};
pub use professional::{calculate_comparable_sales_approach_professional, MarketContext};
pub use reconciliation::{reconcile_valuations, MethodWeights};
pub use result::{
    CalculationStep, CheckCode, MethodDetails, QualityCheck, Severity, ValuationMethod,
    ValuationResult, ValueRange,
};
pub use sales_comparison::calculate_comparable_sales_approach;
pub use selector::{
    recommend_valuation_method, RequiredInput, SelectionContext, ValuationRecommendation,
};
pub use validation::{
    partition_valid, validate_comparable, validate_comparables, validate_subject, ValidationIssue,
};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

/// Optional market data and per-call overrides for an end-to-end run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInputs {
    pub valuation_date: NaiveDate,
    pub land_value: Option<f64>,
    pub construction_cost_per_sqm: Option<f64>,
    pub income: Option<IncomeAssumptions>,
    pub market_price_per_sqm: Option<f64>,
    pub weights: Option<MethodWeights>,
    /// Use the professional sales comparison variant.
    pub professional: bool,
}

impl ValuationInputs {
    pub fn new(valuation_date: NaiveDate) -> Self {
        Self {
            valuation_date,
            land_value: None,
            construction_cost_per_sqm: None,
            income: None,
            market_price_per_sqm: None,
            weights: None,
            professional: false,
        }
    }

    fn selection_context(&self, comparables: &[ComparableTransaction]) -> SelectionContext {
        SelectionContext {
            selected_comparables: comparables.iter().filter(|comp| comp.selected).count(),
            monthly_rent: self.income.map(|income| income.monthly_rent),
            land_value: self.land_value,
            construction_cost_per_sqm: self.construction_cost_per_sqm,
        }
    }
}

/// Outcome of a recommendation-driven run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationRun {
    pub recommendation: ValuationRecommendation,
    pub method_results: Vec<ValuationResult>,
    pub final_result: ValuationResult,
}

#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    tables: CoefficientTables,
}

impl ValuationEngine {
    pub fn new(tables: CoefficientTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &CoefficientTables {
        &self.tables
    }

    pub fn adjust(
        &self,
        subject: &SubjectProperty,
        comparable: &ComparableTransaction,
    ) -> AdjustmentVector {
        adjust(&self.tables, subject, comparable)
    }

    pub fn sales_comparison(
        &self,
        subject: &SubjectProperty,
        comparables: &[ComparableTransaction],
    ) -> Result<ValuationResult, ValuationError> {
        calculate_comparable_sales_approach(&self.tables, subject, comparables)
    }

    pub fn professional_sales_comparison(
        &self,
        subject: &SubjectProperty,
        comparables: &[ComparableTransaction],
        context: &MarketContext,
    ) -> Result<ValuationResult, ValuationError> {
        calculate_comparable_sales_approach_professional(
            &self.tables,
            subject,
            comparables,
            context,
        )
    }

    pub fn cost_approach(
        &self,
        subject: &SubjectProperty,
        inputs: &CostApproachInputs,
    ) -> ValuationResult {
        calculate_cost_approach(&self.tables, subject, inputs)
    }

    pub fn income_approach(
        &self,
        subject: &SubjectProperty,
        assumptions: &IncomeAssumptions,
    ) -> ValuationResult {
        calculate_income_approach(subject, assumptions)
    }

    pub fn reconcile(
        &self,
        results: &[ValuationResult],
        weights: Option<&MethodWeights>,
    ) -> Result<ValuationResult, ValuationError> {
        reconcile_valuations(results, weights)
    }

    pub fn recommend(
        &self,
        subject: &SubjectProperty,
        comparables: &[ComparableTransaction],
        inputs: &ValuationInputs,
    ) -> ValuationRecommendation {
        recommend_valuation_method(subject, &inputs.selection_context(comparables))
    }

    /// Runs the recommended method and every fallback whose inputs are
    /// available, reconciling when more than one produced a result.
    pub fn value_with_recommendation(
        &self,
        subject: &SubjectProperty,
        comparables: &[ComparableTransaction],
        inputs: &ValuationInputs,
    ) -> Result<ValuationRun, ValuationError> {
        let context = inputs.selection_context(comparables);
        let recommendation = recommend_valuation_method(subject, &context);

        let mut method_results = Vec::new();
        let mut last_error = None;
        let candidates = std::iter::once(recommendation.recommended)
            .chain(recommendation.fallbacks.iter().copied());
        for method in candidates {
            if !context.supports(method) {
                continue;
            }
            match self.run_method(method, subject, comparables, inputs) {
                Ok(result) => method_results.push(result),
                Err(err) => {
                    warn!(method = method.label(), error = %err, "valuation method skipped");
                    last_error = Some(err);
                }
            }
        }

        let final_result = match method_results.len() {
            0 => return Err(last_error.unwrap_or(ValuationError::NoApplicableMethod)),
            1 => method_results[0].clone(),
            _ => reconcile_valuations(&method_results, inputs.weights.as_ref())?,
        };

        info!(
            subject = %subject.id,
            methods = method_results.len(),
            estimated_value = final_result.estimated_value,
            "valuation completed"
        );

        Ok(ValuationRun {
            recommendation,
            method_results,
            final_result,
        })
    }

    fn run_method(
        &self,
        method: ValuationMethod,
        subject: &SubjectProperty,
        comparables: &[ComparableTransaction],
        inputs: &ValuationInputs,
    ) -> Result<ValuationResult, ValuationError> {
        match method {
            ValuationMethod::SalesComparison if inputs.professional => {
                let context = MarketContext {
                    valuation_date: inputs.valuation_date,
                    market_price_per_sqm: inputs.market_price_per_sqm,
                };
                self.professional_sales_comparison(subject, comparables, &context)
            }
            ValuationMethod::SalesComparison => self.sales_comparison(subject, comparables),
            ValuationMethod::CostApproach => {
                let cost_inputs = CostApproachInputs {
                    land_value: inputs.land_value.unwrap_or_default(),
                    construction_cost_per_sqm: inputs.construction_cost_per_sqm.unwrap_or_default(),
                    valuation_date: inputs.valuation_date,
                };
                Ok(self.cost_approach(subject, &cost_inputs))
            }
            ValuationMethod::IncomeApproach => {
                let assumptions = inputs.income.unwrap_or_else(|| IncomeAssumptions::new(0.0));
                Ok(self.income_approach(subject, &assumptions))
            }
            ValuationMethod::Hybrid => Err(ValuationError::NoApplicableMethod),
        }
    }
}
