use super::domain::{PropertyType, SubjectProperty};
use super::result::ValuationMethod;
use serde::{Deserialize, Serialize};

/// Data availability the selector decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionContext {
    pub selected_comparables: usize,
    #[serde(default)]
    pub monthly_rent: Option<f64>,
    #[serde(default)]
    pub land_value: Option<f64>,
    #[serde(default)]
    pub construction_cost_per_sqm: Option<f64>,
}

impl SelectionContext {
    fn has_rent(&self) -> bool {
        self.monthly_rent.is_some_and(|rent| rent > 0.0)
    }

    fn has_cost_inputs(&self) -> bool {
        self.land_value.is_some_and(|value| value > 0.0)
            && self
                .construction_cost_per_sqm
                .is_some_and(|cost| cost > 0.0)
    }

    /// Whether the inputs a method needs are present.
    pub fn supports(&self, method: ValuationMethod) -> bool {
        match method {
            ValuationMethod::SalesComparison => self.selected_comparables > 0,
            ValuationMethod::CostApproach => self.has_cost_inputs(),
            ValuationMethod::IncomeApproach => self.has_rent(),
            ValuationMethod::Hybrid => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredInput {
    SelectedComparables,
    MonthlyRent,
    LandValue,
    ConstructionCostPerSqm,
}

impl RequiredInput {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SelectedComparables => "selected comparable transactions",
            Self::MonthlyRent => "monthly rent",
            Self::LandValue => "land value",
            Self::ConstructionCostPerSqm => "construction cost per sqm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecommendation {
    pub recommended: ValuationMethod,
    pub fallbacks: Vec<ValuationMethod>,
    pub reasons: Vec<String>,
    pub missing_inputs: Vec<RequiredInput>,
    pub warnings: Vec<String>,
}

/// Decision table keyed on property type.
pub fn recommend_valuation_method(
    subject: &SubjectProperty,
    context: &SelectionContext,
) -> ValuationRecommendation {
    let property_type = subject.property_type;
    let mut reasons = Vec::new();
    let mut missing_inputs = Vec::new();
    let mut warnings = Vec::new();

    let (recommended, fallbacks) = match property_type {
        kind if kind.is_residential() => {
            reasons.push(format!(
                "{} properties trade frequently enough for direct sales comparison",
                kind.label()
            ));
            match context.selected_comparables {
                0 => {
                    missing_inputs.push(RequiredInput::SelectedComparables);
                    warnings.push("no comparable transactions are selected".to_string());
                }
                count if count < 3 => warnings.push(format!(
                    "only {count} comparable(s) selected; confidence will be reduced"
                )),
                _ => {}
            }
            (
                ValuationMethod::SalesComparison,
                vec![ValuationMethod::CostApproach],
            )
        }
        PropertyType::Commercial => {
            reasons.push(
                "commercial property value is driven by its income stream".to_string(),
            );
            if !context.has_rent() {
                missing_inputs.push(RequiredInput::MonthlyRent);
            }
            (
                ValuationMethod::IncomeApproach,
                vec![
                    ValuationMethod::SalesComparison,
                    ValuationMethod::CostApproach,
                ],
            )
        }
        PropertyType::Land => {
            reasons.push("land is valued from its land value and development cost".to_string());
            if !context.land_value.is_some_and(|value| value > 0.0) {
                missing_inputs.push(RequiredInput::LandValue);
            }
            if !context
                .construction_cost_per_sqm
                .is_some_and(|cost| cost > 0.0)
            {
                missing_inputs.push(RequiredInput::ConstructionCostPerSqm);
            }
            warnings.push(
                "a land-residual method is not implemented; the cost approach is an \
                 approximation for land"
                    .to_string(),
            );
            (
                ValuationMethod::CostApproach,
                vec![ValuationMethod::SalesComparison],
            )
        }
        other => {
            warnings.push(format!(
                "property type '{}' is not recognised; defaulting to sales comparison",
                other.label()
            ));
            (ValuationMethod::SalesComparison, Vec::new())
        }
    };

    ValuationRecommendation {
        recommended,
        fallbacks,
        reasons,
        missing_inputs,
        warnings,
    }
}
