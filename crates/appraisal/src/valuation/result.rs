use super::domain::AdjustmentVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_CONFIDENCE: u8 = 40;
pub const MAX_CONFIDENCE: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    SalesComparison,
    CostApproach,
    IncomeApproach,
    Hybrid,
}

impl ValuationMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SalesComparison => "Sales Comparison",
            Self::CostApproach => "Cost Approach",
            Self::IncomeApproach => "Income Capitalization",
            Self::Hybrid => "Hybrid Reconciliation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Builds a range from two bounds regardless of their order.
    pub fn spanning(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// One auditable line of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    pub label: String,
    pub description: String,
    pub formula: String,
    pub inputs: BTreeMap<String, f64>,
    pub result: f64,
}

impl CalculationStep {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        formula: impl Into<String>,
        result: f64,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            formula: formula.into(),
            inputs: BTreeMap::new(),
            result,
        }
    }

    pub fn input(mut self, name: impl Into<String>, value: f64) -> Self {
        self.inputs.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// Closed set of diagnostics so callers can filter without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCode {
    LowSampleSize,
    HighVariation,
    LargeAdjustment,
    Outlier,
    ComparablesExcluded,
    ConditionAssumed,
    MissingInput,
    CostOutOfRange,
    HighDepreciation,
    InvalidRent,
    VacancyOutOfRange,
    OpexOutOfRange,
    InvalidCapRate,
    CapRateOutOfRange,
    MethodDivergence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub severity: Severity,
    pub code: CheckCode,
    pub message: String,
}

impl QualityCheck {
    pub fn info(code: CheckCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: CheckCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: CheckCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }
}

/// Per-comparable audit row for the standard sales comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableAdjustment {
    pub address: String,
    pub sale_price: f64,
    pub adjustments: AdjustmentVector,
    pub adjusted_price: f64,
    pub weight: f64,
    pub z_score: f64,
}

/// Shekel-denominated adjustments applied by the professional variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteAdjustments {
    pub area: f64,
    pub floor: f64,
    pub condition: f64,
}

impl AbsoluteAdjustments {
    pub fn total(&self) -> f64 {
        self.area + self.floor + self.condition
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub address: String,
    pub sale_price: f64,
    pub adjustments: AbsoluteAdjustments,
    pub adjusted_price: f64,
    pub time_decay: f64,
    pub distance_decay: f64,
    pub data_quality: f64,
    pub weight: f64,
    pub normalized_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    AreaMismatch,
    NonPositivePrice,
    OutsideRadius,
}

impl ExclusionReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AreaMismatch => "built area differs by more than 25%",
            Self::NonPositivePrice => "sale price is not positive",
            Self::OutsideRadius => "outside the search radius",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedComparable {
    pub address: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodContribution {
    pub method: ValuationMethod,
    pub estimated_value: f64,
    pub weight: f64,
    pub share: f64,
}

/// Method-specific calculation metadata carried next to the shared shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MethodDetails {
    SalesComparison {
        comparables: Vec<ComparableAdjustment>,
        unweighted_mean: f64,
        weighted_mean: f64,
        standard_deviation: f64,
        coefficient_of_variation: f64,
    },
    ProfessionalSalesComparison {
        transaction_details: Vec<TransactionDetail>,
        excluded: Vec<ExcludedComparable>,
        market_price_per_sqm: f64,
        search_radius_km: f64,
    },
    CostApproach {
        land_value: f64,
        building_cost: f64,
        actual_age: i32,
        effective_age: i32,
        depreciation_rate: f64,
        depreciation: f64,
    },
    IncomeApproach {
        gross_annual_income: f64,
        effective_gross_income: f64,
        net_operating_income: f64,
        vacancy_rate: f64,
        opex_ratio: f64,
        cap_rate: f64,
    },
    Hybrid {
        contributions: Vec<MethodContribution>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub method: ValuationMethod,
    pub estimated_value: f64,
    pub value_range: ValueRange,
    pub confidence: u8,
    pub calculation_steps: Vec<CalculationStep>,
    pub methodology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<String>,
    pub assumptions: Vec<String>,
    pub limitations: Vec<String>,
    #[serde(default)]
    pub quality_checks: Vec<QualityCheck>,
    pub details: MethodDetails,
}

impl ValuationResult {
    pub fn has_errors(&self) -> bool {
        self.quality_checks
            .iter()
            .any(|check| check.severity == Severity::Error)
    }

    pub fn checks_with(&self, code: CheckCode) -> impl Iterator<Item = &QualityCheck> {
        self.quality_checks
            .iter()
            .filter(move |check| check.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanning_orders_bounds() {
        let range = ValueRange::spanning(1_100_000.0, 900_000.0);
        assert_eq!(range.min, 900_000.0);
        assert_eq!(range.max, 1_100_000.0);
        assert!(range.contains(1_000_000.0));
        assert!(!range.contains(1_200_000.0));
    }

    #[test]
    fn check_codes_serialize_as_kebab_case() {
        let check = QualityCheck::warning(CheckCode::MethodDivergence, "spread");
        let json = serde_json::to_value(&check).expect("serializes");
        assert_eq!(json["code"], "method-divergence");
        assert_eq!(json["severity"], "warning");
    }
}
