use super::domain::SubjectProperty;
use super::result::{
    CalculationStep, CheckCode, MethodDetails, QualityCheck, ValuationMethod, ValuationResult,
    ValueRange,
};
use super::stats::round_to_thousand;
use serde::{Deserialize, Serialize};
use tracing::debug;

const INCOME_CONFIDENCE: u8 = 80;
const CAP_RATE_SPREAD: f64 = 0.005;

/// Rent and market assumptions for direct capitalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeAssumptions {
    pub monthly_rent: f64,
    #[serde(default = "default_vacancy_rate")]
    pub vacancy_rate: f64,
    #[serde(default = "default_opex_ratio")]
    pub opex_ratio: f64,
    #[serde(default = "default_cap_rate")]
    pub cap_rate: f64,
}

fn default_vacancy_rate() -> f64 {
    0.05
}

fn default_opex_ratio() -> f64 {
    0.30
}

fn default_cap_rate() -> f64 {
    0.05
}

impl IncomeAssumptions {
    pub fn new(monthly_rent: f64) -> Self {
        Self {
            monthly_rent,
            vacancy_rate: default_vacancy_rate(),
            opex_ratio: default_opex_ratio(),
            cap_rate: default_cap_rate(),
        }
    }

    pub fn with_vacancy_rate(mut self, vacancy_rate: f64) -> Self {
        self.vacancy_rate = vacancy_rate;
        self
    }

    pub fn with_opex_ratio(mut self, opex_ratio: f64) -> Self {
        self.opex_ratio = opex_ratio;
        self
    }

    pub fn with_cap_rate(mut self, cap_rate: f64) -> Self {
        self.cap_rate = cap_rate;
        self
    }
}

/// Capitalizes stabilised net operating income into a value.
pub fn calculate_income_approach(
    subject: &SubjectProperty,
    assumptions: &IncomeAssumptions,
) -> ValuationResult {
    let IncomeAssumptions {
        monthly_rent,
        vacancy_rate,
        opex_ratio,
        cap_rate,
    } = *assumptions;

    let gross_annual = monthly_rent * 12.0;
    let effective_gross = gross_annual * (1.0 - vacancy_rate);
    let noi = effective_gross * (1.0 - opex_ratio);

    let (estimated_value, value_range) = if cap_rate > 0.0 {
        let estimate = round_to_thousand(noi / cap_rate);
        let low = round_to_thousand(noi / (cap_rate + CAP_RATE_SPREAD));
        let high_rate = cap_rate - CAP_RATE_SPREAD;
        let high = if high_rate > 0.0 {
            round_to_thousand(noi / high_rate)
        } else {
            estimate
        };
        (
            estimate,
            ValueRange::spanning(low.min(estimate), high.max(estimate)),
        )
    } else {
        (0.0, ValueRange { min: 0.0, max: 0.0 })
    };

    let calculation_steps = vec![
        CalculationStep::new(
            "Gross annual income",
            "Scheduled rent for twelve months",
            "monthly_rent × 12",
            gross_annual,
        )
        .input("monthly_rent", monthly_rent),
        CalculationStep::new(
            "Effective gross income",
            "Gross income after vacancy and collection loss",
            "gross_annual × (1 − vacancy_rate)",
            effective_gross,
        )
        .input("vacancy_rate", vacancy_rate),
        CalculationStep::new(
            "Net operating income",
            "Effective gross income after operating expenses",
            "effective_gross × (1 − opex_ratio)",
            noi,
        )
        .input("opex_ratio", opex_ratio),
        CalculationStep::new(
            "Capitalized value",
            "NOI capitalized at the market rate, rounded to the nearest 1,000",
            "round(NOI / cap_rate / 1000) × 1000",
            estimated_value,
        )
        .input("cap_rate", cap_rate)
        .input("range_min", value_range.min)
        .input("range_max", value_range.max),
    ];

    let quality_checks = quality_checks(assumptions);

    debug!(subject = %subject.id, estimated_value, noi, cap_rate, "income approach calculated");

    ValuationResult {
        method: ValuationMethod::IncomeApproach,
        estimated_value,
        value_range,
        confidence: INCOME_CONFIDENCE,
        calculation_steps,
        methodology: "Income capitalization: annual rent less vacancy and operating expenses \
                      gives net operating income, which is divided by a market capitalization \
                      rate. The range re-capitalizes NOI at ±0.5 percentage points."
            .to_string(),
        reconciliation: None,
        assumptions: vec![
            format!("Vacancy and collection loss of {:.1}%.", vacancy_rate * 100.0),
            format!("Operating expenses at {:.1}% of effective gross income.", opex_ratio * 100.0),
            format!("Capitalization rate of {:.2}%.", cap_rate * 100.0),
        ],
        limitations: vec![
            "Direct capitalization of a single stabilised year; no multi-period cash-flow \
             projection."
                .to_string(),
        ],
        quality_checks,
        details: MethodDetails::IncomeApproach {
            gross_annual_income: gross_annual,
            effective_gross_income: effective_gross,
            net_operating_income: noi,
            vacancy_rate,
            opex_ratio,
            cap_rate,
        },
    }
}

fn quality_checks(assumptions: &IncomeAssumptions) -> Vec<QualityCheck> {
    let mut checks = Vec::new();

    if assumptions.monthly_rent <= 0.0 {
        checks.push(QualityCheck::error(
            CheckCode::InvalidRent,
            "monthly rent must be positive",
        ));
    }
    if !(0.0..=0.30).contains(&assumptions.vacancy_rate) {
        checks.push(QualityCheck::warning(
            CheckCode::VacancyOutOfRange,
            format!(
                "vacancy rate of {:.1}% is outside the typical 0-30% band",
                assumptions.vacancy_rate * 100.0
            ),
        ));
    }
    if !(0.10..=0.60).contains(&assumptions.opex_ratio) {
        checks.push(QualityCheck::warning(
            CheckCode::OpexOutOfRange,
            format!(
                "operating expense ratio of {:.1}% is outside the typical 10-60% band",
                assumptions.opex_ratio * 100.0
            ),
        ));
    }
    if assumptions.cap_rate <= 0.0 {
        checks.push(QualityCheck::error(
            CheckCode::InvalidCapRate,
            "capitalization rate must be positive",
        ));
    } else if !(0.03..=0.12).contains(&assumptions.cap_rate) {
        checks.push(QualityCheck::warning(
            CheckCode::CapRateOutOfRange,
            format!(
                "capitalization rate of {:.2}% is outside the typical 3-12% band",
                assumptions.cap_rate * 100.0
            ),
        ));
    }

    checks
}
