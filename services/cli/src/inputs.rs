use appraisal::error::AppError;
use appraisal::import::{ComparableImport, ComparableImporter};
use appraisal::valuation::{
    validate_subject, IncomeAssumptions, MethodWeights, SubjectProperty,
    ValuationInputs,
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum MethodChoice {
    /// Follow the method selector and its fallbacks
    #[default]
    Auto,
    Sales,
    Professional,
    Cost,
    Income,
    /// Every method with inputs, reconciled
    Hybrid,
}

/// Market data and overrides shared by `value`, `recommend` and `portfolio`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct MarketArgs {
    /// Valuation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Land value for the cost approach
    #[arg(long)]
    pub(crate) land_value: Option<f64>,
    /// Construction cost per sqm for the cost approach
    #[arg(long)]
    pub(crate) cost_per_sqm: Option<f64>,
    /// Market monthly rent for the income approach
    #[arg(long)]
    pub(crate) rent: Option<f64>,
    /// Vacancy and collection loss as a fraction (default 0.05)
    #[arg(long)]
    pub(crate) vacancy: Option<f64>,
    /// Operating expense ratio as a fraction (default 0.30)
    #[arg(long)]
    pub(crate) opex: Option<f64>,
    /// Capitalization rate as a fraction (default 0.05)
    #[arg(long)]
    pub(crate) cap_rate: Option<f64>,
    /// Market price per sqm baseline for the professional variant
    #[arg(long)]
    pub(crate) market_price_per_sqm: Option<f64>,
    /// Reconciliation weight for sales comparison
    #[arg(long)]
    pub(crate) sales_weight: Option<f64>,
    /// Reconciliation weight for the cost approach
    #[arg(long)]
    pub(crate) cost_weight: Option<f64>,
    /// Reconciliation weight for the income approach
    #[arg(long)]
    pub(crate) income_weight: Option<f64>,
}

impl MarketArgs {
    pub(crate) fn valuation_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    fn income(&self) -> Option<IncomeAssumptions> {
        let mut assumptions = IncomeAssumptions::new(self.rent?);
        if let Some(vacancy) = self.vacancy {
            assumptions = assumptions.with_vacancy_rate(vacancy);
        }
        if let Some(opex) = self.opex {
            assumptions = assumptions.with_opex_ratio(opex);
        }
        if let Some(cap_rate) = self.cap_rate {
            assumptions = assumptions.with_cap_rate(cap_rate);
        }
        Some(assumptions)
    }

    fn weights(&self) -> Option<MethodWeights> {
        if self.sales_weight.is_none() && self.cost_weight.is_none() && self.income_weight.is_none()
        {
            return None;
        }
        let defaults = MethodWeights::default();
        Some(MethodWeights {
            sales_comparison: self.sales_weight.unwrap_or(defaults.sales_comparison),
            cost_approach: self.cost_weight.unwrap_or(defaults.cost_approach),
            income_approach: self.income_weight.unwrap_or(defaults.income_approach),
            hybrid: defaults.hybrid,
        })
    }

    pub(crate) fn to_inputs(&self, professional: bool) -> ValuationInputs {
        ValuationInputs {
            land_value: self.land_value,
            construction_cost_per_sqm: self.cost_per_sqm,
            income: self.income(),
            market_price_per_sqm: self.market_price_per_sqm,
            weights: self.weights(),
            professional,
            ..ValuationInputs::new(self.valuation_date())
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Reads a subject JSON document. Schema problems are logged, not fatal.
pub(crate) fn load_subject(path: &Path) -> Result<SubjectProperty, AppError> {
    let file = std::fs::File::open(path)?;
    let subject: SubjectProperty = serde_json::from_reader(std::io::BufReader::new(file))?;
    for issue in validate_subject(&subject) {
        warn!(subject = %subject.id, field = issue.field, "{}", issue.message);
    }
    Ok(subject)
}

pub(crate) fn load_comparables(path: Option<&PathBuf>) -> Result<ComparableImport, AppError> {
    match path {
        Some(path) => Ok(ComparableImporter::from_path(path)?),
        None => Ok(ComparableImport::default()),
    }
}
