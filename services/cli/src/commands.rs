use crate::inputs::{load_comparables, load_subject, MarketArgs, MethodChoice, OutputFormat};
use crate::render;
use appraisal::error::AppError;
use appraisal::import::ComparableImporter;
use appraisal::report::ValuationReport;
use appraisal::valuation::{
    ComparableTransaction, CostApproachInputs, IncomeAssumptions, MarketContext,
    SubjectProperty, ValuationEngine, ValuationError, ValuationInputs, ValuationResult,
    ValuationRun,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct ValueArgs {
    /// Subject property JSON document
    #[arg(long)]
    pub(crate) subject: PathBuf,
    /// Comparable transactions CSV
    #[arg(long)]
    pub(crate) comparables: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = MethodChoice::Auto)]
    pub(crate) method: MethodChoice,
    #[command(flatten)]
    pub(crate) market: MarketArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Print the full report sections instead of the summary
    #[arg(long)]
    pub(crate) report: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Subject property JSON document
    #[arg(long)]
    pub(crate) subject: PathBuf,
    /// Comparable transactions CSV
    #[arg(long)]
    pub(crate) comparables: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) market: MarketArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Comparable transactions CSV to validate
    pub(crate) path: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Serialize)]
struct ValueOutput<'a> {
    #[serde(flatten)]
    run: &'a ValuationRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ValuationReport>,
}

pub(crate) fn run_value(engine: &ValuationEngine, args: ValueArgs) -> Result<(), AppError> {
    let subject = load_subject(&args.subject)?;
    let import = load_comparables(args.comparables.as_ref())?;
    for error in &import.errors {
        warn!(row = error.row, "{}", error.message);
    }

    let inputs = args
        .market
        .to_inputs(args.method == MethodChoice::Professional);
    let run = value_subject(engine, &subject, &import.comparables, &inputs, args.method)?;
    let report = args
        .report
        .then(|| ValuationReport::from_run(&subject, &run));

    match args.format {
        OutputFormat::Json => {
            let output = ValueOutput { run: &run, report };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => match report {
            Some(report) => println!("{}", report.render_text()),
            None => print!("{}", render::run_summary(&subject, &run)),
        },
    }
    Ok(())
}

/// Runs the chosen method(s). `Auto` defers to the selector; the rest run
/// exactly what was asked for.
pub(crate) fn value_subject(
    engine: &ValuationEngine,
    subject: &SubjectProperty,
    comparables: &[ComparableTransaction],
    inputs: &ValuationInputs,
    method: MethodChoice,
) -> Result<ValuationRun, AppError> {
    if method == MethodChoice::Auto {
        let run = engine.value_with_recommendation(subject, comparables, inputs)?;
        return Ok(run);
    }

    let recommendation = engine.recommend(subject, comparables, inputs);
    let method_results = match method {
        MethodChoice::Sales => vec![engine.sales_comparison(subject, comparables)?],
        MethodChoice::Professional => {
            let context = MarketContext {
                valuation_date: inputs.valuation_date,
                market_price_per_sqm: inputs.market_price_per_sqm,
            };
            vec![engine.professional_sales_comparison(subject, comparables, &context)?]
        }
        MethodChoice::Cost => vec![engine.cost_approach(subject, &cost_inputs(inputs))],
        MethodChoice::Income => vec![engine.income_approach(subject, &income_inputs(inputs))],
        MethodChoice::Hybrid | MethodChoice::Auto => {
            every_supported_method(engine, subject, comparables, inputs)?
        }
    };

    let final_result = match method_results.as_slice() {
        [single] => single.clone(),
        _ => engine.reconcile(&method_results, inputs.weights.as_ref())?,
    };
    Ok(ValuationRun {
        recommendation,
        method_results,
        final_result,
    })
}

fn cost_inputs(inputs: &ValuationInputs) -> CostApproachInputs {
    CostApproachInputs {
        land_value: inputs.land_value.unwrap_or_default(),
        construction_cost_per_sqm: inputs.construction_cost_per_sqm.unwrap_or_default(),
        valuation_date: inputs.valuation_date,
    }
}

fn income_inputs(inputs: &ValuationInputs) -> IncomeAssumptions {
    inputs
        .income
        .unwrap_or_else(|| IncomeAssumptions::new(0.0))
}

fn every_supported_method(
    engine: &ValuationEngine,
    subject: &SubjectProperty,
    comparables: &[ComparableTransaction],
    inputs: &ValuationInputs,
) -> Result<Vec<ValuationResult>, AppError> {
    let mut results = Vec::new();
    if comparables.iter().any(|comp| comp.selected) {
        results.push(engine.sales_comparison(subject, comparables)?);
    }
    if inputs.land_value.is_some() && inputs.construction_cost_per_sqm.is_some() {
        results.push(engine.cost_approach(subject, &cost_inputs(inputs)));
    }
    if inputs.income.is_some() {
        results.push(engine.income_approach(subject, &income_inputs(inputs)));
    }
    if results.is_empty() {
        return Err(ValuationError::NoApplicableMethod.into());
    }
    Ok(results)
}

pub(crate) fn run_recommend(
    engine: &ValuationEngine,
    args: RecommendArgs,
) -> Result<(), AppError> {
    let subject = load_subject(&args.subject)?;
    let import = load_comparables(args.comparables.as_ref())?;
    let inputs = args.market.to_inputs(false);
    let recommendation = engine.recommend(&subject, &import.comparables, &inputs);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recommendation)?),
        OutputFormat::Text => print!("{}", render::recommendation(&subject, &recommendation)),
    }
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let import = ComparableImporter::from_path(&args.path)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&import)?),
        OutputFormat::Text => print!("{}", render::import_summary(&import)),
    }
    Ok(())
}
