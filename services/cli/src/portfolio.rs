use crate::commands::value_subject;
use crate::inputs::{load_comparables, load_subject, MarketArgs, MethodChoice, OutputFormat};
use appraisal::error::AppError;
use appraisal::report::format_currency;
use appraisal::valuation::{
    ComparableTransaction, ValuationEngine, ValuationInputs, ValuationMethod,
};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct PortfolioArgs {
    /// Subject property JSON documents
    #[arg(required = true)]
    pub(crate) subjects: Vec<PathBuf>,
    /// Comparable transactions CSV shared by every subject
    #[arg(long)]
    pub(crate) comparables: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = MethodChoice::Auto)]
    pub(crate) method: MethodChoice,
    #[command(flatten)]
    pub(crate) market: MarketArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct PortfolioEntry {
    pub(crate) source: PathBuf,
    pub(crate) subject_id: Option<String>,
    pub(crate) method: Option<ValuationMethod>,
    pub(crate) estimated_value: Option<f64>,
    pub(crate) confidence: Option<u8>,
    pub(crate) error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PortfolioSummary {
    pub(crate) entries: Vec<PortfolioEntry>,
    pub(crate) valued: usize,
    pub(crate) failed: usize,
    pub(crate) total_value: f64,
}

pub(crate) fn run_portfolio(
    engine: &ValuationEngine,
    args: PortfolioArgs,
) -> Result<(), AppError> {
    let import = load_comparables(args.comparables.as_ref())?;
    let inputs = args
        .market
        .to_inputs(args.method == MethodChoice::Professional);

    let summary = value_portfolio(
        engine,
        &args.subjects,
        &import.comparables,
        &inputs,
        args.method,
    );
    info!(
        valued = summary.valued,
        failed = summary.failed,
        "portfolio valuation finished"
    );

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            for entry in &summary.entries {
                match (&entry.error, entry.estimated_value) {
                    (None, Some(value)) => println!(
                        "{}: {} ({}%)",
                        entry.subject_id.as_deref().unwrap_or("-"),
                        format_currency(value),
                        entry.confidence.unwrap_or_default()
                    ),
                    (error, _) => println!(
                        "{}: failed ({})",
                        entry.source.display(),
                        error.as_deref().unwrap_or("no result")
                    ),
                }
            }
            println!(
                "{} valued, {} failed, total {}",
                summary.valued,
                summary.failed,
                format_currency(summary.total_value)
            );
        }
    }
    Ok(())
}

/// Values every subject in parallel. A failing subject is reported in its
/// entry and does not stop the others.
pub(crate) fn value_portfolio(
    engine: &ValuationEngine,
    subjects: &[PathBuf],
    comparables: &[ComparableTransaction],
    inputs: &ValuationInputs,
    method: MethodChoice,
) -> PortfolioSummary {
    let entries: Vec<PortfolioEntry> = subjects
        .par_iter()
        .map(|path| value_one(engine, path, comparables, inputs, method))
        .collect();

    let valued = entries.iter().filter(|entry| entry.error.is_none()).count();
    let total_value = entries
        .iter()
        .filter_map(|entry| entry.estimated_value)
        .sum();
    PortfolioSummary {
        failed: entries.len() - valued,
        valued,
        total_value,
        entries,
    }
}

fn value_one(
    engine: &ValuationEngine,
    path: &Path,
    comparables: &[ComparableTransaction],
    inputs: &ValuationInputs,
    method: MethodChoice,
) -> PortfolioEntry {
    let outcome = load_subject(path).and_then(|subject| {
        value_subject(engine, &subject, comparables, inputs, method).map(|run| (subject, run))
    });

    match outcome {
        Ok((subject, run)) => PortfolioEntry {
            source: path.to_path_buf(),
            subject_id: Some(subject.id),
            method: Some(run.final_result.method),
            estimated_value: Some(run.final_result.estimated_value),
            confidence: Some(run.final_result.confidence),
            error: None,
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "portfolio subject skipped");
            PortfolioEntry {
                source: path.to_path_buf(),
                subject_id: None,
                method: None,
                estimated_value: None,
                confidence: None,
                error: Some(err.to_string()),
            }
        }
    }
}
