use crate::commands::{
    run_import, run_recommend, run_value, ImportArgs, RecommendArgs, ValueArgs,
};
use crate::portfolio::{run_portfolio, PortfolioArgs};
use appraisal::config::AppConfig;
use appraisal::error::AppError;
use appraisal::telemetry;
use appraisal::valuation::ValuationEngine;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "appraise",
    about = "Value residential and commercial property from comparables, cost and income data",
    version
)]
struct Cli {
    /// Enable debug logging for the valuation engine
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Value a subject property and print the result or full report
    Value(ValueArgs),
    /// Recommend a valuation method from the available data
    Recommend(RecommendArgs),
    /// Validate a comparable transactions CSV
    Import(ImportArgs),
    /// Value several subject properties against one comparables file
    Portfolio(PortfolioArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, cli.verbose)?;

    let engine = ValuationEngine::new(config.coefficient_tables()?);
    debug!(
        environment = ?config.environment,
        custom_tables = config.valuation.coefficients_path.is_some(),
        "valuation engine ready"
    );

    match cli.command {
        Command::Value(args) => run_value(&engine, args),
        Command::Recommend(args) => run_recommend(&engine, args),
        Command::Import(args) => run_import(args),
        Command::Portfolio(args) => run_portfolio(&engine, args),
    }
}
