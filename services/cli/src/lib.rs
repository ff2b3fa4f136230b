mod cli;
mod commands;
mod inputs;
mod portfolio;
mod render;

use appraisal::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
