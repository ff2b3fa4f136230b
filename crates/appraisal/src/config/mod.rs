use crate::valuation::{CoefficientError, CoefficientTables};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub valuation: ValuationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let coefficients_path = match env::var("APPRAISAL_COEFFICIENTS") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => {
                let path = PathBuf::from(value.trim());
                if !path.is_file() {
                    return Err(ConfigError::MissingCoefficientsFile { path });
                }
                Some(path)
            }
            Err(_) => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            valuation: ValuationConfig { coefficients_path },
        })
    }

    /// Coefficient tables from the configured JSON file, or the built-in
    /// defaults when none is set.
    pub fn coefficient_tables(&self) -> Result<CoefficientTables, CoefficientError> {
        self.valuation.coefficient_tables()
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the engine's calibration comes from.
#[derive(Debug, Clone, Default)]
pub struct ValuationConfig {
    pub coefficients_path: Option<PathBuf>,
}

impl ValuationConfig {
    pub fn coefficient_tables(&self) -> Result<CoefficientTables, CoefficientError> {
        match &self.coefficients_path {
            Some(path) => CoefficientTables::from_path(path),
            None => Ok(CoefficientTables::default()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingCoefficientsFile { path: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCoefficientsFile { path } => write!(
                f,
                "APPRAISAL_COEFFICIENTS points to '{}', which is not a readable file",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
