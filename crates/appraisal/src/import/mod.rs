//! CSV import of comparable transactions.
//!
//! Bad rows never abort a batch: each one is reported with its source line
//! and the remaining rows are still returned.

mod normalizer;
mod parser;

use crate::valuation::{validate_comparable, ComparableTransaction};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ComparableImportError {
    #[error("failed to read comparables file: {0}")]
    Io(#[from] std::io::Error),
    #[error("comparables CSV header could not be read: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparableImport {
    pub comparables: Vec<ComparableTransaction>,
    pub errors: Vec<ImportRowError>,
}

impl ComparableImport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Rows that failed, one entry per row.
    pub fn rejected_rows(&self) -> usize {
        let mut rows: Vec<usize> = self.errors.iter().map(|error| error.row).collect();
        rows.dedup();
        rows.len()
    }
}

pub struct ComparableImporter;

impl ComparableImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ComparableImport, ComparableImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ComparableImport, ComparableImportError> {
        let mut import = ComparableImport::default();

        for parsed in parser::parse_rows(reader)? {
            let row = parsed.row;
            let messages = match parsed.outcome {
                Ok(comparable) => {
                    let issues = validate_comparable(import.comparables.len(), &comparable);
                    if issues.is_empty() {
                        import.comparables.push(comparable);
                        continue;
                    }
                    issues
                        .into_iter()
                        .map(|issue| format!("{}: {}", issue.field, issue.message))
                        .collect()
                }
                Err(messages) => messages,
            };

            warn!(row, problems = messages.len(), "comparable row rejected");
            import.errors.extend(
                messages
                    .into_iter()
                    .map(|message| ImportRowError { row, message }),
            );
        }

        debug!(
            imported = import.comparables.len(),
            rejected = import.rejected_rows(),
            "comparable import finished"
        );
        Ok(import)
    }
}
