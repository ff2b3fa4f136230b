mod sections;

pub use sections::build_report_sections;

use crate::valuation::{SubjectProperty, ValuationMethod, ValuationRun};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSectionKind {
    PropertyIdentification,
    ValuationSummary,
    Methodology,
    CalculationTrail,
    QualityReview,
    AssumptionsAndLimitations,
}

impl ReportSectionKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::PropertyIdentification,
            Self::ValuationSummary,
            Self::Methodology,
            Self::CalculationTrail,
            Self::QualityReview,
            Self::AssumptionsAndLimitations,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PropertyIdentification => "Property Identification",
            Self::ValuationSummary => "Valuation Summary",
            Self::Methodology => "Methodology",
            Self::CalculationTrail => "Calculation Trail",
            Self::QualityReview => "Quality Review",
            Self::AssumptionsAndLimitations => "Assumptions & Limitations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub kind: ReportSectionKind,
    pub title: String,
    pub content: String,
}

/// Plain-text appraisal report assembled from a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub subject_id: String,
    pub sections: Vec<ReportSection>,
}

impl ValuationReport {
    /// Uses every method result, plus the reconciled figure when the run
    /// blended more than one method.
    pub fn from_run(subject: &SubjectProperty, run: &ValuationRun) -> Self {
        let mut results = run.method_results.clone();
        if run.final_result.method == ValuationMethod::Hybrid {
            results.push(run.final_result.clone());
        }
        Self {
            subject_id: subject.id.clone(),
            sections: build_report_sections(subject, &results),
        }
    }

    pub fn section(&self, kind: ReportSectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn render_text(&self) -> String {
        self.sections
            .iter()
            .map(|section| {
                let rule = "=".repeat(section.title.chars().count());
                format!("{}\n{}\n{}\n", section.title, rule, section.content.trim_end())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Formats an amount as whole shekels with thousands separators.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-₪{grouped}")
    } else {
        format!("₪{grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(3_309_000.0), "₪3,309,000");
        assert_eq!(format_currency(950.4), "₪950");
        assert_eq!(format_currency(-12_500.0), "-₪12,500");
        assert_eq!(format_currency(0.0), "₪0");
    }

    #[test]
    fn section_kinds_are_ordered_for_reading() {
        let labels: Vec<_> = ReportSectionKind::ordered()
            .iter()
            .map(|kind| kind.label())
            .collect();
        assert_eq!(labels.first(), Some(&"Property Identification"));
        assert_eq!(labels.last(), Some(&"Assumptions & Limitations"));
    }
}
