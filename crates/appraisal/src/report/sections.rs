use super::{format_currency, ReportSection, ReportSectionKind};
use crate::valuation::{Severity, SubjectProperty, ValuationMethod, ValuationResult};
use std::fmt::Write;

/// Builds the report sections in reading order. The headline figure is the
/// reconciled result when one is present, otherwise the first result.
pub fn build_report_sections(
    subject: &SubjectProperty,
    results: &[ValuationResult],
) -> Vec<ReportSection> {
    let headline = results
        .iter()
        .find(|result| result.method == ValuationMethod::Hybrid)
        .or_else(|| results.first());

    ReportSectionKind::ordered()
        .into_iter()
        .map(|kind| {
            let content = match kind {
                ReportSectionKind::PropertyIdentification => property_identification(subject),
                ReportSectionKind::ValuationSummary => valuation_summary(headline, results),
                ReportSectionKind::Methodology => methodology(results),
                ReportSectionKind::CalculationTrail => calculation_trail(results),
                ReportSectionKind::QualityReview => quality_review(results),
                ReportSectionKind::AssumptionsAndLimitations => {
                    assumptions_and_limitations(headline)
                }
            };
            ReportSection {
                kind,
                title: kind.label().to_string(),
                content,
            }
        })
        .collect()
}

fn property_identification(subject: &SubjectProperty) -> String {
    let address = &subject.address;
    let details = &subject.details;
    let mut out = String::new();

    writeln!(out, "Street: {}", address.street).expect("write street");
    writeln!(out, "City: {}", address.city).expect("write city");
    if let Some(neighborhood) = &address.neighborhood {
        writeln!(out, "Neighborhood: {neighborhood}").expect("write neighborhood");
    }
    if let (Some(block), Some(parcel)) = (&address.block, &address.parcel) {
        writeln!(out, "Block/Parcel: {block}/{parcel}").expect("write block parcel");
    }
    writeln!(out, "Property type: {}", subject.property_type.label())
        .expect("write property type");
    writeln!(
        out,
        "Built area: {:.0} sqm, {} rooms",
        details.built_area, details.rooms
    )
    .expect("write built area");
    match details.total_floors {
        Some(total) => {
            writeln!(out, "Floor: {} of {}", details.floor, total).expect("write floor");
        }
        None => {
            writeln!(out, "Floor: {}", details.floor).expect("write floor");
        }
    }
    writeln!(out, "Build year: {}", details.build_year).expect("write build year");
    writeln!(out, "Condition: {}", details.condition.label()).expect("write condition");
    if !subject.features.is_empty() {
        writeln!(out, "Features: {}", subject.features.join(", ")).expect("write features");
    }
    out
}

fn valuation_summary(headline: Option<&ValuationResult>, results: &[ValuationResult]) -> String {
    let Some(headline) = headline else {
        return "No valuation result was produced.\n".to_string();
    };
    let mut out = String::new();

    writeln!(
        out,
        "Estimated value: {} ({})",
        format_currency(headline.estimated_value),
        headline.method.label()
    )
    .expect("write estimated value");
    writeln!(
        out,
        "Value range: {} - {}",
        format_currency(headline.value_range.min),
        format_currency(headline.value_range.max)
    )
    .expect("write value range");
    writeln!(out, "Confidence: {}%", headline.confidence).expect("write confidence");

    let others: Vec<&ValuationResult> = results
        .iter()
        .filter(|result| !std::ptr::eq(*result, headline))
        .collect();
    if !others.is_empty() {
        writeln!(out, "Method estimates:").expect("write method estimates");
        for result in others {
            writeln!(
                out,
                "  {}: {} (confidence {}%)",
                result.method.label(),
                format_currency(result.estimated_value),
                result.confidence
            )
            .expect("write method estimate");
        }
    }
    if let Some(reconciliation) = &headline.reconciliation {
        writeln!(out, "{reconciliation}").expect("write reconciliation");
    }
    out
}

fn methodology(results: &[ValuationResult]) -> String {
    results
        .iter()
        .map(|result| format!("{}: {}\n", result.method.label(), result.methodology))
        .collect()
}

fn calculation_trail(results: &[ValuationResult]) -> String {
    let mut out = String::new();
    for result in results {
        writeln!(out, "[{}]", result.method.label()).expect("write method header");
        for step in &result.calculation_steps {
            writeln!(
                out,
                "  {}: {:.2}  ({})",
                step.label, step.result, step.formula
            )
            .expect("write step");
            if !step.inputs.is_empty() {
                let inputs = step
                    .inputs
                    .iter()
                    .map(|(name, value)| format!("{name}={value:.4}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(out, "    inputs: {inputs}").expect("write inputs");
            }
        }
    }
    out
}

fn quality_review(results: &[ValuationResult]) -> String {
    // Reconciled results already carry their inputs' checks.
    let reviewed = match results
        .iter()
        .find(|result| result.method == ValuationMethod::Hybrid)
    {
        Some(hybrid) => std::slice::from_ref(hybrid),
        None => results,
    };

    let mut out = String::new();
    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        for check in reviewed
            .iter()
            .flat_map(|result| result.quality_checks.iter())
            .filter(|check| check.severity == severity)
        {
            writeln!(out, "{}: {}", severity.label(), check.message)
                .expect("write quality check");
        }
    }
    if out.is_empty() {
        out.push_str("No quality issues were detected.\n");
    }
    out
}

fn assumptions_and_limitations(headline: Option<&ValuationResult>) -> String {
    let Some(headline) = headline else {
        return String::new();
    };
    let mut out = String::from("Assumptions:\n");
    for assumption in &headline.assumptions {
        writeln!(out, "  - {assumption}").expect("write assumption");
    }
    out.push_str("Limitations:\n");
    for limitation in &headline.limitations {
        writeln!(out, "  - {limitation}").expect("write limitation");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::tests::common::{fixed_result, subject};
    use crate::valuation::{CheckCode, QualityCheck};

    #[test]
    fn sections_follow_reading_order() {
        let result = fixed_result(ValuationMethod::SalesComparison, 3_000_000.0, 88);
        let sections = build_report_sections(&subject(), &[result]);

        let kinds: Vec<_> = sections.iter().map(|section| section.kind).collect();
        assert_eq!(kinds, ReportSectionKind::ordered().to_vec());
        assert!(sections[0].content.contains("Rothschild Blvd 45"));
        assert!(sections[1].content.contains("₪3,000,000"));
    }

    #[test]
    fn reconciled_result_is_the_headline() {
        let sales = fixed_result(ValuationMethod::SalesComparison, 3_000_000.0, 90);
        let cost = fixed_result(ValuationMethod::CostApproach, 2_000_000.0, 75);
        let mut hybrid = fixed_result(ValuationMethod::Hybrid, 2_600_000.0, 84);
        hybrid
            .quality_checks
            .push(QualityCheck::warning(CheckCode::MethodDivergence, "methods disagree"));

        let sections = build_report_sections(&subject(), &[sales, cost, hybrid]);

        let summary = &sections[1].content;
        assert!(summary.starts_with("Estimated value: ₪2,600,000 (Hybrid Reconciliation)"));
        assert!(summary.contains("Cost Approach: ₪2,000,000"));
        assert!(sections[4].content.contains("Warning: methods disagree"));
    }

    #[test]
    fn empty_results_still_identify_the_property() {
        let sections = build_report_sections(&subject(), &[]);

        assert_eq!(sections.len(), 6);
        assert!(sections[0].content.contains("Block/Parcel: 6942/17"));
        assert!(sections[1].content.contains("No valuation result"));
        assert!(sections[4].content.contains("No quality issues"));
    }
}
