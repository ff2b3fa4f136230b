use appraisal::import::ComparableImport;
use appraisal::report::format_currency;
use appraisal::valuation::{SubjectProperty, ValuationRecommendation, ValuationResult, ValuationRun};
use std::fmt::Write;

pub(crate) fn run_summary(subject: &SubjectProperty, run: &ValuationRun) -> String {
    let mut out = String::new();
    writeln!(out, "Valuation for {}", subject.address.display_line()).expect("write heading");
    writeln!(
        out,
        "Recommended method: {}",
        run.recommendation.recommended.label()
    )
    .expect("write recommended method");
    for warning in &run.recommendation.warnings {
        writeln!(out, "  ! {warning}").expect("write warning");
    }

    out.push('\n');
    for result in &run.method_results {
        out.push_str(&result_line(result));
    }
    if run.method_results.len() > 1 {
        out.push_str(&result_line(&run.final_result));
    }

    let checks = &run.final_result.quality_checks;
    if !checks.is_empty() {
        writeln!(out, "\nQuality checks:").expect("write checks heading");
        for check in checks {
            writeln!(out, "  [{}] {}", check.severity.label(), check.message)
                .expect("write quality check");
        }
    }
    out
}

fn result_line(result: &ValuationResult) -> String {
    format!(
        "- {}: {} (range {} - {}, confidence {}%)\n",
        result.method.label(),
        format_currency(result.estimated_value),
        format_currency(result.value_range.min),
        format_currency(result.value_range.max),
        result.confidence
    )
}

pub(crate) fn recommendation(
    subject: &SubjectProperty,
    recommendation: &ValuationRecommendation,
) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{} ({})",
        subject.address.display_line(),
        subject.property_type.label()
    )
    .expect("write heading");
    writeln!(out, "Recommended: {}", recommendation.recommended.label())
        .expect("write recommended method");
    if !recommendation.fallbacks.is_empty() {
        let fallbacks = recommendation
            .fallbacks
            .iter()
            .map(|method| method.label())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "Fallbacks: {fallbacks}").expect("write fallbacks");
    }
    for reason in &recommendation.reasons {
        writeln!(out, "  - {reason}").expect("write reason");
    }
    for input in &recommendation.missing_inputs {
        writeln!(out, "  missing: {}", input.label()).expect("write missing input");
    }
    for warning in &recommendation.warnings {
        writeln!(out, "  ! {warning}").expect("write warning");
    }
    out
}

pub(crate) fn import_summary(import: &ComparableImport) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{} comparable(s) imported, {} row(s) rejected",
        import.comparables.len(),
        import.rejected_rows()
    )
    .expect("write import totals");
    for comparable in &import.comparables {
        writeln!(
            out,
            "  {} | {} | {} | {:.0} sqm",
            comparable.address,
            comparable.property_type.label(),
            format_currency(comparable.sale_price),
            comparable.built_area
        )
        .expect("write comparable");
    }
    for error in &import.errors {
        writeln!(out, "  row {}: {}", error.row, error.message).expect("write row error");
    }
    out
}
