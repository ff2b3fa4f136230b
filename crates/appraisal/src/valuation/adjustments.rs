use super::coefficients::CoefficientTables;
use super::domain::{AdjustmentVector, ComparableTransaction, SubjectProperty};

/// Computes the percentage adjustment vector that moves a comparable's sale
/// price toward the subject property.
pub fn adjust(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
) -> AdjustmentVector {
    AdjustmentVector::new(
        location_adjustment(tables, comparable),
        size_adjustment(tables, subject, comparable),
        condition_adjustment(tables, subject, comparable),
        floor_adjustment(tables, subject, comparable),
        age_adjustment(tables, subject, comparable),
        feature_adjustment(tables, subject, comparable),
    )
}

/// Applies an adjustment vector to a sale price.
pub fn adjusted_price(sale_price: f64, adjustments: &AdjustmentVector) -> f64 {
    sale_price * (1.0 + adjustments.total())
}

fn location_adjustment(tables: &CoefficientTables, comparable: &ComparableTransaction) -> f64 {
    let distance = comparable.distance_km.unwrap_or(0.0).max(0.0);
    tables.location.lookup(distance)
}

fn size_adjustment(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
) -> f64 {
    if comparable.built_area <= 0.0 {
        return 0.0;
    }
    let relative = (subject.details.built_area - comparable.built_area) / comparable.built_area;
    if relative.abs() < tables.size.no_op_threshold {
        0.0
    } else {
        relative * tables.size.scale
    }
}

fn condition_adjustment(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
) -> f64 {
    let subject_multiplier = tables.condition_multipliers.get(subject.details.condition);
    let baseline = comparable
        .condition
        .map(|condition| tables.condition_multipliers.get(condition))
        .unwrap_or(1.0);
    subject_multiplier - baseline
}

fn floor_adjustment(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
) -> f64 {
    tables.floor_premium(subject.details.floor) - tables.floor_premium(comparable.floor)
}

fn age_adjustment(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
) -> f64 {
    // A comparable of unknown age is treated as typical stock.
    let comparable_premium = comparable
        .build_year
        .map(|year| tables.age_premium(year))
        .unwrap_or(tables.age.default_adjustment);
    tables.age_premium(subject.details.build_year) - comparable_premium
}

fn feature_adjustment(
    tables: &CoefficientTables,
    subject: &SubjectProperty,
    comparable: &ComparableTransaction,
) -> f64 {
    let subject_credit = tables.features.credit(&subject.details.amenities);
    let comparable_credit = comparable
        .amenities
        .as_ref()
        .map(|amenities| tables.features.credit(amenities))
        .unwrap_or(0.0);
    subject_credit - comparable_credit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::{Amenities, PropertyCondition};
    use crate::valuation::tests::common::{comparable, subject};

    #[test]
    fn identical_comparable_only_carries_location_and_subject_condition() {
        let tables = CoefficientTables::default();
        let subject = subject();
        let mut comp = comparable("Herzl 12", 2_000_000.0, 100.0);
        comp.floor = subject.details.floor;
        comp.distance_km = Some(0.3);

        let vector = adjust(&tables, &subject, &comp);

        assert_eq!(vector.size(), 0.0);
        assert_eq!(vector.floor(), 0.0);
        assert_eq!(vector.age(), 0.0);
        assert_eq!(vector.location(), 0.03);
        let expected_total = vector
            .components()
            .iter()
            .map(|(_, value)| value)
            .sum::<f64>();
        assert!((vector.total() - expected_total).abs() < 1e-12);
    }

    #[test]
    fn small_area_differences_are_ignored() {
        let tables = CoefficientTables::default();
        let subject = subject();
        let comp = comparable("Herzl 14", 2_000_000.0, 97.0);
        assert_eq!(adjust(&tables, &subject, &comp).size(), 0.0);

        let comp = comparable("Herzl 16", 2_000_000.0, 80.0);
        let expected = (100.0 - 80.0) / 80.0 * tables.size.scale;
        assert!(
            (adjust(&tables, &subject, &comp).size() - expected).abs() < 1e-12
        );
    }

    #[test]
    fn known_comparable_condition_becomes_a_difference() {
        let tables = CoefficientTables::default();
        let mut subject = subject();
        subject.details.condition = PropertyCondition::Renovated;
        let mut comp = comparable("Herzl 18", 2_000_000.0, 100.0);

        let one_sided = adjust(&tables, &subject, &comp).condition();
        assert!((one_sided - 0.05).abs() < 1e-12);

        comp.condition = Some(PropertyCondition::Renovated);
        assert_eq!(adjust(&tables, &subject, &comp).condition(), 0.0);
    }

    #[test]
    fn newer_comparable_lowers_the_age_term() {
        let tables = CoefficientTables::default();
        let subject = subject();
        let mut comp = comparable("Herzl 20", 2_000_000.0, 100.0);

        comp.build_year = Some(2023);
        assert_eq!(adjust(&tables, &subject, &comp).age(), -0.05);

        comp.build_year = Some(1995);
        assert_eq!(adjust(&tables, &subject, &comp).age(), 0.0);
    }

    #[test]
    fn subject_age_counts_when_comparable_year_is_unknown() {
        let tables = CoefficientTables::default();
        let comp = comparable("Herzl 24", 2_000_000.0, 100.0);
        assert!(comp.build_year.is_none());

        let mut newer = subject();
        newer.details.build_year = 2024;
        let mut older = subject();
        older.details.build_year = 1950;

        let newer_age = adjust(&tables, &newer, &comp).age();
        let older_age = adjust(&tables, &older, &comp).age();
        assert_ne!(newer_age, older_age);
        assert_eq!(newer_age, 0.05);
        assert_eq!(older_age, 0.0);
    }

    #[test]
    fn shared_amenities_cancel_out() {
        let tables = CoefficientTables::default();
        let subject = subject();
        let mut comp = comparable("Herzl 22", 2_000_000.0, 100.0);

        let one_sided = adjust(&tables, &subject, &comp).features();
        assert!(one_sided > 0.0);

        comp.amenities = Some(subject.details.amenities);
        assert_eq!(adjust(&tables, &subject, &comp).features(), 0.0);

        comp.amenities = Some(Amenities {
            parking_spaces: 3,
            ..Amenities::default()
        });
        assert!(adjust(&tables, &subject, &comp).features() < one_sided);
    }

    #[test]
    fn adjusted_price_scales_by_total() {
        let vector = AdjustmentVector::new(0.1, 0.0, 0.0, 0.0, 0.0, -0.05);
        assert!(
            (adjusted_price(1_000_000.0, &vector) - 1_050_000.0).abs() < 1e-6
        );
    }
}
