use chrono::NaiveDate;

use crate::valuation::domain::{
    Address, Amenities, ComparableTransaction, PropertyCondition, PropertyDetails, PropertyType,
    SubjectProperty,
};
use crate::valuation::result::{MethodDetails, ValuationMethod, ValuationResult, ValueRange};

pub(crate) fn subject() -> SubjectProperty {
    SubjectProperty {
        id: "subject-001".to_string(),
        address: Address {
            street: "Rothschild Blvd 45".to_string(),
            city: "Tel Aviv".to_string(),
            neighborhood: Some("Lev HaIr".to_string()),
            block: Some("6942".to_string()),
            parcel: Some("17".to_string()),
        },
        property_type: PropertyType::Apartment,
        details: PropertyDetails {
            built_area: 100.0,
            rooms: 4.0,
            bathrooms: 2,
            bedrooms: 3,
            floor: 3,
            total_floors: Some(8),
            build_year: 2010,
            condition: PropertyCondition::Good,
            amenities: Amenities {
                parking_spaces: 1,
                storage: false,
                balcony: true,
                elevator: true,
                accessible: false,
            },
        },
        features: vec!["sun balcony".to_string()],
    }
}

pub(crate) fn comparable(address: &str, sale_price: f64, built_area: f64) -> ComparableTransaction {
    let mut comparable =
        ComparableTransaction::new(address, PropertyType::Apartment, sale_price, built_area);
    comparable.rooms = 4.0;
    comparable.floor = 3;
    comparable
}

/// Three to five close, well-scored comparables around 3.0M.
pub(crate) fn tight_comparables(count: usize) -> Vec<ComparableTransaction> {
    let prices = [3_000_000.0, 3_050_000.0, 2_980_000.0, 3_020_000.0, 2_990_000.0];
    prices
        .iter()
        .take(count)
        .enumerate()
        .map(|(index, price)| {
            let mut comp = comparable(&format!("Allenby {}", 10 + index), *price, 100.0);
            comp.distance_km = Some(0.4);
            comp.similarity_score = Some(85.0);
            comp.sale_date = Some(date(2026, 3, 1));
            comp
        })
        .collect()
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A minimal result with a ±5% range, for reconciliation tests.
pub(crate) fn fixed_result(method: ValuationMethod, value: f64, confidence: u8) -> ValuationResult {
    ValuationResult {
        method,
        estimated_value: value,
        value_range: ValueRange {
            min: value * 0.95,
            max: value * 1.05,
        },
        confidence,
        calculation_steps: Vec::new(),
        methodology: format!("{} fixture", method.label()),
        reconciliation: None,
        assumptions: vec![format!("{} assumption", method.label())],
        limitations: Vec::new(),
        quality_checks: Vec::new(),
        details: MethodDetails::Hybrid {
            contributions: Vec::new(),
        },
    }
}
