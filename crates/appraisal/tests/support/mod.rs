#![allow(dead_code)]

use appraisal::valuation::{ComparableTransaction, PropertyType, SubjectProperty};
use chrono::NaiveDate;

pub const SUBJECT_JSON: &str = r#"{
    "id": "hrz-12-4",
    "address": {
        "street": "Herzl St 12, Apt 4",
        "city": "Haifa",
        "neighborhood": "Hadar"
    },
    "property_type": "apartment",
    "details": {
        "built_area": 95,
        "rooms": 3.5,
        "bathrooms": 1,
        "bedrooms": 2,
        "floor": 2,
        "total_floors": 4,
        "build_year": 1985,
        "condition": "fair",
        "parking_spaces": 0,
        "balcony": true
    },
    "features": ["sea view"]
}"#;

pub const COMPARABLES_CSV: &str = "address,type,salePrice,saleDate,builtArea,rooms,floor,distanceKm,similarityScore,condition,buildYear\n\
Herzl St 20,apartment,1650000,2026-02-10,92,3.5,1,0.2,80,fair,1982\n\
Balfour St 7,apartment,1720000,2025-12-01,98,3.5,3,0.6,75,good,1990\n\
Massada St 31,apartment,1580000,2026-01-15,90,3,2,0.4,70,fair,1978\n\
Hillel St 3,apartment,1690000,2025-11-20,97,4,2,0.8,65,,1988\n";

pub fn subject() -> SubjectProperty {
    serde_json::from_str(SUBJECT_JSON).expect("subject fixture parses")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn comparable(address: &str, sale_price: f64, built_area: f64) -> ComparableTransaction {
    let mut comparable =
        ComparableTransaction::new(address, PropertyType::Apartment, sale_price, built_area);
    comparable.rooms = 3.5;
    comparable.floor = 2;
    comparable.distance_km = Some(0.5);
    comparable.similarity_score = Some(75.0);
    comparable
}
