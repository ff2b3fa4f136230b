//! Boundary checks applied to inbound property and comparable records before
//! they reach a calculator.

use super::domain::{ComparableTransaction, PropertyType, SubjectProperty};
use serde::Serialize;

const MAX_BUILT_AREA: f64 = 100_000.0;
const MAX_ROOMS: f64 = 50.0;
const MIN_FLOOR: i32 = -5;
const MAX_FLOOR: i32 = 200;
const MIN_BUILD_YEAR: i32 = 1800;
const MAX_BUILD_YEAR: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Position of the record within its batch; 0 for a subject property.
    pub index: usize,
    pub field: &'static str,
    pub message: String,
}

struct IssueSink<'a> {
    index: usize,
    issues: &'a mut Vec<ValidationIssue>,
}

impl IssueSink<'_> {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            index: self.index,
            field,
            message: message.into(),
        });
    }

    fn property_type(&mut self, property_type: PropertyType) {
        if property_type == PropertyType::Other {
            self.push("type", "property type is not one of the supported values");
        }
    }

    fn built_area(&mut self, area: f64) {
        if !area.is_finite() || area <= 0.0 || area > MAX_BUILT_AREA {
            self.push(
                "builtArea",
                format!("built area {area} must be within (0, {MAX_BUILT_AREA}]"),
            );
        }
    }

    fn rooms(&mut self, rooms: f64) {
        if !rooms.is_finite() || !(0.0..=MAX_ROOMS).contains(&rooms) {
            self.push("rooms", format!("room count {rooms} must be within 0-{MAX_ROOMS}"));
        }
    }

    fn floor(&mut self, floor: i32) {
        if !(MIN_FLOOR..=MAX_FLOOR).contains(&floor) {
            self.push(
                "floor",
                format!("floor {floor} must be within {MIN_FLOOR}-{MAX_FLOOR}"),
            );
        }
    }

    fn build_year(&mut self, year: i32) {
        if !(MIN_BUILD_YEAR..=MAX_BUILD_YEAR).contains(&year) {
            self.push(
                "buildYear",
                format!("build year {year} must be within {MIN_BUILD_YEAR}-{MAX_BUILD_YEAR}"),
            );
        }
    }
}

pub fn validate_subject(subject: &SubjectProperty) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut sink = IssueSink {
        index: 0,
        issues: &mut issues,
    };
    let details = &subject.details;

    if subject.address.street.trim().is_empty() {
        sink.push("street", "street address is required");
    }
    sink.property_type(subject.property_type);
    sink.built_area(details.built_area);
    sink.rooms(details.rooms);
    sink.floor(details.floor);
    sink.build_year(details.build_year);
    if let Some(total_floors) = details.total_floors {
        if total_floors < 0 {
            sink.push("totalFloors", "total floors cannot be negative");
        } else if details.floor > total_floors {
            sink.push(
                "floor",
                format!(
                    "floor {} is above the building's {} floors",
                    details.floor, total_floors
                ),
            );
        }
    }

    issues
}

pub fn validate_comparable(
    index: usize,
    comparable: &ComparableTransaction,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut sink = IssueSink {
        index,
        issues: &mut issues,
    };

    if comparable.address.trim().is_empty() {
        sink.push("address", "address is required");
    }
    sink.property_type(comparable.property_type);
    if !comparable.sale_price.is_finite() || comparable.sale_price <= 0.0 {
        sink.push("salePrice", "sale price must be a positive amount");
    }
    sink.built_area(comparable.built_area);
    sink.rooms(comparable.rooms);
    sink.floor(comparable.floor);
    if let Some(year) = comparable.build_year {
        sink.build_year(year);
    }
    if let Some(distance) = comparable.distance_km {
        if !distance.is_finite() || distance < 0.0 {
            sink.push("distanceKm", "distance must be a non-negative number");
        }
    }
    if let Some(score) = comparable.similarity_score {
        if !(0.0..=100.0).contains(&score) {
            sink.push(
                "similarityScore",
                format!("similarity score {score} must be within 0-100"),
            );
        }
    }
    if let Some(amenities) = &comparable.amenities {
        if amenities.parking_spaces > 50 {
            sink.push("parkingSpaces", "parking count is implausibly high");
        }
    }

    issues
}

pub fn validate_comparables(comparables: &[ComparableTransaction]) -> Vec<ValidationIssue> {
    comparables
        .iter()
        .enumerate()
        .flat_map(|(index, comparable)| validate_comparable(index, comparable))
        .collect()
}

/// Splits a batch into records that passed validation and the issues found
/// on the rest.
pub fn partition_valid(
    comparables: Vec<ComparableTransaction>,
) -> (Vec<ComparableTransaction>, Vec<ValidationIssue>) {
    let mut accepted = Vec::with_capacity(comparables.len());
    let mut issues = Vec::new();
    for (index, comparable) in comparables.into_iter().enumerate() {
        let found = validate_comparable(index, &comparable);
        if found.is_empty() {
            accepted.push(comparable);
        } else {
            issues.extend(found);
        }
    }
    (accepted, issues)
}
