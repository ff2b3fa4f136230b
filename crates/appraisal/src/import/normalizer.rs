use crate::valuation::{PropertyCondition, PropertyType};
use chrono::{DateTime, NaiveDate};

/// Canonical camelCase column names the parser deserializes by.
const CANONICAL_HEADERS: [&str; 12] = [
    "address",
    "type",
    "salePrice",
    "saleDate",
    "builtArea",
    "rooms",
    "floor",
    "distanceKm",
    "similarityScore",
    "condition",
    "buildYear",
    "selected",
];

fn strip_invisible(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "")
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Maps `Sale Price`, `sale_price` and `salePrice` to the same column.
/// Unknown headers pass through cleaned but otherwise untouched.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = strip_invisible(value).trim().to_string();
    let key = squash(&cleaned);
    let key = match key.as_str() {
        "propertytype" => "type".to_string(),
        "price" => "saleprice".to_string(),
        "area" | "sqm" => "builtarea".to_string(),
        "distance" => "distancekm".to_string(),
        "similarity" => "similarityscore".to_string(),
        _ => key,
    };
    CANONICAL_HEADERS
        .iter()
        .find(|canonical| canonical.to_ascii_lowercase() == key)
        .map(|canonical| canonical.to_string())
        .unwrap_or(cleaned)
}

pub(crate) fn parse_property_type(value: &str) -> Option<PropertyType> {
    let kind = match squash(value).as_str() {
        "apartment" | "flat" => PropertyType::Apartment,
        "house" | "cottage" => PropertyType::House,
        "penthouse" => PropertyType::Penthouse,
        "gardenapartment" => PropertyType::GardenApartment,
        "duplex" => PropertyType::Duplex,
        "studio" => PropertyType::Studio,
        "commercial" | "office" | "retail" => PropertyType::Commercial,
        "land" | "plot" => PropertyType::Land,
        _ => return None,
    };
    Some(kind)
}

pub(crate) fn parse_condition(value: &str) -> Option<PropertyCondition> {
    let condition = match squash(value).as_str() {
        "new" => PropertyCondition::New,
        "renovated" => PropertyCondition::Renovated,
        "good" => PropertyCondition::Good,
        "fair" => PropertyCondition::Fair,
        "needsrenovation" | "poor" => PropertyCondition::NeedsRenovation,
        _ => return None,
    };
    Some(condition)
}

/// Accepts grouped thousands and a leading currency sign, e.g. `₪2,450,000`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .trim_start_matches(['₪', '$', '€'])
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

pub(crate) fn parse_integer(value: &str) -> Option<i32> {
    let number = parse_number(value)?;
    (number.fract() == 0.0 && number.abs() <= f64::from(i32::MAX))
        .then_some(number as i32)
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn normalize_address(value: &str) -> String {
    strip_invisible(value).trim().to_string()
}
