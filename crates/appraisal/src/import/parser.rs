use super::normalizer::{
    normalize_address, normalize_header, parse_condition, parse_date, parse_flag, parse_integer,
    parse_number, parse_property_type,
};
use crate::valuation::{ComparableTransaction, PropertyType};
use csv::StringRecord;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One data row, either converted or rejected with every problem found.
pub(crate) struct ParsedRow {
    /// 1-based line in the source file; the header is line 1.
    pub(crate) row: usize,
    pub(crate) outcome: Result<ComparableTransaction, Vec<String>>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParsedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: StringRecord = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let row = index + 2;
        let outcome = match record {
            Ok(record) => match record.deserialize::<ComparableRow>(Some(&headers)) {
                Ok(parsed) => parsed.into_comparable(),
                Err(err) => Err(vec![format!("unreadable row: {err}")]),
            },
            Err(err) => Err(vec![format!("malformed CSV record: {err}")]),
        };
        rows.push(ParsedRow { row, outcome });
    }

    Ok(rows)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComparableRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    property_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sale_price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sale_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    built_area: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rooms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    floor: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    distance_km: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    similarity_score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    condition: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    build_year: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    selected: Option<String>,
}

/// Collects every field problem on a row instead of stopping at the first.
#[derive(Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn required<T>(
        &mut self,
        column: &str,
        raw: Option<&str>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        match raw {
            None => {
                self.0.push(format!("{column} is required"));
                None
            }
            Some(value) => self.optional(column, Some(value), parse),
        }
    }

    fn optional<T>(
        &mut self,
        column: &str,
        raw: Option<&str>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let value = raw?;
        let parsed = parse(value);
        if parsed.is_none() {
            self.0.push(format!("{column} '{value}' could not be parsed"));
        }
        parsed
    }
}

impl ComparableRow {
    fn into_comparable(self) -> Result<ComparableTransaction, Vec<String>> {
        let mut errors = FieldErrors::default();

        let address = errors.required("address", self.address.as_deref(), |value| {
            Some(normalize_address(value))
                .filter(|address| !address.is_empty())
        });
        let property_type = errors
            .optional("type", self.property_type.as_deref(), parse_property_type)
            .unwrap_or(PropertyType::Apartment);
        let sale_price = errors.required("salePrice", self.sale_price.as_deref(), parse_number);
        let built_area = errors.required("builtArea", self.built_area.as_deref(), parse_number);
        let sale_date = errors.optional("saleDate", self.sale_date.as_deref(), parse_date);
        let rooms = errors.optional("rooms", self.rooms.as_deref(), parse_number);
        let floor = errors.optional("floor", self.floor.as_deref(), parse_integer);
        let distance_km = errors.optional("distanceKm", self.distance_km.as_deref(), parse_number);
        let similarity_score = errors.optional(
            "similarityScore",
            self.similarity_score.as_deref(),
            parse_number,
        );
        let condition = errors.optional("condition", self.condition.as_deref(), parse_condition);
        let build_year = errors.optional("buildYear", self.build_year.as_deref(), parse_integer);
        let selected = errors.optional("selected", self.selected.as_deref(), parse_flag);

        let (Some(address), Some(sale_price), Some(built_area)) = (address, sale_price, built_area)
        else {
            return Err(errors.0);
        };
        if !errors.0.is_empty() {
            return Err(errors.0);
        }

        let mut comparable =
            ComparableTransaction::new(address, property_type, sale_price, built_area);
        comparable.sale_date = sale_date;
        comparable.rooms = rooms.unwrap_or_default();
        comparable.floor = floor.unwrap_or_default();
        comparable.distance_km = distance_km;
        comparable.similarity_score = similarity_score;
        comparable.condition = condition;
        comparable.build_year = build_year;
        comparable.selected = selected.unwrap_or(true);
        Ok(comparable)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
