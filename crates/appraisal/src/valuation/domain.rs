use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Penthouse,
    #[serde(alias = "garden-apartment")]
    GardenApartment,
    Duplex,
    Studio,
    Commercial,
    Land,
    /// Catch-all for unrecognised inbound values. Rejected by the schema
    /// validator; the method selector falls back defensively when it sees one.
    #[serde(other)]
    Other,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::House => "House",
            Self::Penthouse => "Penthouse",
            Self::GardenApartment => "Garden Apartment",
            Self::Duplex => "Duplex",
            Self::Studio => "Studio",
            Self::Commercial => "Commercial",
            Self::Land => "Land",
            Self::Other => "Other",
        }
    }

    pub const fn is_residential(self) -> bool {
        matches!(
            self,
            Self::Apartment
                | Self::House
                | Self::Penthouse
                | Self::GardenApartment
                | Self::Duplex
                | Self::Studio
        )
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        Self::Apartment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCondition {
    New,
    Renovated,
    Good,
    Fair,
    #[serde(alias = "needs-renovation")]
    NeedsRenovation,
}

impl PropertyCondition {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::New,
            Self::Renovated,
            Self::Good,
            Self::Fair,
            Self::NeedsRenovation,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Renovated => "Renovated",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsRenovation => "Needs Renovation",
        }
    }

    /// Ordinal quality score, 5 for new down to 1 for needs-renovation.
    pub const fn score(self) -> i32 {
        match self {
            Self::New => 5,
            Self::Renovated => 4,
            Self::Good => 3,
            Self::Fair => 2,
            Self::NeedsRenovation => 1,
        }
    }
}

impl Default for PropertyCondition {
    fn default() -> Self {
        Self::Good
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel: Option<String>,
}

impl Address {
    pub fn new(street: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            ..Self::default()
        }
    }

    pub fn display_line(&self) -> String {
        match &self.neighborhood {
            Some(neighborhood) => format!("{}, {}, {}", self.street, neighborhood, self.city),
            None => format!("{}, {}", self.street, self.city),
        }
    }
}

/// Amenities that carry a feature credit in the coefficient tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    #[serde(default)]
    pub parking_spaces: u32,
    #[serde(default)]
    pub storage: bool,
    #[serde(default)]
    pub balcony: bool,
    #[serde(default)]
    pub elevator: bool,
    #[serde(default)]
    pub accessible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub built_area: f64,
    pub rooms: f64,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub bedrooms: u32,
    pub floor: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_floors: Option<i32>,
    pub build_year: i32,
    #[serde(default)]
    pub condition: PropertyCondition,
    #[serde(flatten)]
    pub amenities: Amenities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProperty {
    pub id: String,
    pub address: Address,
    pub property_type: PropertyType,
    pub details: PropertyDetails,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Per-comparable adjustment fractions. The total is derived from the six
/// components and cannot be set on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AdjustmentVectorRecord")]
pub struct AdjustmentVector {
    location: f64,
    size: f64,
    condition: f64,
    floor: f64,
    age: f64,
    features: f64,
    total: f64,
}

impl AdjustmentVector {
    pub fn new(
        location: f64,
        size: f64,
        condition: f64,
        floor: f64,
        age: f64,
        features: f64,
    ) -> Self {
        Self {
            location,
            size,
            condition,
            floor,
            age,
            features,
            total: location + size + condition + floor + age + features,
        }
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn condition(&self) -> f64 {
        self.condition
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn features(&self) -> f64 {
        self.features
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn components(&self) -> [(&'static str, f64); 6] {
        [
            ("location", self.location),
            ("size", self.size),
            ("condition", self.condition),
            ("floor", self.floor),
            ("age", self.age),
            ("features", self.features),
        ]
    }

    /// Number of components carrying a non-zero correction.
    pub fn recorded_components(&self) -> usize {
        self.components()
            .iter()
            .filter(|(_, value)| value.abs() > f64::EPSILON)
            .count()
    }
}

#[derive(Deserialize)]
struct AdjustmentVectorRecord {
    #[serde(default)]
    location: f64,
    #[serde(default)]
    size: f64,
    #[serde(default)]
    condition: f64,
    #[serde(default)]
    floor: f64,
    #[serde(default)]
    age: f64,
    #[serde(default)]
    features: f64,
}

impl From<AdjustmentVectorRecord> for AdjustmentVector {
    fn from(record: AdjustmentVectorRecord) -> Self {
        Self::new(
            record.location,
            record.size,
            record.condition,
            record.floor,
            record.age,
            record.features,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableTransaction {
    pub address: String,
    pub property_type: PropertyType,
    pub sale_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<NaiveDate>,
    pub built_area: f64,
    pub rooms: f64,
    pub floor: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub adjustments: AdjustmentVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_sqm: Option<f64>,
    #[serde(default = "default_selected")]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PropertyCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Amenities>,
}

fn default_selected() -> bool {
    true
}

impl ComparableTransaction {
    /// A selected comparable with no optional evidence attached.
    pub fn new(
        address: impl Into<String>,
        property_type: PropertyType,
        sale_price: f64,
        built_area: f64,
    ) -> Self {
        let price_per_sqm = (built_area > 0.0).then(|| sale_price / built_area);
        Self {
            address: address.into(),
            property_type,
            sale_price,
            sale_date: None,
            built_area,
            rooms: 0.0,
            floor: 0,
            distance_km: None,
            adjustments: AdjustmentVector::default(),
            adjusted_price: None,
            price_per_sqm,
            selected: true,
            similarity_score: None,
            condition: None,
            build_year: None,
            amenities: None,
        }
    }
}

/// Hard failures that abort a calculation without producing a result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("no comparable transactions are selected")]
    NoSelectedComparables,
    #[error("no selected comparable passed the eligibility filter ({excluded} excluded)")]
    NoEligibleComparables { excluded: usize },
    #[error("reconciliation requires at least one valuation result")]
    EmptyReconciliation,
    #[error("every supplied valuation method carries a zero reconciliation weight")]
    NoWeightedMethods,
    #[error("no valuation method has the inputs it requires")]
    NoApplicableMethod,
}
