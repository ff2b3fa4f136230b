//! Calibration data for the adjustment and depreciation calculations.
//!
//! Tables are plain serde data so they can be recalibrated from a JSON file
//! without touching the calculators. A loaded table set is immutable and is
//! passed by reference into every calculation.

use super::domain::{Amenities, PropertyCondition};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CoefficientError {
    #[error("failed to read coefficient tables: {0}")]
    Io(#[from] std::io::Error),
    #[error("coefficient tables are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid coefficient tables: {0}")]
    Invalid(String),
}

/// Step function: the first band whose `max` is at or above the input wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub max: f64,
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<Band>,
    pub default_adjustment: f64,
}

impl BandTable {
    pub fn lookup(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| value <= band.max)
            .map(|band| band.adjustment)
            .unwrap_or(self.default_adjustment)
    }

    fn is_ascending(&self) -> bool {
        self.bands.windows(2).all(|pair| pair[0].max < pair[1].max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeCoefficients {
    /// Relative differences below this magnitude are ignored.
    pub no_op_threshold: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionTable {
    pub new: f64,
    pub renovated: f64,
    pub good: f64,
    pub fair: f64,
    pub needs_renovation: f64,
}

impl ConditionTable {
    pub fn get(&self, condition: PropertyCondition) -> f64 {
        match condition {
            PropertyCondition::New => self.new,
            PropertyCondition::Renovated => self.renovated,
            PropertyCondition::Good => self.good,
            PropertyCondition::Fair => self.fair,
            PropertyCondition::NeedsRenovation => self.needs_renovation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureValues {
    pub elevator: f64,
    pub parking_space: f64,
    pub storage: f64,
    pub balcony: f64,
    pub accessible: f64,
}

impl FeatureValues {
    pub fn credit(&self, amenities: &Amenities) -> f64 {
        let mut credit = amenities.parking_spaces as f64 * self.parking_space;
        if amenities.elevator {
            credit += self.elevator;
        }
        if amenities.storage {
            credit += self.storage;
        }
        if amenities.balcony {
            credit += self.balcony;
        }
        if amenities.accessible {
            credit += self.accessible;
        }
        credit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalCoefficients {
    /// Share of the market price-per-sqm applied to an area difference.
    pub area_factor: f64,
    pub floor_value_per_level: f64,
    /// Fraction of sale price per condition-score step.
    pub condition_coefficient: f64,
    pub max_area_deviation: f64,
    pub time_decay_months: f64,
    pub distance_decay_km: f64,
    pub decay_floor: f64,
    pub min_recorded_components: usize,
    pub sparse_data_quality: f64,
    pub dense_metro_radius_km: f64,
    pub standard_radius_km: f64,
    pub dense_metro_cities: Vec<String>,
}

impl ProfessionalCoefficients {
    pub fn is_dense_metro(&self, city: &str) -> bool {
        let city = city.trim();
        self.dense_metro_cities
            .iter()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(city))
    }

    pub fn search_radius_km(&self, city: &str) -> f64 {
        if self.is_dense_metro(city) {
            self.dense_metro_radius_km
        } else {
            self.standard_radius_km
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoefficientTables {
    pub location: BandTable,
    pub size: SizeCoefficients,
    pub condition_multipliers: ConditionTable,
    /// Premium per floor, indexed from the ground floor. Higher floors use
    /// the last entry.
    pub floor_premiums: Vec<f64>,
    pub features: FeatureValues,
    /// Premium by building age, newest band first.
    pub age: BandTable,
    /// Year the age bands are measured from.
    pub age_reference_year: i32,
    pub effective_age_factors: ConditionTable,
    pub economic_life_years: f64,
    pub professional: ProfessionalCoefficients,
}

impl Default for CoefficientTables {
    fn default() -> Self {
        Self {
            location: BandTable {
                bands: vec![
                    Band {
                        max: 0.5,
                        adjustment: 0.03,
                    },
                    Band {
                        max: 1.0,
                        adjustment: 0.01,
                    },
                    Band {
                        max: 2.0,
                        adjustment: 0.0,
                    },
                    Band {
                        max: 3.0,
                        adjustment: -0.02,
                    },
                ],
                default_adjustment: -0.05,
            },
            size: SizeCoefficients {
                no_op_threshold: 0.05,
                scale: 0.5,
            },
            condition_multipliers: ConditionTable {
                new: 1.10,
                renovated: 1.05,
                good: 1.00,
                fair: 0.93,
                needs_renovation: 0.85,
            },
            floor_premiums: vec![
                -0.03, 0.0, 0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.10,
            ],
            features: FeatureValues {
                elevator: 0.02,
                parking_space: 0.03,
                storage: 0.015,
                balcony: 0.02,
                accessible: 0.01,
            },
            age: BandTable {
                bands: vec![
                    Band {
                        max: 5.0,
                        adjustment: 0.05,
                    },
                    Band {
                        max: 10.0,
                        adjustment: 0.03,
                    },
                    Band {
                        max: 15.0,
                        adjustment: 0.01,
                    },
                ],
                default_adjustment: 0.0,
            },
            age_reference_year: 2026,
            effective_age_factors: ConditionTable {
                new: 0.3,
                renovated: 0.6,
                good: 1.0,
                fair: 1.2,
                needs_renovation: 1.5,
            },
            economic_life_years: 60.0,
            professional: ProfessionalCoefficients {
                area_factor: 0.6,
                floor_value_per_level: 15_000.0,
                condition_coefficient: 0.03,
                max_area_deviation: 0.25,
                time_decay_months: 24.0,
                distance_decay_km: 2.0,
                decay_floor: 0.5,
                min_recorded_components: 3,
                sparse_data_quality: 0.8,
                dense_metro_radius_km: 1.0,
                standard_radius_km: 3.0,
                dense_metro_cities: [
                    "Tel Aviv",
                    "Tel Aviv-Yafo",
                    "Jerusalem",
                    "Haifa",
                    "Ramat Gan",
                    "Givatayim",
                    "Bnei Brak",
                    "Herzliya",
                ]
                .iter()
                .map(|city| city.to_string())
                .collect(),
            },
        }
    }
}

impl CoefficientTables {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CoefficientError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoefficientError> {
        let tables: Self = serde_json::from_reader(reader)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<(), CoefficientError> {
        if !self.location.is_ascending() {
            return Err(CoefficientError::Invalid(
                "location bands must be in ascending distance order".to_string(),
            ));
        }
        if !self.age.is_ascending() {
            return Err(CoefficientError::Invalid(
                "age bands must be in ascending year order".to_string(),
            ));
        }
        if self.floor_premiums.is_empty() {
            return Err(CoefficientError::Invalid(
                "floor premium curve needs at least one entry".to_string(),
            ));
        }
        if self.economic_life_years <= 0.0 {
            return Err(CoefficientError::Invalid(
                "economic life must be positive".to_string(),
            ));
        }
        let professional = &self.professional;
        if professional.time_decay_months <= 0.0 || professional.distance_decay_km <= 0.0 {
            return Err(CoefficientError::Invalid(
                "decay scales must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Age premium for a building; newer buildings sit in the earlier bands.
    pub fn age_premium(&self, build_year: i32) -> f64 {
        let age = (self.age_reference_year - build_year).abs();
        self.age.lookup(f64::from(age))
    }

    pub fn floor_premium(&self, floor: i32) -> f64 {
        let Some(last) = self.floor_premiums.len().checked_sub(1) else {
            return 0.0;
        };
        let index = (floor.max(0) as usize).min(last);
        self.floor_premiums[index]
    }
}
