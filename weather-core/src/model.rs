use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::TemperatureUnit;

/// A decoded (and, once [`Conditions::convert`] ran, unit-converted) weather snapshot.
///
/// This is also the on-disk cache record: `cache_time` is stamped right before
/// the record is written and drives the staleness check on the next read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Conditions {
    pub name: String,
    pub summary: String,
    pub temperature: f64,
    #[serde(default)]
    pub unit: TemperatureUnit,
    #[serde(default)]
    pub long_format: bool,
    pub longitude: f64,
    pub latitude: f64,
    pub description: String,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default)]
    pub cache_time: DateTime<Utc>,
}

impl Conditions {
    /// Convert the Kelvin readings into `self.unit`. Call exactly once per decoded record.
    pub fn convert(&mut self) {
        self.temperature = self.unit.from_kelvin(self.temperature);
        self.temp_min = self.unit.from_kelvin(self.temp_min);
        self.temp_max = self.unit.from_kelvin(self.temp_max);
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.symbol();
        if self.long_format {
            write!(
                f,
                "{} {:.1}º{unit}\n{} min {:.1}º{unit}, max {:.1}º{unit}",
                self.name, self.temperature, self.description, self.temp_min, self.temp_max,
            )
        } else {
            write!(f, "{} {:.1}º{unit}", self.summary, self.temperature)
        }
    }
}
