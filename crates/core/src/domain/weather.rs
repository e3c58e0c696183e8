use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Celsius.
    pub temperature: f64,
    pub is_raining: bool,
    pub is_snowing: bool,
    /// km/h.
    pub wind_speed: f64,
    /// mm.
    pub precipitation: f64,
    pub city_name: String,
    /// ISO date (YYYY-MM-DD) the snapshot describes.
    pub date: String,
}

/// Per-day weather keyed by ISO date. Ordered, so keys iterate ascending.
pub type Forecast = BTreeMap<String, WeatherSnapshot>;

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}
