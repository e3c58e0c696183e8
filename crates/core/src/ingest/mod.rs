pub mod error;
pub mod geocoding;
pub mod http;
pub mod routing;
pub mod sheet;
pub mod weather;

use crate::domain::day::DayInput;
use crate::domain::route::{CommuteTimes, Coordinates};
use crate::domain::weather::{Forecast, WeatherSnapshot};
use anyhow::Result;

/// Where planning rows come from (published sheet URL, local file).
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_days(&self, location: &str) -> Result<Vec<DayInput>>;
}

#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Daily forecast keyed by ISO date.
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Forecast>;

    /// Current conditions, for single-day planning.
    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot>;
}

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address is blank or nothing matched.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}

#[async_trait::async_trait]
pub trait RouteProvider: Send + Sync {
    /// Per-profile estimates; profiles that could not be routed are `None`.
    async fn commute_times(&self, start: &Coordinates, end: &Coordinates) -> CommuteTimes;
}
