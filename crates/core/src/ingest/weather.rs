use crate::config::Settings;
use crate::domain::weather::{Forecast, WeatherSnapshot};
use crate::ingest::error::{Provider, ProviderError};
use crate::ingest::http::{join_url, HttpFetcher};
use crate::ingest::WeatherProvider;
use anyhow::{Context, Result};
use serde::Deserialize;

const FORECAST_PATH: &str = "/v1/forecast";
const REVERSE_GEOCODE_PATH: &str = "/data/reverse-geocode-client";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,rain_sum,showers_sum,snowfall_sum,wind_speed_10m_max";
const CURRENT_FIELDS: &str = "temperature_2m,precipitation,rain,showers,snowfall,wind_speed_10m";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Open-Meteo forecasts, labelled with a BigDataCloud reverse-geocoded city name.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    weather: HttpFetcher,
    places: HttpFetcher,
    base_url: String,
    reverse_geocode_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    daily: DailySeries,
}

/// Column-oriented daily data; entry `i` of every series describes `time[i]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DailySeries {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    rain_sum: Vec<Option<f64>>,
    showers_sum: Vec<Option<f64>>,
    snowfall_sum: Vec<Option<f64>>,
    wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CurrentResponse {
    current: CurrentConditions,
}

#[derive(Debug, Clone, Deserialize)]
struct CurrentConditions {
    time: String,
    temperature_2m: Option<f64>,
    precipitation: Option<f64>,
    rain: Option<f64>,
    showers: Option<f64>,
    snowfall: Option<f64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocode {
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
}

impl OpenMeteoClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            weather: HttpFetcher::from_settings(settings, Provider::OpenMeteo, None)?,
            places: HttpFetcher::from_settings(settings, Provider::BigDataCloud, None)?,
            base_url: settings.open_meteo_base_url().to_string(),
            reverse_geocode_base_url: settings.reverse_geocode_base_url().to_string(),
        })
    }

    fn coords_query(lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("timezone", "auto".to_string()),
        ]
    }

    /// City name for the coordinates; lookup failures degrade to a placeholder.
    async fn city_name(&self, lat: f64, lon: f64) -> String {
        let url = join_url(&self.reverse_geocode_base_url, REVERSE_GEOCODE_PATH);
        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("localityLanguage", "en".to_string()),
        ];
        match self.places.get_json::<ReverseGeocode>(&url, &query).await {
            Ok(place) => place.best_name(),
            Err(err) => {
                tracing::warn!(error = %err, "reverse geocode failed; using placeholder city");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenMeteoClient {
    fn provider_name(&self) -> &'static str {
        "open-meteo"
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Forecast> {
        let url = join_url(&self.base_url, FORECAST_PATH);
        let mut query = Self::coords_query(lat, lon);
        query.push(("daily", DAILY_FIELDS.to_string()));

        let (res, city) = tokio::join!(
            self.weather.get_json::<ForecastResponse>(&url, &query),
            self.city_name(lat, lon)
        );
        let res = res.context("weather forecast fetch failed")?;

        let forecast = res.daily.into_forecast(&city);
        anyhow::ensure!(
            !forecast.is_empty(),
            ProviderError::new(Provider::OpenMeteo, "validate", "forecast has no days")
        );
        tracing::info!(days = forecast.len(), city = %city, "fetched weather forecast");
        Ok(forecast)
    }

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        let url = join_url(&self.base_url, FORECAST_PATH);
        let mut query = Self::coords_query(lat, lon);
        query.push(("current", CURRENT_FIELDS.to_string()));

        let (res, city) = tokio::join!(
            self.weather.get_json::<CurrentResponse>(&url, &query),
            self.city_name(lat, lon)
        );
        let res = res.context("current weather fetch failed")?;
        Ok(res.current.into_snapshot(&city))
    }
}

impl DailySeries {
    fn into_forecast(self, city: &str) -> Forecast {
        let mut out = Forecast::new();
        for (i, date) in self.time.iter().enumerate() {
            let max = at(&self.temperature_2m_max, i);
            let min = at(&self.temperature_2m_min, i);
            out.insert(
                date.clone(),
                WeatherSnapshot {
                    temperature: (max + min) / 2.0,
                    is_raining: at(&self.rain_sum, i) > 0.0 || at(&self.showers_sum, i) > 0.0,
                    is_snowing: at(&self.snowfall_sum, i) > 0.0,
                    wind_speed: at(&self.wind_speed_10m_max, i),
                    precipitation: at(&self.precipitation_sum, i),
                    city_name: city.to_string(),
                    date: date.clone(),
                },
            );
        }
        out
    }
}

/// Value `i` of a daily series; nulls and missing entries read as zero.
fn at(series: &[Option<f64>], i: usize) -> f64 {
    series.get(i).copied().flatten().unwrap_or(0.0)
}

impl CurrentConditions {
    fn into_snapshot(self, city: &str) -> WeatherSnapshot {
        // "2024-01-01T08:15" -> "2024-01-01"
        let date = self.time.split('T').next().unwrap_or_default().to_string();
        WeatherSnapshot {
            temperature: self.temperature_2m.unwrap_or(0.0),
            is_raining: self.rain.unwrap_or(0.0) > 0.0 || self.showers.unwrap_or(0.0) > 0.0,
            is_snowing: self.snowfall.unwrap_or(0.0) > 0.0,
            wind_speed: self.wind_speed_10m.unwrap_or(0.0),
            precipitation: self.precipitation.unwrap_or(0.0),
            city_name: city.to_string(),
            date,
        }
    }
}

impl ReverseGeocode {
    fn best_name(self) -> String {
        [self.city, self.locality, self.principal_subdivision]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }
}
