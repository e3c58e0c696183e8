//! Request orchestration: fetch everything a plan needs, absorb collaborator failures,
//! then hand already-resolved values to the pure planning core.

use crate::config::Settings;
use crate::domain::day::DayInput;
use crate::domain::route::{CommuteTimes, Coordinates};
use crate::domain::weather::{Forecast, WeatherSnapshot};
use crate::engine::{plan_days, plan_single, DayPlan};
use crate::ingest::geocoding::NominatimClient;
use crate::ingest::routing::OsrmClient;
use crate::ingest::sheet::HttpSheetSource;
use crate::ingest::weather::OpenMeteoClient;
use crate::ingest::{Geocoder, RouteProvider, SheetSource, WeatherProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub sheet_url: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl PlanRequest {
    fn coords(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub days: Vec<DayPlan>,
    pub routes: Option<CommuteTimes>,
    pub city_name: Option<String>,
    pub origin: Option<Coordinates>,
    pub destination: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// The sheet could not be fetched.
    SheetUnavailable,
    /// The sheet was fetched but has no data rows.
    SheetEmpty,
    /// No weather could be obtained for the commute location.
    WeatherUnavailable,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::SheetUnavailable | Self::SheetEmpty => "Failed to fetch user data from Sheet",
            Self::WeatherUnavailable => "Failed to fetch weather data",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PlanError {}

#[derive(Clone)]
pub struct CommuteService {
    sheets: Arc<dyn SheetSource>,
    weather: Arc<dyn WeatherProvider>,
    geocoder: Arc<dyn Geocoder>,
    router: Arc<dyn RouteProvider>,
}

/// Geocoded commute endpoints and the routes between them. Any part may be missing.
#[derive(Debug, Clone, Default)]
struct Commute {
    origin: Option<Coordinates>,
    destination: Option<Coordinates>,
    routes: Option<CommuteTimes>,
}

impl CommuteService {
    pub fn new(
        sheets: Arc<dyn SheetSource>,
        weather: Arc<dyn WeatherProvider>,
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn RouteProvider>,
    ) -> Self {
        Self {
            sheets,
            weather,
            geocoder,
            router,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(HttpSheetSource::from_settings(settings)?),
            Arc::new(OpenMeteoClient::from_settings(settings)?),
            Arc::new(NominatimClient::from_settings(settings)?),
            Arc::new(OsrmClient::from_settings(settings)?),
        ))
    }

    /// Same service with a different row source (e.g. a local CSV file).
    pub fn with_sheet_source(mut self, sheets: Arc<dyn SheetSource>) -> Self {
        self.sheets = sheets;
        self
    }

    /// Plan every row of the sheet against the daily forecast.
    pub async fn plan(&self, req: &PlanRequest) -> Result<PlanResponse, PlanError> {
        let explicit = req.coords();
        let (days, early) = tokio::join!(
            self.load_days(&req.sheet_url),
            self.forecast_at(explicit)
        );
        let days = days?;

        let (commute, late) = self
            .commute_with(&days, |origin| async move {
                match (explicit, origin) {
                    (None, Some(c)) => self.forecast_at(Some(c)).await,
                    _ => None,
                }
            })
            .await;

        let forecast = early
            .or(late)
            .filter(|f| !f.is_empty())
            .ok_or(PlanError::WeatherUnavailable)?;
        let city_name = forecast.values().next().map(|w| w.city_name.clone());

        let plans = plan_days(days, &forecast, commute.routes.as_ref());
        tracing::info!(
            days = plans.len(),
            routed = commute.routes.is_some(),
            "planned commute"
        );

        Ok(PlanResponse {
            days: plans,
            routes: commute.routes,
            city_name,
            origin: commute.origin,
            destination: commute.destination,
        })
    }

    /// Single-day mode: the first row against current conditions.
    pub async fn today(&self, req: &PlanRequest) -> Result<PlanResponse, PlanError> {
        let explicit = req.coords();
        let (days, early) = tokio::join!(
            self.load_days(&req.sheet_url),
            self.current_at(explicit)
        );
        let mut days = days?;
        days.truncate(1);

        let (commute, late) = self
            .commute_with(&days, |origin| async move {
                match (explicit, origin) {
                    (None, Some(c)) => self.current_at(Some(c)).await,
                    _ => None,
                }
            })
            .await;

        let weather = early.or(late).ok_or(PlanError::WeatherUnavailable)?;
        let city_name = Some(weather.city_name.clone());
        let plans: Vec<DayPlan> = days
            .into_iter()
            .map(|day| plan_single(day, weather.clone(), commute.routes.as_ref()))
            .collect();

        Ok(PlanResponse {
            days: plans,
            routes: commute.routes,
            city_name,
            origin: commute.origin,
            destination: commute.destination,
        })
    }

    async fn load_days(&self, location: &str) -> Result<Vec<DayInput>, PlanError> {
        let days = absorb("sheet", self.sheets.fetch_days(location).await)
            .ok_or(PlanError::SheetUnavailable)?;
        if days.is_empty() {
            return Err(PlanError::SheetEmpty);
        }
        Ok(days)
    }

    /// Geocode the commute, then fetch routes concurrently with `weather_fallback`, which
    /// receives the geocoded origin as a weather location of last resort.
    async fn commute_with<W, F, Fut>(
        &self,
        days: &[DayInput],
        weather_fallback: F,
    ) -> (Commute, Option<W>)
    where
        F: FnOnce(Option<(f64, f64)>) -> Fut,
        Fut: Future<Output = Option<W>>,
    {
        // Routes are assumed stable for the whole horizon; take the first row that has one.
        let Some(day) = days.iter().find(|d| d.has_route()) else {
            return (Commute::default(), weather_fallback(None).await);
        };

        let (origin, destination) = tokio::join!(
            self.geocode(&day.origin),
            self.geocode(&day.destination)
        );
        let origin_coords = origin.as_ref().map(|c| (c.lat, c.lon));

        let routes_fut = async {
            match (&origin, &destination) {
                (Some(o), Some(d)) => Some(self.router.commute_times(o, d).await),
                _ => None,
            }
        };
        let (routes, weather) = tokio::join!(routes_fut, weather_fallback(origin_coords));

        let routes = routes.filter(|r| !r.is_empty());
        (
            Commute {
                origin,
                destination,
                routes,
            },
            weather,
        )
    }

    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        let hit = absorb("geocoding", self.geocoder.geocode(address).await).flatten();
        if hit.is_none() {
            tracing::info!(address, "address not resolved; routes unavailable");
        }
        hit
    }

    async fn forecast_at(&self, coords: Option<(f64, f64)>) -> Option<Forecast> {
        let (lat, lon) = coords?;
        absorb(
            self.weather.provider_name(),
            self.weather.fetch_forecast(lat, lon).await,
        )
    }

    async fn current_at(&self, coords: Option<(f64, f64)>) -> Option<WeatherSnapshot> {
        let (lat, lon) = coords?;
        absorb(
            self.weather.provider_name(),
            self.weather.fetch_current(lat, lon).await,
        )
    }
}

/// Collaborator failures become "absent"; the plan degrades instead of failing.
fn absorb<T>(collaborator: &str, res: anyhow::Result<T>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(
                collaborator,
                error = %format!("{err:#}"),
                "collaborator failed; continuing without it"
            );
            None
        }
    }
}
