use crate::config::Settings;
use crate::domain::route::{CommuteTimes, Coordinates, RouteEstimate, TransportProfile};
use crate::ingest::error::Provider;
use crate::ingest::http::{join_url, HttpFetcher};
use crate::ingest::RouteProvider;
use anyhow::Result;
use serde::Deserialize;

/// ~12 mph.
const BIKE_SPEED_MPS: f64 = 5.3;
/// ~3.1 mph.
const WALK_SPEED_MPS: f64 = 1.4;

/// OSRM route service, one request per transport profile.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    fetcher: HttpFetcher,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<RouteEstimate>,
}

impl OsrmClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::from_settings(settings, Provider::Osrm, None)?,
            base_url: settings.osrm_base_url().to_string(),
        })
    }

    fn route_url(&self, start: &Coordinates, end: &Coordinates, profile: TransportProfile) -> String {
        // OSRM wants lon,lat pairs.
        join_url(
            &self.base_url,
            &format!(
                "/route/v1/{}/{},{};{},{}",
                profile.osrm_profile(),
                start.lon,
                start.lat,
                end.lon,
                end.lat
            ),
        )
    }

    async fn fetch_route(
        &self,
        start: &Coordinates,
        end: &Coordinates,
        profile: TransportProfile,
    ) -> Option<RouteEstimate> {
        let url = self.route_url(start, end, profile);
        let query = [("overview", "false".to_string())];
        match self
            .fetcher
            .get_json_with_client_errors::<RouteResponse>(&url, &query)
            .await
        {
            Ok(res) => {
                let route = res.first_route();
                if route.is_none() {
                    tracing::info!(?profile, "no route for profile");
                }
                route
            }
            Err(err) => {
                tracing::warn!(?profile, error = %err, "route fetch failed");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl RouteProvider for OsrmClient {
    async fn commute_times(&self, start: &Coordinates, end: &Coordinates) -> CommuteTimes {
        let (car, bike, foot) = tokio::join!(
            self.fetch_route(start, end, TransportProfile::Car),
            self.fetch_route(start, end, TransportProfile::Bike),
            self.fetch_route(start, end, TransportProfile::Foot),
        );
        let times = with_speed_estimates(CommuteTimes { car, bike, foot });
        tracing::info!(
            car = ?times.car.map(|r| r.duration),
            bike = ?times.bike.map(|r| r.duration),
            foot = ?times.foot.map(|r| r.duration),
            "fetched commute times"
        );
        times
    }
}

impl RouteResponse {
    fn first_route(self) -> Option<RouteEstimate> {
        if self.code != "Ok" {
            return None;
        }
        self.routes.into_iter().next()
    }
}

/// The public OSRM demo server often answers every profile with the driving route. When a
/// bike or foot route is missing or suspiciously identical to the car route, estimate it
/// from the driving distance at a typical speed.
pub fn with_speed_estimates(mut times: CommuteTimes) -> CommuteTimes {
    let Some(car) = times.car else {
        return times;
    };
    let estimate = |speed_mps: f64| RouteEstimate {
        distance: car.distance,
        duration: (car.distance / speed_mps).round(),
    };

    if times.bike.map_or(true, |b| b.duration == car.duration) {
        times.bike = Some(estimate(BIKE_SPEED_MPS));
    }
    if times.foot.map_or(true, |f| f.duration == car.duration) {
        times.foot = Some(estimate(WALK_SPEED_MPS));
    }
    times
}
