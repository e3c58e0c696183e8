use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commute_core::domain::day::DayInput;
use commute_core::domain::recommendation::Recommendation;
use commute_core::domain::route::CommuteTimes;
use commute_core::domain::weather::WeatherSnapshot;
use commute_core::engine::make_decision;
use commute_core::service::{CommuteService, PlanError, PlanRequest, PlanResponse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = commute_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let service = CommuteService::from_settings(&settings)?;
    let app = router(AppState { service });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/commute", get(get_plan))
        .route("/api/commute/today", get(get_today))
        .route("/api/decision", post(post_decision))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: CommuteService,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommuteQuery {
    sheet_url: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl CommuteQuery {
    fn into_request(self) -> Result<PlanRequest, ApiError> {
        let sheet_url = self
            .sheet_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing sheetUrl parameter"))?;
        Ok(PlanRequest {
            sheet_url,
            lat: self.lat,
            lon: self.lon,
        })
    }
}

#[derive(Debug, Serialize)]
struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
}

impl ApiError {
    fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: msg.to_string(),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

async fn get_plan(
    State(state): State<AppState>,
    Query(query): Query<CommuteQuery>,
) -> Result<Json<PlanResponse>, ApiError> {
    let req = query.into_request()?;
    let res = state.service.plan(&req).await.map_err(report)?;
    Ok(Json(res))
}

async fn get_today(
    State(state): State<AppState>,
    Query(query): Query<CommuteQuery>,
) -> Result<Json<PlanResponse>, ApiError> {
    let req = query.into_request()?;
    let res = state.service.today(&req).await.map_err(report)?;
    Ok(Json(res))
}

#[derive(Debug, Deserialize)]
struct DecisionRequest {
    day: DayInput,
    weather: WeatherSnapshot,
    #[serde(default)]
    routes: Option<CommuteTimes>,
}

/// Score a single, fully specified day. No external calls.
async fn post_decision(
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<Recommendation>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(make_decision(&req.day, &req.weather, req.routes.as_ref())))
}

fn report(err: PlanError) -> ApiError {
    let err = anyhow::Error::new(err);
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "commute plan failed");
    match err.downcast::<PlanError>() {
        Ok(plan_err) => plan_err.into(),
        Err(other) => ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: other.to_string(),
        },
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &commute_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_blank_sheet_url_is_a_bad_request() {
        let q = CommuteQuery {
            sheet_url: None,
            lat: None,
            lon: None,
        };
        let err = q.into_request().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "Missing sheetUrl parameter");

        let q = CommuteQuery {
            sheet_url: Some("  ".to_string()),
            lat: Some(1.0),
            lon: Some(2.0),
        };
        assert!(q.into_request().is_err());
    }

    #[test]
    fn plan_errors_become_generic_server_errors() {
        let err = report(PlanError::SheetEmpty);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"error": "Failed to fetch user data from Sheet"})
        );
    }

    #[tokio::test]
    async fn malformed_decision_body_is_a_json_bad_request() {
        use axum::extract::FromRequest;

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/decision")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"day": {"date": "Monday"}"#))
            .unwrap();
        let payload = Json::<DecisionRequest>::from_request(req, &()).await;
        assert!(payload.is_err());

        let err = post_decision(payload).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&err).unwrap();
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn decision_request_accepts_camel_case_payload() {
        let req: DecisionRequest = serde_json::from_value(json!({
            "day": {
                "date": "Monday",
                "earlyMeeting": false,
                "gasLevel": 80,
                "budgetMode": false,
                "urgency": 2,
                "origin": "",
                "destination": ""
            },
            "weather": {
                "temperature": 20.0,
                "isRaining": false,
                "isSnowing": false,
                "windSpeed": 5.0,
                "precipitation": 0.0,
                "cityName": "Springfield",
                "date": "2024-01-01"
            }
        }))
        .unwrap();
        assert!(req.routes.is_none());

        let rec = make_decision(&req.day, &req.weather, req.routes.as_ref());
        assert_eq!(rec.scores.walk, 140);
    }
}
