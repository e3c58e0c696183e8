use crate::domain::day::DayInput;
use crate::domain::recommendation::Recommendation;
use crate::domain::route::CommuteTimes;
use crate::domain::weather::{Forecast, WeatherSnapshot};
use crate::engine::decision::make_decision;
use crate::engine::gas::GasGauge;
use crate::time::forecast_date::match_forecast_date;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// The sheet row, with `gasLevel` as simulated for this day.
    pub input: DayInput,
    /// Forecast key the row's date token resolved to.
    pub forecast_date: String,
    pub weather: WeatherSnapshot,
    pub recommendation: Recommendation,
    /// Simulated gauge reading after this day's commute.
    pub gas_level_after: i32,
}

/// Score one day against the running gauge and return the gauge for the next day.
pub fn plan_day(
    gauge: GasGauge,
    mut day: DayInput,
    forecast_date: String,
    weather: WeatherSnapshot,
    routes: Option<&CommuteTimes>,
) -> (GasGauge, DayPlan) {
    day.gas_level = gauge.reading();
    let recommendation = make_decision(&day, &weather, routes);
    let next = gauge.after_commute(recommendation.best_method, routes);

    let plan = DayPlan {
        input: day,
        forecast_date,
        weather,
        recommendation,
        gas_level_after: next.reading(),
    };
    (next, plan)
}

/// Plan every day in sheet order, threading the fuel gauge from one day to the next.
///
/// Days are processed sequentially: a car day lowers the gauge every later day sees.
/// Rows are skipped only when the forecast is empty.
pub fn plan_days(
    days: Vec<DayInput>,
    forecast: &Forecast,
    routes: Option<&CommuteTimes>,
) -> Vec<DayPlan> {
    let keys: Vec<&str> = forecast.keys().map(String::as_str).collect();

    let (_, plans) = days.into_iter().fold(
        (GasGauge::full(), Vec::new()),
        |(gauge, mut plans), day| {
            let Some(key) = match_forecast_date(&day.date, &keys) else {
                tracing::warn!(date = %day.date, "no forecast available; skipping day");
                return (gauge, plans);
            };
            let Some(weather) = forecast.get(key) else {
                return (gauge, plans);
            };
            tracing::debug!(date = %day.date, forecast_date = key, "matched forecast day");

            let (next, plan) = plan_day(gauge, day, key.to_string(), weather.clone(), routes);
            plans.push(plan);
            (next, plans)
        },
    );
    plans
}

/// Single-day mode: one row scored against a current-conditions snapshot, at the gas level
/// the row reports.
pub fn plan_single(
    day: DayInput,
    weather: WeatherSnapshot,
    routes: Option<&CommuteTimes>,
) -> DayPlan {
    let forecast_date = weather.date.clone();
    let (_, plan) = plan_day(GasGauge::at(day.gas_level), day, forecast_date, weather, routes);
    plan
}
