use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commute_core::ingest::sheet::FileSheetSource;
use commute_core::service::{CommuteService, PlanRequest, PlanResponse};

#[derive(Debug, Parser)]
#[command(name = "commute_planner")]
struct Args {
    /// Published CSV export URL of the commute sheet.
    #[arg(long, conflicts_with = "csv", required_unless_present = "csv")]
    sheet_url: Option<String>,

    /// Read rows from a local CSV file instead of a sheet URL.
    #[arg(long)]
    csv: Option<String>,

    /// Weather location latitude. Defaults to the geocoded origin of the first routed row.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Plan only the first row against current conditions.
    #[arg(long)]
    today: bool,

    /// Print the full plan as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = commute_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let mut service = CommuteService::from_settings(&settings)?;
    let location = match (&args.csv, &args.sheet_url) {
        (Some(path), _) => {
            service = service.with_sheet_source(Arc::new(FileSheetSource));
            path.clone()
        }
        (None, Some(url)) => url.clone(),
        (None, None) => anyhow::bail!("either --sheet-url or --csv is required"),
    };
    let req = PlanRequest {
        sheet_url: location,
        lat: args.lat,
        lon: args.lon,
    };

    let res = if args.today {
        service.today(&req).await
    } else {
        service.plan(&req).await
    };
    let res = match res {
        Ok(res) => res,
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "commute plan failed");
            return Err(err);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        for line in render(&res) {
            println!("{line}");
        }
    }
    Ok(())
}

fn render(res: &PlanResponse) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(city) = &res.city_name {
        out.push(format!("Weather for {city}"));
    }
    if let (Some(origin), Some(dest)) = (&res.origin, &res.destination) {
        out.push(format!("Commute: {} -> {}", origin.display_name, dest.display_name));
    }
    for plan in &res.days {
        let rec = &plan.recommendation;
        out.push(format!(
            "{} ({}): {}  [walk {} / bike {} / car {}]  gas {}% -> {}%",
            plan.input.date,
            plan.forecast_date,
            rec.best_method,
            rec.scores.walk,
            rec.scores.bike,
            rec.scores.car,
            plan.input.gas_level,
            plan.gas_level_after,
        ));
        out.extend(rec.reasoning.iter().map(|r| format!("  - {r}")));
    }
    if res.days.is_empty() {
        out.push("No sheet rows matched the forecast.".to_string());
    }
    out
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
