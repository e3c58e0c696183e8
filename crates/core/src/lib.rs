pub mod domain;
pub mod engine;
pub mod ingest;
pub mod service;
pub mod sheet;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";
    const DEFAULT_REVERSE_GEOCODE_BASE_URL: &str = "https://api.bigdatacloud.net";
    const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
    const DEFAULT_NOMINATIM_USER_AGENT: &str = "SmartCommuteDecider/1.0";
    const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_RETRIES: u32 = 3;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub open_meteo_base_url: Option<String>,
        pub reverse_geocode_base_url: Option<String>,
        pub nominatim_base_url: Option<String>,
        pub nominatim_user_agent: Option<String>,
        pub osrm_base_url: Option<String>,
        pub http_timeout_secs: Option<u64>,
        pub http_retries: Option<u32>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                open_meteo_base_url: std::env::var("OPEN_METEO_BASE_URL").ok(),
                reverse_geocode_base_url: std::env::var("REVERSE_GEOCODE_BASE_URL").ok(),
                nominatim_base_url: std::env::var("NOMINATIM_BASE_URL").ok(),
                nominatim_user_agent: std::env::var("NOMINATIM_USER_AGENT").ok(),
                osrm_base_url: std::env::var("OSRM_BASE_URL").ok(),
                http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS")?,
                http_retries: parse_env("HTTP_RETRIES")?,
            })
        }

        pub fn open_meteo_base_url(&self) -> &str {
            non_empty(&self.open_meteo_base_url).unwrap_or(DEFAULT_OPEN_METEO_BASE_URL)
        }

        pub fn reverse_geocode_base_url(&self) -> &str {
            non_empty(&self.reverse_geocode_base_url).unwrap_or(DEFAULT_REVERSE_GEOCODE_BASE_URL)
        }

        pub fn nominatim_base_url(&self) -> &str {
            non_empty(&self.nominatim_base_url).unwrap_or(DEFAULT_NOMINATIM_BASE_URL)
        }

        pub fn nominatim_user_agent(&self) -> &str {
            non_empty(&self.nominatim_user_agent).unwrap_or(DEFAULT_NOMINATIM_USER_AGENT)
        }

        pub fn osrm_base_url(&self) -> &str {
            non_empty(&self.osrm_base_url).unwrap_or(DEFAULT_OSRM_BASE_URL)
        }

        pub fn http_timeout(&self) -> Duration {
            Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
        }

        pub fn http_retries(&self) -> u32 {
            self.http_retries.unwrap_or(DEFAULT_RETRIES).max(1)
        }
    }

    fn non_empty(v: &Option<String>) -> Option<&str> {
        v.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn parse_env<T: std::str::FromStr>(key: &str) -> anyhow::Result<Option<T>>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(key) {
            Ok(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<T>()
                .map(Some)
                .with_context(|| format!("{key} is not a valid number: {s}")),
            _ => Ok(None),
        }
    }

}
