use crate::config::Settings;
use crate::domain::route::Coordinates;
use crate::ingest::error::{Provider, ProviderError};
use crate::ingest::http::{join_url, HttpFetcher};
use crate::ingest::Geocoder;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

const SEARCH_PATH: &str = "/search";

/// Nominatim address search. Hits are cached for the life of the process so repeated
/// plans for the same commute don't hammer the public instance.
#[derive(Debug)]
pub struct NominatimClient {
    fetcher: HttpFetcher,
    base_url: String,
    cache: tokio::sync::Mutex<HashMap<String, Coordinates>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let fetcher = HttpFetcher::from_settings(
            settings,
            Provider::Nominatim,
            Some(settings.nominatim_user_agent()),
        )?;
        Ok(Self {
            fetcher,
            base_url: settings.nominatim_base_url().to_string(),
            cache: tokio::sync::Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let key = cache_key(address);
        if key.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.cache.lock().await.get(&key) {
            return Ok(Some(hit.clone()));
        }

        let url = join_url(&self.base_url, SEARCH_PATH);
        let query = [
            ("q", address.trim().to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
        ];
        let places: Vec<Place> = self
            .fetcher
            .get_json(&url, &query)
            .await
            .with_context(|| format!("geocoding failed for {address:?}"))?;

        let Some(place) = places.into_iter().next() else {
            tracing::info!(address, "address not found");
            return Ok(None);
        };
        let coords = place.into_coordinates()?;
        self.cache.lock().await.insert(key, coords.clone());
        Ok(Some(coords))
    }
}

impl Place {
    fn into_coordinates(self) -> Result<Coordinates> {
        let parse = |v: &str| {
            v.trim().parse::<f64>().map_err(|_| {
                ProviderError::new(Provider::Nominatim, "decode", format!("bad coordinate {v:?}"))
            })
        };
        Ok(Coordinates {
            lat: parse(&self.lat)?,
            lon: parse(&self.lon)?,
            display_name: short_name(&self.display_name),
        })
    }
}

fn cache_key(address: &str) -> String {
    address.trim().to_lowercase()
}

/// "Empire State Building, 350, 5th Avenue, ..." -> "Empire State Building"
fn short_name(display_name: &str) -> String {
    display_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
