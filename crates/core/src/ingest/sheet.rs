use crate::config::Settings;
use crate::domain::day::DayInput;
use crate::ingest::error::Provider;
use crate::ingest::http::HttpFetcher;
use crate::ingest::SheetSource;
use crate::sheet::parse_sheet;
use anyhow::{Context, Result};

/// Published spreadsheet CSV export, fetched fresh on every call.
#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    fetcher: HttpFetcher,
}

impl HttpSheetSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::from_settings(settings, Provider::Sheet, None)?,
        })
    }
}

#[async_trait::async_trait]
impl SheetSource for HttpSheetSource {
    async fn fetch_days(&self, location: &str) -> Result<Vec<DayInput>> {
        anyhow::ensure!(!location.trim().is_empty(), "sheet URL must be non-empty");
        let text = self
            .fetcher
            .get_text(location.trim(), &[])
            .await
            .context("sheet fetch failed")?;
        let days = parse_sheet(&text);
        tracing::info!(rows = days.len(), "fetched planning sheet");
        Ok(days)
    }
}

/// CSV file on local disk.
#[derive(Debug, Clone, Default)]
pub struct FileSheetSource;

#[async_trait::async_trait]
impl SheetSource for FileSheetSource {
    async fn fetch_days(&self, location: &str) -> Result<Vec<DayInput>> {
        let text = tokio::fs::read_to_string(location)
            .await
            .with_context(|| format!("failed to read sheet file {location}"))?;
        Ok(parse_sheet(&text))
    }
}
