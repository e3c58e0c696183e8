use crate::config::Settings;
use crate::ingest::error::{Provider, ProviderError};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// GET-only HTTP client shared by the collaborator clients: one timeout, bounded retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    provider: Provider,
    retries: u32,
}

impl HttpFetcher {
    pub fn from_settings(
        settings: &Settings,
        provider: Provider,
        user_agent: Option<&str>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(settings.http_timeout());
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua.to_string());
        }
        let http = builder
            .build()
            .with_context(|| format!("failed to build {provider:?} http client"))?;

        Ok(Self {
            http,
            provider,
            retries: settings.http_retries(),
        })
    }

    /// Response body as text. Transport failures, 5xx and 429 are retried with exponential
    /// backoff; any other non-success status fails immediately.
    pub async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let (status, text) = self.get_with_retry(url, query).await?;
        if !status.is_success() {
            return Err(self.status_error(status, &text));
        }
        Ok(text)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let text = self.get_text(url, query).await?;
        self.decode(&text)
    }

    /// Like [`get_json`](Self::get_json), but a 4xx body is decoded too. For services such as
    /// OSRM that describe "no result" in a JSON body sent with a client-error status.
    pub async fn get_json_with_client_errors<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let (status, text) = self.get_with_retry(url, query).await?;
        if !(status.is_success() || status.is_client_error()) {
            return Err(self.status_error(status, &text));
        }
        self.decode(&text)
    }

    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String)> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let err = match self.get_once(url, query).await {
                Ok((status, text)) if !is_retryable(status) => return Ok((status, text)),
                Ok((status, text)) => {
                    if attempt >= self.retries {
                        return Ok((status, text));
                    }
                    self.status_error(status, &text)
                }
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    err
                }
            };
            let backoff = backoff(attempt);
            tracing::warn!(
                provider = ?self.provider,
                attempt,
                ?backoff,
                error = %err,
                "fetch failed; retrying"
            );
            tokio::time::sleep(backoff).await;
        }
    }

    async fn get_once(&self, url: &str, query: &[(&str, String)]) -> Result<(StatusCode, String)> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::new(self.provider, "request", e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read {:?} response body", self.provider))?;
        Ok((status, text))
    }

    fn status_error(&self, status: StatusCode, body: &str) -> anyhow::Error {
        ProviderError::new(
            self.provider,
            "http",
            format!("status={status}; body={}", truncate(body, 512)),
        )
        .into()
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        serde_json::from_str::<T>(text).map_err(|e| {
            ProviderError::new(
                self.provider,
                "decode",
                format!("{e}; body={}", truncate(text, 512)),
            )
            .into()
        })
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// 1s, 2s, 4s, ... capped at 64s.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.saturating_sub(1).min(6))
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://api.open-meteo.com/", "/v1/forecast"),
            "https://api.open-meteo.com/v1/forecast"
        );
        assert_eq!(join_url("http://localhost:5000", "route/v1"), "http://localhost:5000/route/v1");
    }

    #[test]
    fn only_server_errors_and_throttling_are_retried() {
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::OK));
    }

    #[test]
    fn backoff_doubles_then_levels_off() {
        assert_eq!(backoff(1), Duration::from_secs(1));
        assert_eq!(backoff(3), Duration::from_secs(4));
        assert_eq!(backoff(7), Duration::from_secs(64));
        assert_eq!(backoff(200), Duration::from_secs(64));
    }

    /// Serves `responses` in order (repeating the last) and counts requests.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[n.min(responses.len() - 1)];
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        (format!("http://{addr}"), hits)
    }

    fn fetcher() -> HttpFetcher {
        let settings = Settings {
            http_retries: Some(3),
            http_timeout_secs: Some(5),
            ..Settings::default()
        };
        HttpFetcher::from_settings(&settings, Provider::Osrm, None).unwrap()
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (url, hits) = serve(vec![(404, "{}")]).await;
        let err = fetcher().get_text(&url, &[]).await.unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let diag = err.downcast_ref::<ProviderError>().unwrap();
        assert_eq!(diag.stage, "http");
        assert!(diag.detail.starts_with("status=404"), "{}", diag.detail);
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let (url, hits) = serve(vec![(503, "{}"), (200, "\"ok\"")]).await;
        let text = fetcher().get_text(&url, &[]).await.unwrap();

        assert_eq!(text, "\"ok\"");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_error_bodies_can_be_decoded() {
        let (url, hits) = serve(vec![(400, r#"{"code":"NoRoute"}"#)]).await;
        let body: serde_json::Value = fetcher()
            .get_json_with_client_errors(&url, &[])
            .await
            .unwrap();

        assert_eq!(body["code"], "NoRoute");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(fetcher().get_json::<serde_json::Value>(&url, &[]).await.is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
