use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Sheet,
    OpenMeteo,
    BigDataCloud,
    Nominatim,
    Osrm,
}

/// Failure talking to an external collaborator. Attached to `anyhow` errors so callers can
/// `downcast_ref` and tell which service misbehaved.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
}

impl ProviderError {
    pub fn new(provider: Provider, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            provider,
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provider error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for ProviderError {}
