use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_RESULT_LIMIT: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchOptions {
    pub debounce_ms: u64,
    pub min_query_chars: usize,
    pub result_limit: usize,
    pub country_filter: Option<String>,
    pub language: String,
    pub request_timeout_ms: u64,
    /// Abort the in-flight request when a newer one is dispatched.
    pub cancel_superseded: bool,
}

impl SearchOptions {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn is_searchable(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= self.min_query_chars
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            result_limit: DEFAULT_RESULT_LIMIT,
            country_filter: Some("il".to_string()),
            language: "he,en".to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            cancel_superseded: true,
        }
    }
}

/// Radius picked on the distance slider, in whole kilometers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RadiusSetting(u32);

impl RadiusSetting {
    pub const MIN_KM: u32 = 1;
    pub const MAX_KM: u32 = 250;
    pub const DEFAULT_KM: u32 = 50;
    pub const PRESETS_KM: [u32; 5] = [10, 25, 50, 100, 200];

    pub fn new(km: u32) -> Self {
        Self(km.clamp(Self::MIN_KM, Self::MAX_KM))
    }

    pub fn km(self) -> f64 {
        f64::from(self.0)
    }

    pub fn presets() -> impl Iterator<Item = Self> {
        Self::PRESETS_KM.into_iter().map(Self)
    }
}

impl Default for RadiusSetting {
    fn default() -> Self {
        Self(Self::DEFAULT_KM)
    }
}
