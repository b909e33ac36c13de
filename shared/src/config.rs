//! Backend location and per-call timeouts.
//!
//! The config lives in the model and arrives through `Event::Configure`; until
//! then the defaults point at the emulator's host loopback.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::capabilities::{UrlError, ValidatedUrl};
use crate::model::ReportId;
use crate::{DEFAULT_BASE_URL, DEFAULT_REPORTS_PATH, FETCH_TIMEOUT, UPDATE_TIMEOUT};

pub const MAX_TIMEOUT_MS: u64 = 300_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    BaseUrl(#[source] UrlError),

    #[error("invalid reports path '{0}'")]
    ReportsPath(String),

    #[error("{name} timeout must be between 1 and {max}ms, got {ms}ms", max = MAX_TIMEOUT_MS)]
    Timeout { name: &'static str, ms: u64 },
}

/// Where the report endpoints live and how long each call may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Collection path relative to `base_url`; an item is `{reports_path}{id}/`.
    pub reports_path: String,
    pub fetch_timeout_ms: u64,
    pub update_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            reports_path: DEFAULT_REPORTS_PATH.to_string(),
            fetch_timeout_ms: millis(FETCH_TIMEOUT),
            update_timeout_ms: millis(UPDATE_TIMEOUT),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            base_url: base_url.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_reports_path(mut self, path: impl Into<String>) -> Self {
        self.reports_path = path.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ValidatedUrl::new(self.base_url.as_str()).map_err(ConfigError::BaseUrl)?;

        let path = self.reports_path.trim();
        if path.is_empty() || path.contains("..") || path.contains(['?', '#']) {
            return Err(ConfigError::ReportsPath(self.reports_path.clone()));
        }

        for (name, ms) in [
            ("fetch", self.fetch_timeout_ms),
            ("update", self.update_timeout_ms),
        ] {
            if ms == 0 || ms > MAX_TIMEOUT_MS {
                return Err(ConfigError::Timeout { name, ms });
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_timeout_ms)
    }

    /// Deadline for a request with the given HTTP method: status changes use
    /// the update timeout, everything else the fetch timeout.
    pub fn timeout_for(&self, method: &str) -> Duration {
        if method.eq_ignore_ascii_case("PATCH") {
            self.update_timeout()
        } else {
            self.fetch_timeout()
        }
    }

    /// `GET` target for the whole list.
    pub fn reports_url(&self) -> Result<ValidatedUrl, UrlError> {
        self.join(&directory(&self.reports_path))
    }

    /// `PATCH` target for one report.
    pub fn report_url(&self, id: ReportId) -> Result<ValidatedUrl, UrlError> {
        self.join(&format!("{}{id}/", directory(&self.reports_path)))
    }

    fn join(&self, path: &str) -> Result<ValidatedUrl, UrlError> {
        let base = Url::parse(&directory(self.base_url.trim())).map_err(|e| UrlError {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        let joined = base
            .join(path.trim_start_matches('/'))
            .map_err(|e| UrlError {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        ValidatedUrl::from_parsed(joined)
    }
}

// Url::join drops the last segment unless the base ends with '/'.
fn directory(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
