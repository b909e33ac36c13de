use std::fmt;

use thiserror::Error;
use url::Url;

pub use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult as HttpOutput};

/// What a finished request hands back to `update`.
pub type HttpResult = crux_http::Result<crux_http::Response<Vec<u8>>>;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid URL '{url}': {reason}")]
pub struct UrlError {
    pub url: String,
    pub reason: String,
}

impl UrlError {
    fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: truncate(url),
            reason: reason.into(),
        }
    }
}

/// Absolute `http`/`https` URL with a host and no embedded credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    pub fn new(url: &str) -> Result<Self, UrlError> {
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(UrlError::new(url, "URL cannot be empty"));
        }

        if trimmed.len() > MAX_URL_LENGTH {
            return Err(UrlError::new(
                trimmed,
                format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            ));
        }

        let parsed = Url::parse(trimmed).map_err(|e| UrlError::new(trimmed, e.to_string()))?;
        Self::from_parsed(parsed)
    }

    pub(crate) fn from_parsed(parsed: Url) -> Result<Self, UrlError> {
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(UrlError::new(
                parsed.as_str(),
                format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            ));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::new(parsed.as_str(), "URL must have a host"));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(UrlError::new(
                parsed.as_str(),
                "credentials in URL are not allowed",
            ));
        }

        Ok(Self(parsed))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn truncate(url: &str) -> String {
    if url.len() <= 100 {
        url.to_string()
    } else {
        let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &url[..cut])
    }
}
