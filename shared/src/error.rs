//! Why a fetch or status update produced no data, and the toast each case shows.

use crux_http::Response;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::HttpResult;

/// Why a fetch or update attempt did not produce data.
///
/// Every variant ends that attempt; nothing here is retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncError {
    #[error("server answered {code} without a body")]
    EmptyOrMissingBody { code: u16 },

    #[error("server answered {code}")]
    Status { code: u16 },

    #[error("{cause}")]
    Network { cause: String },

    #[error("response body could not be decoded: {cause}")]
    Decode { code: u16, cause: String },
}

impl SyncError {
    /// Splits a finished request into a success response with a body, or an
    /// error. Non-2xx answers already arrive as `crux_http::Error::Http`.
    pub fn check(result: &HttpResult) -> Result<&Response<Vec<u8>>, SyncError> {
        match result {
            Ok(response) if is_empty(response.body()) => Err(Self::EmptyOrMissingBody {
                code: response.status().into(),
            }),
            Ok(response) => Ok(response),
            Err(error) => Err(Self::from(error)),
        }
    }

    /// Decodes a checked success response.
    pub fn decode<T: serde::de::DeserializeOwned>(
        response: &Response<Vec<u8>>,
    ) -> Result<T, SyncError> {
        let body = response.body().map_or(&[][..], Vec::as_slice);
        serde_json::from_slice(body).map_err(|e| Self::Decode {
            code: response.status().into(),
            cause: e.to_string(),
        })
    }

    /// HTTP status the server answered with, when it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::EmptyOrMissingBody { code }
            | Self::Status { code }
            | Self::Decode { code, .. } => Some(*code),
            Self::Network { .. } => None,
        }
    }
}

impl From<&crux_http::Error> for SyncError {
    fn from(error: &crux_http::Error) -> Self {
        match error {
            crux_http::Error::Http(http) => Self::Status {
                code: http.code.into(),
            },
            other => Self::Network {
                cause: other.to_string(),
            },
        }
    }
}

// No payload at all: missing, zero bytes, only whitespace, or a JSON `null`.
fn is_empty(body: Option<&Vec<u8>>) -> bool {
    match body.map(|bytes| std::str::from_utf8(bytes).map(str::trim)) {
        None => true,
        Some(Ok(text)) => text.is_empty() || text == "null",
        Some(Err(_)) => false,
    }
}

/// Toast text for a failed list fetch.
pub fn fetch_failure_notice(error: &SyncError) -> String {
    match error {
        SyncError::EmptyOrMissingBody { .. } | SyncError::Status { .. } => {
            "Failed to load reports.".to_string()
        }
        SyncError::Network { cause } | SyncError::Decode { cause, .. } => {
            format!("Network error: {cause}")
        }
    }
}

/// Toast text for a failed status update.
pub fn update_failure_notice(error: &SyncError) -> String {
    match error.status_code() {
        Some(code) => format!("Failed to update status: {code}"),
        None => "Network error while updating status.".to_string(),
    }
}
