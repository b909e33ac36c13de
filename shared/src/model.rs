//! Report records and the state the admin screen keeps between events.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::capabilities::RenderScope;
use crate::config::ApiConfig;
use crate::store::ReportStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub u64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Report lifecycle status as the backend spells it.
///
/// Values the client does not know are kept verbatim in `Other` so a record
/// survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    Open,
    InProgress,
    Closed,
    Other(String),
}

impl ReportStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Other(raw) => raw,
        }
    }

    /// Whether an admin may still close a report in this status.
    #[must_use]
    pub fn is_closable(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

impl From<String> for ReportStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "open" => Self::Open,
            "in_progress" => Self::InProgress,
            "closed" => Self::Closed,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for ReportStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        match status {
            ReportStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One incident report as last returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: ReportId,
    #[serde(alias = "petugas_name")]
    pub reporter_name: String,
    #[serde(default, alias = "petugas_email")]
    pub reporter_email: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub status: ReportStatus,
    #[serde(default)]
    pub priority: Option<String>,
    pub timestamp: String,
    #[serde(deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate")]
    pub longitude: f64,
    #[serde(default)]
    pub location_note: Option<String>,
    #[serde(default, alias = "photo")]
    pub photo_url: Option<String>,
}

impl ReportRecord {
    /// Photo URL worth handing to the image loader, if any.
    pub fn photo(&self) -> Option<&str> {
        non_empty(self.photo_url.as_deref())
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// Decimal model fields reach the wire as either JSON numbers or strings.
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid coordinate '{text}': {e}"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl OperationState {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// Status-update attempts for one report.
///
/// Overlapping requests for the same report are all sent. The entry stays
/// `InFlight` until every one of them has answered; the last answer decides
/// the final state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Status asked for by the most recent request.
    pub target: ReportStatus,
    pub state: OperationState,
    pub in_flight: u32,
}

impl StatusUpdate {
    pub fn started(&mut self, target: ReportStatus) {
        self.target = target;
        self.state = OperationState::InFlight;
        self.in_flight = self.in_flight.saturating_add(1);
    }

    /// Records one answer; the state only settles once nothing is pending.
    pub fn finished(&mut self, outcome: OperationState) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.state = outcome;
        }
    }
}

impl Default for StatusUpdate {
    fn default() -> Self {
        Self {
            target: ReportStatus::Closed,
            state: OperationState::Idle,
            in_flight: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImageState {
    /// Nothing to load; the placeholder stays.
    Placeholder,
    Loading { url: String },
    Loaded { url: String },
    Failed { url: String },
}

/// The report currently shown in the detail dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenDetail {
    pub report: ReportRecord,
    pub image: ImageState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: crate::get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info | Self::Success => crate::TOAST_SHORT_MS,
            Self::Error => crate::TOAST_LONG_MS,
        }
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ApiConfig,
    pub store: ReportStore,
    /// Set once the first list fetch succeeded and the list is bound to the store.
    pub list_attached: bool,
    pub fetch: OperationState,
    pub updates: BTreeMap<ReportId, StatusUpdate>,
    pub detail: Option<OpenDetail>,
    pub toast: Option<ToastMessage>,
    /// Scope of the most recent render request.
    pub render_scope: RenderScope,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.toast = None;
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_in_flight()
    }

    /// Ids with at least one status update still waiting for an answer.
    pub fn updating(&self) -> Vec<ReportId> {
        self.updates
            .iter()
            .filter(|(_, update)| update.state.is_in_flight())
            .map(|(id, _)| *id)
            .collect()
    }
}
