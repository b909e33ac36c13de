//! Events the report admin core reacts to.

use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpResult, ImageResult};
use crate::config::ApiConfig;
use crate::model::{ReportId, ReportRecord, ReportStatus};

/// Everything that can happen to the report admin screen.
///
/// Shell-originated events are serializable; capability completions are only
/// ever built by the capabilities themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Noop,

    /// Points the core at a backend. Rejected configs keep the previous one.
    Configure { config: ApiConfig },

    /// The list screen is on screen and ready to bind data.
    ViewReady,
    RefreshRequested,

    /// Row tapped.
    ReportSelected { report: ReportRecord },
    DetailDismissed,

    /// Row action tapped.
    StatusChangeRequested { id: ReportId, status: ReportStatus },

    ToastDismissed,

    #[serde(skip)]
    ReportsFetched(Box<HttpResult>),

    #[serde(skip)]
    StatusUpdated {
        id: ReportId,
        status: ReportStatus,
        result: Box<HttpResult>,
    },

    #[serde(skip)]
    PhotoLoaded { url: String, result: ImageResult },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure { .. } => "configure",
            Self::ViewReady => "view_ready",
            Self::RefreshRequested => "refresh_requested",
            Self::ReportSelected { .. } => "report_selected",
            Self::DetailDismissed => "detail_dismissed",
            Self::StatusChangeRequested { .. } => "status_change_requested",
            Self::ToastDismissed => "toast_dismissed",
            Self::ReportsFetched(_) => "reports_fetched",
            Self::StatusUpdated { .. } => "status_updated",
            Self::PhotoLoaded { .. } => "photo_loaded",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::RefreshRequested
                | Self::ReportSelected { .. }
                | Self::DetailDismissed
                | Self::StatusChangeRequested { .. }
                | Self::ToastDismissed
        )
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}
