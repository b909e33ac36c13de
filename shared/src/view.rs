//! Render descriptions for the list rows and the detail dialog.
//!
//! Everything here is a pure function of model data. Shells draw what these
//! structs say and send back the intents they carry; nothing in this module
//! knows about a widget toolkit.

use serde::{Deserialize, Serialize};

use crate::capabilities::RenderScope;
use crate::model::{
    non_empty, ImageState, ReportId, ReportRecord, ReportStatus, ToastKind, ToastMessage,
};
use crate::store::ReportStore;
use crate::{CLOSE_REPORT_LABEL, NO_LOCATION_NOTE, UNTITLED_REPORT};

/// What a row can ask for, before the list view maps it to an app intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum RowIntent {
    OpenDetail { report: ReportRecord },
    UpdateStatus { id: ReportId, status: ReportStatus },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowAction<I> {
    pub label: String,
    pub on_tap: I,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRow<I> {
    pub id: ReportId,
    pub reporter_name: String,
    pub note: String,
    pub status: String,
    pub on_tap: I,
    /// Present only while the report can still be closed.
    pub action: Option<RowAction<I>>,
}

impl ReportRow<RowIntent> {
    pub fn map<I>(self, f: impl Fn(RowIntent) -> I) -> ReportRow<I> {
        ReportRow {
            id: self.id,
            reporter_name: self.reporter_name,
            note: self.note,
            status: self.status,
            on_tap: f(self.on_tap),
            action: self.action.map(|action| RowAction {
                label: action.label,
                on_tap: f(action.on_tap),
            }),
        }
    }
}

/// Binds one record to a row.
///
/// The only transition a row offers is to `closed`, and only from `open` or
/// `in_progress`.
#[must_use]
pub fn render_row(record: &ReportRecord) -> ReportRow<RowIntent> {
    let action = record.status.is_closable().then(|| RowAction {
        label: CLOSE_REPORT_LABEL.to_string(),
        on_tap: RowIntent::UpdateStatus {
            id: record.id,
            status: ReportStatus::Closed,
        },
    });

    ReportRow {
        id: record.id,
        reporter_name: record.reporter_name.clone(),
        note: record.note.clone().unwrap_or_default(),
        status: format!("Status: {}", record.status),
        on_tap: RowIntent::OpenDetail {
            report: record.clone(),
        },
        action,
    }
}

type OpenDetailHandler<I> = Box<dyn Fn(ReportRecord) -> I + Send + Sync>;
type StatusChangeHandler<I> = Box<dyn Fn(ReportId, ReportStatus) -> I + Send + Sync>;

/// The report list, with its two intent handlers injected at construction.
pub struct ReportListView<I> {
    on_open_detail: OpenDetailHandler<I>,
    on_status_change: StatusChangeHandler<I>,
}

impl<I> ReportListView<I> {
    pub fn new<D, S>(on_open_detail: D, on_status_change: S) -> Self
    where
        D: Fn(ReportRecord) -> I + Send + Sync + 'static,
        S: Fn(ReportId, ReportStatus) -> I + Send + Sync + 'static,
    {
        Self {
            on_open_detail: Box::new(on_open_detail),
            on_status_change: Box::new(on_status_change),
        }
    }

    pub fn dispatch(&self, intent: RowIntent) -> I {
        match intent {
            RowIntent::OpenDetail { report } => (self.on_open_detail)(report),
            RowIntent::UpdateStatus { id, status } => (self.on_status_change)(id, status),
        }
    }

    pub fn render_row(&self, record: &ReportRecord) -> ReportRow<I> {
        render_row(record).map(|intent| self.dispatch(intent))
    }

    pub fn render(&self, store: &ReportStore) -> Vec<ReportRow<I>> {
        store.iter().map(|record| self.render_row(record)).collect()
    }

    /// Re-renders a single row after the store reported a change there.
    pub fn render_at(&self, store: &ReportStore, index: usize) -> Option<ReportRow<I>> {
        store.records().get(index).map(|record| self.render_row(record))
    }
}

impl<I> std::fmt::Debug for ReportListView<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportListView").finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailImage {
    /// Generic gallery placeholder; also shown while loading.
    Placeholder,
    Loading { url: String },
    Loaded { url: String },
    /// Distinct error image.
    Error { url: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportDetail {
    pub id: ReportId,
    pub title: String,
    pub attribution: String,
    pub status: String,
    pub timestamp: String,
    pub coordinates: String,
    pub location_note: String,
    pub image: DetailImage,
}

pub struct ReportDetailPresenter;

impl ReportDetailPresenter {
    /// Image state when the dialog opens: loading if there is a photo to
    /// fetch, otherwise the placeholder with no load at all.
    #[must_use]
    pub fn initial_image(record: &ReportRecord) -> ImageState {
        match record.photo() {
            Some(url) => ImageState::Loading {
                url: url.to_string(),
            },
            None => ImageState::Placeholder,
        }
    }

    #[must_use]
    pub fn present(record: &ReportRecord, image: &ImageState) -> ReportDetail {
        ReportDetail {
            id: record.id,
            title: non_empty(record.note.as_deref())
                .unwrap_or(UNTITLED_REPORT)
                .to_string(),
            attribution: format!("by {}", record.reporter_name),
            status: record.status.as_str().to_uppercase(),
            timestamp: record.timestamp.clone(),
            coordinates: format!("{}, {}", record.latitude, record.longitude),
            location_note: non_empty(record.location_note.as_deref())
                .unwrap_or(NO_LOCATION_NOTE)
                .to_string(),
            image: match image {
                ImageState::Placeholder => DetailImage::Placeholder,
                ImageState::Loading { url } => DetailImage::Loading { url: url.clone() },
                ImageState::Loaded { url } => DetailImage::Loaded { url: url.clone() },
                ImageState::Failed { url } => DetailImage::Error { url: url.clone() },
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel<I> {
    /// Empty until the first successful fetch attaches the list.
    pub rows: Vec<ReportRow<I>>,
    pub list_attached: bool,
    pub is_loading: bool,
    pub updating: Vec<ReportId>,
    pub detail: Option<ReportDetail>,
    pub toast: Option<ToastView>,
    /// What changed since the previous render; a shell may redraw just that.
    pub refresh: RenderScope,
}
