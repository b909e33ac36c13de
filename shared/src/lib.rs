// lib.rs - Report admin core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod shell;
pub mod store;
pub mod view;

use std::time::Duration;

pub use app::App;
pub use capabilities::{Capabilities, Effect, RenderScope};
pub use config::{ApiConfig, ConfigError};
pub use error::SyncError;
pub use event::Event;
pub use model::{Model, OperationState, ReportId, ReportRecord, ReportStatus, ToastKind};
pub use shell::{ImageLoader, Shell, ShellError, Transport};
pub use store::{ReportStore, StoreChange};
pub use view::{ReportDetail, ReportDetailPresenter, ReportListView, ReportRow, ViewModel};

pub const DEFAULT_BASE_URL: &str = "http://10.0.2.2:8000/api/";
pub const DEFAULT_REPORTS_PATH: &str = "admin/laporan/";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const UPDATE_TIMEOUT: Duration = Duration::from_secs(30);
pub const TOAST_SHORT_MS: u64 = 2000;
pub const TOAST_LONG_MS: u64 = 3500;
pub const CLOSE_REPORT_LABEL: &str = "close report";
pub const UNTITLED_REPORT: &str = "Untitled report";
pub const NO_LOCATION_NOTE: &str = "No location note";

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
