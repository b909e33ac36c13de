//! Report sync controller: the Crux `update`/`view` core of the admin screen.

use crux_http::http::Method;
use tracing::{debug, info, instrument, warn};

use crate::capabilities::{Capabilities, HttpResult, ImageResult, RenderScope};
use crate::config::ApiConfig;
use crate::error::{fetch_failure_notice, update_failure_notice, SyncError};
use crate::event::Event;
use crate::model::{
    ImageState, Model, OpenDetail, OperationState, ReportId, ReportRecord, ReportStatus,
    ToastKind,
};
use crate::store::StoreChange;
use crate::view::{ReportDetailPresenter, ReportListView, ToastView, ViewModel};

pub struct App {
    list: ReportListView<Event>,
}

impl Default for App {
    fn default() -> Self {
        let list = ReportListView::new(
            |report| Event::ReportSelected { report },
            |id, status| Event::StatusChangeRequested { id, status },
        );
        Self { list }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").finish_non_exhaustive()
    }
}

impl App {
    pub fn list_view(&self) -> &ReportListView<Event> {
        &self.list
    }

    fn render(scope: RenderScope, model: &mut Model, caps: &Capabilities) {
        model.render_scope = scope;
        caps.render.render();
    }

    fn configure(config: ApiConfig, model: &mut Model, caps: &Capabilities) {
        match config.validate() {
            Ok(()) => {
                info!(base_url = %config.base_url, "backend configured");
                model.config = config;
            }
            Err(error) => {
                warn!(%error, "backend config rejected");
                model.show_toast(
                    format!("Invalid backend configuration: {error}"),
                    ToastKind::Error,
                );
            }
        }
        Self::render(RenderScope::Full, model, caps);
    }

    fn fetch_reports(model: &mut Model, caps: &Capabilities) {
        match model.config.reports_url() {
            Ok(url) => {
                model.fetch = OperationState::InFlight;
                info!(%url, "fetching reports");
                caps.http
                    .request(Method::Get, url.into_url())
                    .send(|result| Event::ReportsFetched(Box::new(result)));
                Self::render(RenderScope::Full, model, caps);
            }
            Err(error) => {
                let result: HttpResult = Err(crux_http::Error::Url(error.to_string()));
                Self::handle_fetch_response(&result, model, caps);
            }
        }
    }

    fn handle_fetch_response(result: &HttpResult, model: &mut Model, caps: &Capabilities) {
        let outcome = SyncError::check(result)
            .and_then(|response| SyncError::decode::<Vec<ReportRecord>>(response));

        match outcome {
            Ok(records) => {
                info!(count = records.len(), "reports loaded");
                model.store.replace_all(records);
                model.list_attached = true;
                model.fetch = OperationState::Succeeded;
            }
            Err(error) => {
                warn!(%error, "report list fetch failed");
                model.fetch = OperationState::Failed;
                model.show_toast(fetch_failure_notice(&error), ToastKind::Error);
            }
        }

        Self::render(RenderScope::Full, model, caps);
    }

    fn request_status_change(
        id: ReportId,
        status: ReportStatus,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        // Overlapping requests for the same id are all sent; whichever
        // completes last decides what the row shows.
        model.updates.entry(id).or_default().started(status.clone());

        let request = model
            .config
            .report_url(id)
            .map_err(|error| crux_http::Error::Url(error.to_string()))
            .and_then(|url| {
                caps.http
                    .request(Method::Patch, url.into_url())
                    .body_json(&serde_json::json!({ "status": status }))
            });

        match request {
            Ok(request) => {
                info!(report_id = %id, %status, "requesting status change");
                request.send(move |result| Event::StatusUpdated {
                    id,
                    status,
                    result: Box::new(result),
                });
                Self::render(RenderScope::Full, model, caps);
            }
            Err(error) => Self::handle_update_response(id, &status, &Err(error), model, caps),
        }
    }

    fn handle_update_response(
        id: ReportId,
        status: &ReportStatus,
        result: &HttpResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let outcome = SyncError::check(result)
            .and_then(|response| SyncError::decode::<ReportRecord>(response));

        match outcome {
            Ok(updated) => {
                Self::finish_update(id, OperationState::Succeeded, model);
                model.show_toast(
                    format!("Report {id} status updated to {status}"),
                    ToastKind::Success,
                );

                let scope = match model.store.replace_by_id(updated) {
                    StoreChange::Changed(index) => {
                        info!(report_id = %id, %status, index, "report status updated");
                        RenderScope::Row { index }
                    }
                    StoreChange::NotFound => {
                        debug!(report_id = %id, "updated report is not in the list");
                        RenderScope::Full
                    }
                };
                Self::render(scope, model, caps);
            }
            Err(error) => {
                warn!(report_id = %id, %error, "status update failed");
                Self::finish_update(id, OperationState::Failed, model);
                model.show_toast(update_failure_notice(&error), ToastKind::Error);
                Self::render(RenderScope::Full, model, caps);
            }
        }
    }

    fn finish_update(id: ReportId, outcome: OperationState, model: &mut Model) {
        if let Some(update) = model.updates.get_mut(&id) {
            update.finished(outcome);
        }
    }

    fn open_detail(report: ReportRecord, model: &mut Model, caps: &Capabilities) {
        let image = ReportDetailPresenter::initial_image(&report);

        if let ImageState::Loading { url } = &image {
            let url = url.clone();
            caps.image.load(url.clone(), move |result| Event::PhotoLoaded { url, result });
        }

        debug!(report_id = %report.id, "opening report detail");
        model.detail = Some(OpenDetail { report, image });
        Self::render(RenderScope::Full, model, caps);
    }

    fn handle_photo_loaded(
        url: &str,
        result: &ImageResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let Some(detail) = model.detail.as_mut() else {
            debug!(url, "photo arrived after the detail closed");
            return;
        };

        if !matches!(&detail.image, ImageState::Loading { url: loading } if loading == url) {
            debug!(url, "photo is no longer on screen");
            return;
        }

        detail.image = match result {
            Ok(()) => ImageState::Loaded {
                url: url.to_string(),
            },
            Err(error) => {
                warn!(url, %error, "photo failed to load");
                ImageState::Failed {
                    url: url.to_string(),
                }
            }
        };

        Self::render(RenderScope::Full, model, caps);
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel<Event>;
    type Capabilities = Capabilities;

    #[instrument(skip_all, fields(event = event.name()))]
    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        if event.is_user_initiated() {
            debug!("user action");
        }

        match event {
            Event::Noop => {}

            Event::Configure { config } => Self::configure(config, model, caps),

            Event::ViewReady | Event::RefreshRequested => Self::fetch_reports(model, caps),

            Event::ReportsFetched(result) => Self::handle_fetch_response(&result, model, caps),

            Event::StatusChangeRequested { id, status } => {
                Self::request_status_change(id, status, model, caps);
            }

            Event::StatusUpdated { id, status, result } => {
                Self::handle_update_response(id, &status, &result, model, caps);
            }

            Event::ReportSelected { report } => Self::open_detail(report, model, caps),

            Event::PhotoLoaded { url, result } => {
                Self::handle_photo_loaded(&url, &result, model, caps);
            }

            Event::DetailDismissed => {
                model.detail = None;
                Self::render(RenderScope::Full, model, caps);
            }

            Event::ToastDismissed => {
                model.clear_toast();
                Self::render(RenderScope::Full, model, caps);
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel<Event> {
        let rows = if model.list_attached {
            self.list.render(&model.store)
        } else {
            Vec::new()
        };

        ViewModel {
            rows,
            list_attached: model.list_attached,
            is_loading: model.is_loading(),
            updating: model.updating(),
            detail: model
                .detail
                .as_ref()
                .map(|open| ReportDetailPresenter::present(&open.report, &open.image)),
            toast: model.toast.as_ref().map(ToastView::from),
            refresh: model.render_scope,
        }
    }
}
