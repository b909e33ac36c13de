use assert_matches::assert_matches;
use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;
use serde_json::{json, Value};
use shared::capabilities::{HttpOutput, HttpRequest, HttpResponse, ImageError, ImageOperation};
use shared::model::ImageState;
use shared::view::DetailImage;
use shared::{
    ApiConfig, App, Effect, Event, Model, OperationState, RenderScope, ReportId, ReportStatus,
};

fn report(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "petugas_name": "Rina",
        "petugas_email": "rina@example.com",
        "note": format!("Report number {id}"),
        "status": status,
        "priority": "high",
        "timestamp": "2024-03-09T21:15:00+07:00",
        "latitude": "-6.200000",
        "longitude": "106.816666",
        "location_note": "",
        "photo": format!("https://cdn.example.com/photos/{id}.jpg"),
    })
}

fn ok_json(body: &Value) -> HttpOutput {
    HttpOutput::Ok(HttpResponse::ok().json(body).build())
}

fn answer(status: u16, body: &str) -> HttpOutput {
    HttpOutput::Ok(HttpResponse::status(status).body(body).build())
}

fn has_render(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Render(_)))
}

fn take_http(effects: Vec<Effect>) -> Request<HttpRequest> {
    effects
        .into_iter()
        .find_map(Effect::into_http)
        .expect("an HTTP request")
}

fn take_image(effects: Vec<Effect>) -> Request<ImageOperation> {
    effects
        .into_iter()
        .find_map(Effect::into_image)
        .expect("an image load")
}

/// Resolves `request` and feeds the events it produced back through `update`,
/// returning every effect that followed.
fn resolve<Op: Operation>(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    request: &mut Request<Op>,
    output: Op::Output,
) -> Vec<Effect> {
    let update = app.resolve(request, output).expect("request resolves");
    let mut effects = update.effects;
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

/// Drives `ViewReady` and answers the GET with `body`.
fn load(app: &AppTester<App, Effect>, model: &mut Model, body: &Value) -> Vec<Effect> {
    let update = app.update(Event::ViewReady, model);
    assert!(model.is_loading());
    assert!(has_render(&update.effects));

    let mut request = take_http(update.effects);
    assert_eq!(request.operation.method, "GET");
    resolve(app, model, &mut request, ok_json(body))
}

/// Taps the close action on row `id` and returns the PATCH it produced.
fn request_close(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    id: u64,
) -> Request<HttpRequest> {
    let row = app
        .view(model)
        .rows
        .into_iter()
        .find(|row| row.id == ReportId(id))
        .expect("row on screen");
    let intent = row.action.expect("close action visible").on_tap;

    let update = app.update(intent, model);
    assert!(has_render(&update.effects));
    take_http(update.effects)
}

#[test]
fn test_scenario_a_fetch_populates_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let view = app.view(&model);
    assert!(!view.list_attached);
    assert!(view.rows.is_empty());

    let effects = load(&app, &mut model, &json!([report(1, "open")]));
    assert!(has_render(&effects));

    assert_eq!(model.store.len(), 1);
    assert_eq!(model.store.records()[0].status, ReportStatus::Open);
    assert_eq!(model.fetch, OperationState::Succeeded);

    let view = app.view(&model);
    assert!(view.list_attached);
    assert!(!view.is_loading);
    assert_eq!(view.refresh, RenderScope::Full);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].reporter_name, "Rina");
    assert_eq!(view.rows[0].status, "Status: open");
    assert!(view.rows[0].action.is_some());
}

#[test]
fn test_scenario_b_update_rerenders_only_that_row() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(
        &app,
        &mut model,
        &json!([report(1, "open"), report(2, "in_progress")]),
    );

    let mut request = request_close(&app, &mut model, 1);
    assert_eq!(request.operation.method, "PATCH");
    assert!(request.operation.url.ends_with("/admin/laporan/1/"));
    let body: Value = serde_json::from_slice(&request.operation.body).unwrap();
    assert_eq!(body, json!({ "status": "closed" }));
    assert_eq!(app.view(&model).updating, vec![ReportId(1)]);

    let effects = resolve(&app, &mut model, &mut request, ok_json(&report(1, "closed")));
    assert!(has_render(&effects));
    assert_eq!(app.view(&model).refresh, RenderScope::Row { index: 0 });

    assert_eq!(model.store.get(ReportId(1)).unwrap().status, ReportStatus::Closed);
    assert_eq!(
        model.store.get(ReportId(2)).unwrap().status,
        ReportStatus::InProgress
    );

    let view = app.view(&model);
    assert!(view.rows[0].action.is_none());
    assert!(view.rows[1].action.is_some());
    assert!(view.updating.is_empty());
    let toast = view.toast.unwrap();
    assert!(toast.message.contains('1'));
    assert!(toast.message.contains("closed"));
}

#[test]
fn test_scenario_c_transport_failure_on_fetch() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let mut request = take_http(app.update(Event::ViewReady, &mut model).effects);
    resolve(
        &app,
        &mut model,
        &mut request,
        HttpOutput::Err(crux_http::Error::Timeout),
    );

    assert!(model.store.is_empty());
    assert_eq!(model.fetch, OperationState::Failed);
    let view = app.view(&model);
    assert!(!view.list_attached);
    assert!(view.toast.unwrap().message.contains("Timeout"));
}

#[test]
fn test_scenario_d_forbidden_update_leaves_store() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(1, "open")]));
    let before = model.store.clone();

    let mut request = request_close(&app, &mut model, 1);
    resolve(
        &app,
        &mut model,
        &mut request,
        answer(403, r#"{"detail":"forbidden"}"#),
    );

    assert_eq!(model.store, before);
    let view = app.view(&model);
    assert!(view.updating.is_empty());
    assert_eq!(view.toast.unwrap().message, "Failed to update status: 403");
}

#[test]
fn test_fetch_status_error_and_empty_body() {
    let app = AppTester::<App, Effect>::default();

    for output in [answer(500, "oops"), answer(200, ""), answer(200, "null")] {
        let mut model = Model::default();
        let mut request = take_http(app.update(Event::ViewReady, &mut model).effects);
        resolve(&app, &mut model, &mut request, output);

        assert_eq!(
            app.view(&model).toast.unwrap().message,
            "Failed to load reports."
        );
        assert!(!model.list_attached);
    }
}

#[test]
fn test_fetch_keeps_repeated_ids_in_server_order() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(
        &app,
        &mut model,
        &json!([report(4, "open"), report(4, "closed"), report(2, "open")]),
    );

    let ids: Vec<_> = model.store.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![ReportId(4), ReportId(4), ReportId(2)]);

    let view = app.view(&model);
    assert_eq!(view.rows.len(), 3);
    assert!(view.rows[0].action.is_some());
    assert!(view.rows[1].action.is_none());
}

#[test]
fn test_refresh_replaces_whole_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(1, "open"), report(2, "open")]));

    let mut request = take_http(app.update(Event::RefreshRequested, &mut model).effects);
    resolve(
        &app,
        &mut model,
        &mut request,
        ok_json(&json!([report(3, "closed")])),
    );

    let ids: Vec<_> = model.store.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![ReportId(3)]);
}

#[test]
fn test_update_for_report_missing_from_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(1, "open")]));
    let before = model.store.clone();

    let update = app.update(
        Event::StatusChangeRequested {
            id: ReportId(99),
            status: ReportStatus::Closed,
        },
        &mut model,
    );
    let mut request = take_http(update.effects);
    let effects = resolve(&app, &mut model, &mut request, ok_json(&report(99, "closed")));

    assert!(has_render(&effects));
    assert_eq!(app.view(&model).refresh, RenderScope::Full);
    assert_eq!(model.store, before);
}

#[test]
fn test_overlapping_updates_last_completion_wins() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(1, "open")]));

    let mut first = request_close(&app, &mut model, 1);
    let mut second = request_close(&app, &mut model, 1);

    resolve(&app, &mut model, &mut second, ok_json(&report(1, "closed")));
    resolve(
        &app,
        &mut model,
        &mut first,
        ok_json(&report(1, "in_progress")),
    );

    assert_eq!(
        model.store.get(ReportId(1)).unwrap().status,
        ReportStatus::InProgress
    );
}

#[test]
fn test_overlapping_updates_stay_pending_until_the_last_answers() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(1, "open")]));

    let mut first = request_close(&app, &mut model, 1);
    let mut second = request_close(&app, &mut model, 1);
    assert_eq!(model.updates[&ReportId(1)].in_flight, 2);

    resolve(&app, &mut model, &mut first, answer(500, "busy"));
    assert_eq!(app.view(&model).updating, vec![ReportId(1)]);
    assert!(model.updates[&ReportId(1)].state.is_in_flight());

    resolve(&app, &mut model, &mut second, ok_json(&report(1, "closed")));
    assert!(app.view(&model).updating.is_empty());
    assert_eq!(model.updates[&ReportId(1)].state, OperationState::Succeeded);
}

#[test]
fn test_configure_points_requests_at_new_backend() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let config = ApiConfig::new("https://reports.example.org/api/")
        .unwrap()
        .with_reports_path("v2/reports/");
    let update = app.update(Event::Configure { config }, &mut model);
    assert!(has_render(&update.effects));
    assert!(app.view(&model).toast.is_none());

    let request = take_http(app.update(Event::ViewReady, &mut model).effects);
    assert_eq!(request.operation.url, "https://reports.example.org/api/v2/reports/");
}

#[test]
fn test_configure_rejects_bad_backend() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let config = ApiConfig {
        base_url: "ftp://reports.example.org/".into(),
        ..ApiConfig::default()
    };
    app.update(Event::Configure { config }, &mut model);

    assert_eq!(model.config, ApiConfig::default());
    assert_matches!(
        app.view(&model).toast,
        Some(toast) if toast.message.starts_with("Invalid backend configuration")
    );
}

#[test]
fn test_detail_loads_photo() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(5, "open")]));

    let tap = app.view(&model).rows.remove(0).on_tap;
    let update = app.update(tap, &mut model);
    assert!(has_render(&update.effects));
    let mut request = take_image(update.effects);
    assert_eq!(
        request.operation,
        ImageOperation::Load {
            url: "https://cdn.example.com/photos/5.jpg".into()
        }
    );

    let detail = app.view(&model).detail.unwrap();
    assert_eq!(detail.title, "Report number 5");
    assert_eq!(detail.attribution, "by Rina");
    assert_eq!(detail.status, "OPEN");
    assert_eq!(detail.coordinates, "-6.2, 106.816666");
    assert_eq!(detail.location_note, "No location note");
    assert_matches!(detail.image, DetailImage::Loading { .. });

    resolve(&app, &mut model, &mut request, Ok(()));
    assert_matches!(
        app.view(&model).detail.unwrap().image,
        DetailImage::Loaded { url } if url.ends_with("5.jpg")
    );

    app.update(Event::DetailDismissed, &mut model);
    assert!(app.view(&model).detail.is_none());
}

#[test]
fn test_detail_photo_failure_and_late_arrival() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    load(&app, &mut model, &json!([report(5, "open")]));

    let tap = app.view(&model).rows.remove(0).on_tap;
    let mut request = take_image(app.update(tap.clone(), &mut model).effects);
    resolve(&app, &mut model, &mut request, Err(ImageError::new("404")));
    assert_matches!(
        model.detail.as_ref().unwrap().image,
        ImageState::Failed { .. }
    );

    // Load started, dialog closed before it finished.
    let mut request = take_image(app.update(tap, &mut model).effects);
    app.update(Event::DetailDismissed, &mut model);
    let effects = resolve(&app, &mut model, &mut request, Ok(()));
    assert!(effects.is_empty());
    assert!(model.detail.is_none());
}

#[test]
fn test_report_without_photo_skips_image_load() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let mut record = report(8, "closed");
    record["photo"] = Value::Null;
    load(&app, &mut model, &json!([record]));

    let tap = app.view(&model).rows.remove(0).on_tap;
    let update = app.update(tap, &mut model);
    assert!(has_render(&update.effects));
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Image(_))));
    assert_eq!(app.view(&model).detail.unwrap().image, DetailImage::Placeholder);
}

#[test]
fn test_toast_dismissed() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let mut request = take_http(app.update(Event::ViewReady, &mut model).effects);
    resolve(
        &app,
        &mut model,
        &mut request,
        HttpOutput::Err(crux_http::Error::Io("connection reset".into())),
    );
    assert!(model.toast.is_some());

    app.update(Event::ToastDismissed, &mut model);
    assert!(app.view(&model).toast.is_none());
}
