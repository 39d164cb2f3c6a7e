//! Dispatcher behavior per interaction variant.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use serde_json::json;
use tokio::time::{advance, Duration};

use pagewire_client::bindings::EventCategory;
use pagewire_client::dispatch::Outcome;
use pagewire_client::feedback::Severity;
use pagewire_client::page::{ElementSpec, MemoryPage, Page, PageEvent};
use pagewire_core::error::FailureKind;
use pagewire_core::protocol::Method;

use common::{harness, run_pending, Scripted, LOCATION};

fn ok(message: &str) -> Scripted {
    Scripted::Json(json!({ "errcode": 0, "message": message }))
}

fn fail(errcode: i64, message: &str) -> Scripted {
    Scripted::Json(json!({ "errcode": errcode, "message": message }))
}

fn create_form(required_identify: &str) -> MemoryPage {
    MemoryPage::new(LOCATION)
        .with(
            ElementSpec::new("book-form")
                .class("ajax-form")
                .attr("action", "/book/create")
                .attr("method", "post")
                .attr("data-url", "/book/guide"),
        )
        .with(ElementSpec::new("name").attr("name", "book_name").attr("required", "required").value("Guide").in_form("book-form"))
        .with(ElementSpec::new("identify").attr("name", "identify").attr("required", "required").value(required_identify).in_form("book-form"))
        .with(ElementSpec::new("description").attr("name", "description").value("").in_form("book-form"))
        .with(ElementSpec::new("save").attr("type", "submit").in_form("book-form"))
}

#[tokio::test(start_paused = true)]
async fn favorite_toggle_flips_marker_without_navigation() {
    let page = MemoryPage::new(LOCATION).with(ElementSpec::new("fav").class("ajax-star").attr("href", "/bookstar/7"));
    let h = harness(page);
    h.transport.reply(
        "/bookstar/7",
        Scripted::Json(json!({ "errcode": 0, "message": "Added to favorites", "data": { "IsCancel": false } })),
    );

    let outcome = h.state.handle_event(EventCategory::Click, "fav").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: None }));

    let toasts = h.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, Severity::Success);
    assert_eq!(toasts[0].message, "Added to favorites");
    assert_eq!(
        h.page.element("fav").unwrap().get_attr("data-state"),
        Some("favorited")
    );

    h.state.presenter().settle().await;
    assert!(h.page.navigations().is_empty());

    h.transport.reply(
        "/bookstar/7",
        Scripted::Json(json!({ "errcode": 0, "message": "Removed", "data": { "IsCancel": true } })),
    );
    h.state.handle_event(EventCategory::Click, "fav").await.unwrap();
    assert_eq!(
        h.page.element("fav").unwrap().get_attr("data-state"),
        Some("not-favorited")
    );
}

#[tokio::test(start_paused = true)]
async fn declined_confirmation_sends_nothing() {
    let page = MemoryPage::new(LOCATION)
        .with(ElementSpec::new("del").class("ajax-get").class("confirm").attr("href", "/book/delete/3"));
    page.answer_confirm(false);
    let h = harness(page);
    h.transport.reply("/book/delete/3", ok("Deleted"));

    let outcome = h.state.handle_event(EventCategory::Click, "del").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Declined));
    assert!(h.transport.sent().is_empty());
    assert!(h.toasts.shown().is_empty());
    assert!(h.state.presenter().stack().is_empty());
}

#[tokio::test(start_paused = true)]
async fn accepted_confirmation_reloads_after_toast() {
    let page = MemoryPage::new(LOCATION)
        .with(ElementSpec::new("del").class("ajax-get").class("confirm").attr("href", "/book/delete/3"));
    let h = harness(page);
    h.transport.reply("/book/delete/3", ok("Deleted"));

    let outcome = h.state.handle_event(EventCategory::Click, "del").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: Some(LOCATION.to_string()) }));
    assert!(matches!(h.page.history()[0], PageEvent::Confirmed { answer: true, .. }));
    assert_eq!(h.transport.sent()[0].method, Method::Get);

    advance(Duration::from_millis(2999)).await;
    run_pending().await;
    assert!(h.page.navigations().is_empty());

    advance(Duration::from_millis(1)).await;
    run_pending().await;
    assert_eq!(h.page.navigations(), vec![LOCATION.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn fire_and_report_failure_never_navigates() {
    let page = MemoryPage::new(LOCATION).with(ElementSpec::new("copy").class("ajax-get").attr("href", "/book/copy/1"));
    let h = harness(page);
    h.transport.reply("/book/copy/1", fail(6002, "Project does not exist"));

    let outcome = h.state.handle_event(EventCategory::Click, "copy").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Application)));

    let toasts = h.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, Severity::Failure);
    assert_eq!(toasts[0].message, "Project does not exist");
    assert_eq!(toasts[0].title, "Error");

    h.state.presenter().settle().await;
    assert!(h.page.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn field_update_failure_restores_previous_value() {
    let page = MemoryPage::new(LOCATION).with(
        ElementSpec::new("title")
            .class("change-update")
            .attr("name", "title")
            .attr("data-url", "/book/setting")
            .attr("data-method", "post")
            .value("Old Title"),
    );
    let h = harness(page);
    h.transport.reply("/book/setting", fail(1, "Title already exists"));

    h.page.type_value("title", "New Title");
    let outcome = h.state.handle_event(EventCategory::Change, "title").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Application)));

    let sent = h.transport.sent();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].payload.get("field"), Some("title"));
    assert_eq!(sent[0].payload.get("value"), Some("New Title"));

    assert_eq!(h.page.value_of("title").as_deref(), Some("Old Title"));
    let toasts = h.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Title already exists");
    assert_eq!(toasts[0].severity, Severity::Failure);
}

#[tokio::test(start_paused = true)]
async fn field_update_success_becomes_new_rollback_point() {
    let page = MemoryPage::new(LOCATION).with(
        ElementSpec::new("summary")
            .class("change-update")
            .attr("name", "summary")
            .attr("data-url", "/book/setting")
            .value("v1"),
    );
    let h = harness(page);

    h.transport.reply("/book/setting", ok("Saved"));
    h.page.type_value("summary", "  v2  ");
    let outcome = h.state.handle_event(EventCategory::Change, "summary").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: None }));
    assert_eq!(h.transport.sent()[0].method, Method::Get);
    assert_eq!(h.transport.sent()[0].payload.get("value"), Some("v2"));

    h.transport.reply("/book/setting", fail(1, "Too long"));
    h.page.type_value("summary", "v3");
    h.state.handle_event(EventCategory::Change, "summary").await.unwrap();
    assert_eq!(h.page.value_of("summary").as_deref(), Some("v2"));

    h.state.presenter().settle().await;
    assert!(h.page.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn form_with_empty_required_field_is_blocked() {
    let h = harness(create_form("   "));
    h.transport.reply("/book/create", ok("Created"));

    let outcome = h.state.handle_event(EventCategory::Submit, "save").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Blocked { field: "identify".into() }));
    assert!(h.transport.sent().is_empty());
    assert!(h.toasts.shown().is_empty());
    assert_eq!(h.page.history(), vec![PageEvent::Focused("identify".into())]);
}

#[tokio::test(start_paused = true)]
async fn form_success_redirects_to_declared_target() {
    let h = harness(create_form("guide"));
    h.transport.reply("/book/create", ok("Created"));

    let outcome = h.state.handle_event(EventCategory::Submit, "save").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: Some("/book/guide".into()) }));

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].payload.encode(), "book_name=Guide&identify=guide&description=");
    assert_eq!(sent[0].required_fields, vec!["name".to_string(), "identify".to_string()]);

    let busy: Vec<PageEvent> = h
        .page
        .history()
        .into_iter()
        .filter(|e| matches!(e, PageEvent::Busy { .. }))
        .collect();
    assert_eq!(
        busy,
        vec![
            PageEvent::Busy { id: "save".into(), busy: true },
            PageEvent::Busy { id: "save".into(), busy: false },
        ]
    );
    assert!(!h.page.element("save").unwrap().has_class("disabled"));
    assert_eq!(h.toasts.shown()[0].timeout_ms, 2000);

    advance(Duration::from_millis(1999)).await;
    run_pending().await;
    assert!(h.page.navigations().is_empty());
    advance(Duration::from_millis(1)).await;
    run_pending().await;
    assert_eq!(h.page.navigations(), vec!["/book/guide".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn get_form_defaults_redirect_to_current_page() {
    let page = MemoryPage::new(LOCATION)
        .with(ElementSpec::new("search").class("ajax-form").attr("action", "/search").attr("method", "get"))
        .with(ElementSpec::new("q").attr("name", "keyword").value("rust").in_form("search"))
        .with(ElementSpec::new("go").attr("type", "submit").in_form("search"));
    let h = harness(page);
    h.transport.reply("/search", ok("Found"));

    let outcome = h.state.handle_event(EventCategory::Submit, "go").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: Some(LOCATION.into()) }));
    assert_eq!(h.transport.sent()[0].method, Method::Get);
    assert_eq!(h.transport.sent()[0].payload.get("keyword"), Some("rust"));
}

#[tokio::test(start_paused = true)]
async fn form_failure_releases_busy_state_and_stays() {
    let h = harness(create_form("guide"));
    h.transport.reply("/book/create", Scripted::Unreachable);

    let outcome = h.state.handle_event(EventCategory::Submit, "save").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Transport)));
    assert!(!h.page.element("save").unwrap().has_class("disabled"));
    assert_eq!(h.toasts.shown()[0].message, "Network error, please try again later");

    h.state.presenter().settle().await;
    assert!(h.page.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn multipart_form_bypasses_envelope_path() {
    let page = MemoryPage::new(LOCATION)
        .with(
            ElementSpec::new("upload")
                .class("ajax-form")
                .attr("action", "/document/upload")
                .attr("method", "post")
                .attr("enctype", "multipart/form-data"),
        )
        .with(ElementSpec::new("file").attr("name", "editormd-file-file").attr("required", "required").value("cover.png").in_form("upload"))
        .with(ElementSpec::new("send").attr("type", "submit").in_form("upload"));
    let h = harness(page);
    h.transport.reply("/document/upload", ok("Uploaded"));

    let outcome = h.state.handle_event(EventCategory::Submit, "send").await.unwrap();
    assert_eq!(outcome, Some(Outcome::HandedOff { frame: "notarget".into() }));
    assert!(h.transport.sent().is_empty());
    assert!(h.toasts.shown().is_empty());
    assert_eq!(
        h.page.history(),
        vec![PageEvent::SubmittedToFrame { form: "upload".into(), frame: "notarget".into() }]
    );
}

#[tokio::test(start_paused = true)]
async fn multipart_form_still_validates_first() {
    let page = MemoryPage::new(LOCATION)
        .with(
            ElementSpec::new("upload")
                .class("ajax-form")
                .attr("method", "post")
                .attr("enctype", "multipart/form-data"),
        )
        .with(ElementSpec::new("file").attr("name", "file").attr("required", "required").in_form("upload"))
        .with(ElementSpec::new("send").attr("type", "submit").in_form("upload"));
    let h = harness(page);

    let outcome = h.state.handle_event(EventCategory::Submit, "send").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Blocked { field: "file".into() }));
    assert_eq!(h.page.history(), vec![PageEvent::Focused("file".into())]);
}

#[tokio::test(start_paused = true)]
async fn malformed_reply_is_reported_with_generic_message() {
    let page = MemoryPage::new(LOCATION).with(ElementSpec::new("copy").class("ajax-get").attr("href", "/book/copy/1"));
    let h = harness(page);
    h.transport.reply("/book/copy/1", Scripted::Text("<html>502 Bad Gateway</html>".into()));

    let outcome = h.state.handle_event(EventCategory::Click, "copy").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Protocol)));
    let toasts = h.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Unexpected server response");

    let m = h.state.metrics();
    assert_eq!(m.failures.get(&[("variant", "fire_and_report"), ("kind", "PROTOCOL")]), 1);
}

#[tokio::test(start_paused = true)]
async fn string_envelope_behaves_like_object() {
    let page = MemoryPage::new(LOCATION).with(ElementSpec::new("copy").class("ajax-get").attr("href", "/book/copy/1"));
    let h = harness(page);

    h.transport.reply("/book/copy/1", Scripted::Text(r#"{"errcode":0,"message":"Copied"}"#.into()));
    let a = h.state.handle_event(EventCategory::Click, "copy").await.unwrap();
    h.transport.reply("/book/copy/1", ok("Copied"));
    let b = h.state.handle_event(EventCategory::Click, "copy").await.unwrap();

    assert_eq!(a, b);
    let toasts = h.toasts.shown();
    assert_eq!(toasts[0].message, toasts[1].message);
    assert_eq!(toasts[0].severity, toasts[1].severity);
}

#[tokio::test(start_paused = true)]
async fn empty_server_message_uses_configured_text() {
    let page = MemoryPage::new(LOCATION).with(ElementSpec::new("copy").class("ajax-get").attr("href", "/book/copy/1"));
    let h = harness(page);
    h.transport.reply("/book/copy/1", ok(""));
    h.state.handle_event(EventCategory::Click, "copy").await.unwrap();

    h.transport.reply("/book/copy/1", fail(3, " "));
    h.state.handle_event(EventCategory::Click, "copy").await.unwrap();

    let toasts = h.toasts.shown();
    assert_eq!(toasts[0].message, "Operation succeeded");
    assert_eq!(toasts[1].message, "Operation failed");
}

#[tokio::test(start_paused = true)]
async fn download_navigates_to_reply_url() {
    let page = MemoryPage::new(LOCATION).with(ElementSpec::new("pdf").class("btn-filedown").attr("href", "/book/export/pdf"));
    let h = harness(page);
    h.transport.reply(
        "/book/export/pdf",
        Scripted::Json(json!({ "errcode": 0, "message": "ok", "data": { "url": "/uploads/guide.pdf" } })),
    );

    let outcome = h.state.handle_event(EventCategory::Click, "pdf").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: Some("/uploads/guide.pdf".into()) }));
    assert_eq!(h.page.navigations(), vec!["/uploads/guide.pdf".to_string()]);

    h.transport.reply("/book/export/pdf", ok("ok"));
    let outcome = h.state.handle_event(EventCategory::Click, "pdf").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Protocol)));
    assert_eq!(h.page.navigations().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn accepted_rating_locks_the_widget() {
    let page = MemoryPage::new(LOCATION).with(
        ElementSpec::new("stars")
            .class("rating")
            .attr("data-url", "/book/score/9")
            .attr("data-val", "4"),
    );
    let h = harness(page);
    h.transport.reply("/book/score/9", ok("Thanks for rating"));

    let outcome = h.state.handle_event(EventCategory::Click, "stars").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Succeeded { navigate_to: None }));
    assert_eq!(h.transport.sent()[0].payload.get("score"), Some("4"));
    assert!(!h.page.element("stars").unwrap().has_class("rating"));

    let again = h.state.handle_event(EventCategory::Click, "stars").await.unwrap();
    assert_eq!(again, None);
    assert_eq!(h.transport.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_rating_stays_open() {
    let page = MemoryPage::new(LOCATION).with(
        ElementSpec::new("stars")
            .class("rating")
            .attr("data-url", "/book/score/9")
            .attr("data-val", "5"),
    );
    let h = harness(page);
    h.transport.reply("/book/score/9", fail(1, "Already rated"));

    let outcome = h.state.handle_event(EventCategory::Click, "stars").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Application)));
    assert!(h.page.element("stars").unwrap().has_class("rating"));
}

#[tokio::test]
async fn unknown_element_is_a_wiring_error() {
    let h = harness(MemoryPage::new(LOCATION));
    let err = h
        .state
        .handle_event(EventCategory::Click, "missing")
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), FailureKind::UnknownElement);
    assert!(h.toasts.shown().is_empty());
}

/// Page whose snapshots never carry a known-good value.
struct UnseededPage(std::sync::Arc<MemoryPage>);

impl Page for UnseededPage {
    fn element(&self, id: &str) -> Option<ElementSpec> {
        self.0.element(id).map(|mut el| {
            el.default_value = None;
            el
        })
    }
    fn elements(&self) -> Vec<ElementSpec> {
        self.0.elements()
    }
    fn set_value(&self, id: &str, value: &str) {
        self.0.set_value(id, value)
    }
    fn commit_value(&self, id: &str, value: &str) {
        self.0.commit_value(id, value)
    }
    fn focus(&self, id: &str) {
        self.0.focus(id)
    }
    fn confirm(&self, prompt: &str) -> bool {
        self.0.confirm(prompt)
    }
    fn location(&self) -> String {
        self.0.location()
    }
    fn navigate(&self, url: &str) {
        self.0.navigate(url)
    }
    fn set_busy(&self, id: &str, busy: bool) {
        self.0.set_busy(id, busy)
    }
    fn set_favorite(&self, id: &str, state: pagewire_client::page::FavoriteState) {
        self.0.set_favorite(id, state)
    }
    fn remove_class(&self, id: &str, class: &str) {
        self.0.remove_class(id, class)
    }
    fn submit_to_frame(&self, form_id: &str, frame: &str) {
        self.0.submit_to_frame(form_id, frame)
    }
}

#[tokio::test(start_paused = true)]
async fn field_without_known_good_value_is_not_blanked_on_failure() {
    use std::sync::Arc;

    use pagewire_client::app_state::ClientState;
    use pagewire_client::config::ClientConfig;

    let inner = Arc::new(MemoryPage::new(LOCATION).with(
        ElementSpec::new("title")
            .class("change-update")
            .attr("name", "title")
            .attr("data-url", "/book/title"),
    ));
    inner.type_value("title", "New Title");

    let transport = Arc::new(common::ScriptedTransport::default());
    let toasts = Arc::new(common::RecordingRenderer::default());
    let state = ClientState::new(
        ClientConfig::default(),
        Arc::new(UnseededPage(inner.clone())),
        transport.clone(),
        toasts.clone(),
    )
    .unwrap();
    state.ready();
    transport.reply("/book/title", fail(1, "Title already exists"));

    let outcome = state.handle_event(EventCategory::Change, "title").await.unwrap();
    assert_eq!(outcome, Some(Outcome::Failed(FailureKind::Application)));
    assert_eq!(inner.value_of("title").as_deref(), Some("New Title"));
    assert_eq!(toasts.shown()[0].message, "Title already exists");
}
