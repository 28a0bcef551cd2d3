mod common;

use apanel_kernel::domain::config::{PanelConfig, PanelConfigInner};
use apanel_kernel::domain::user::{BackendUser, PanelTsConfig, UserSettings};
use apanel_kernel::request::{PageContext, RequestContext};
use apanel_kernel::server::{AdminPanelLayer, PanelState, SessionStore, USER_HEADER, panel_router, system_router};
use apanel_request_cache::RequestCache;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use common::*;
use tower::ServiceExt;

async fn page(context: Option<axum::Extension<RequestContext>>) -> Response {
    let hidden = context.is_some_and(|axum::Extension(c)| c.show_hidden_pages);
    let mut response = Html(format!("<html><body><p>hidden={hidden}</p></body></html>")).into_response();
    response.extensions_mut().insert(PageContext::new(7));
    response
}

async fn json() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "ok": true }))
}

fn users() -> SessionStore {
    SessionStore::new([
        BackendUser::new("admin")
            .with_tsconfig(PanelTsConfig::default().enable_all())
            .with_settings(UserSettings::default().open(true)),
        BackendUser::new("closed").with_tsconfig(PanelTsConfig::default().enable_all()),
        BackendUser::new("hidden").with_tsconfig(PanelTsConfig::default().enable_all().hidden(true)),
        BackendUser::new("plain"),
    ])
}

const DECLARED_PAGE: &str = "<html><body>declared</body></html>";

/// Page that states its size up front.
async fn declared() -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
        (header::CONTENT_LENGTH, DECLARED_PAGE.len().to_string()),
    ];
    (headers, DECLARED_PAGE).into_response()
}

async fn state(site_enabled: bool) -> PanelState {
    let mut inner = PanelConfigInner { modules: modules(), ..PanelConfigInner::default() };
    inner.panel.enabled = site_enabled;
    state_with(inner).await
}

async fn state_with(inner: PanelConfigInner) -> PanelState {
    PanelState::builder()
        .config(PanelConfig::new(inner))
        .registry(registry())
        .cache(RequestCache::builder().memory().build())
        .users(users())
        .build()
        .await
        .unwrap()
}

fn app(state: &PanelState) -> Router {
    let site = Router::new()
        .route("/", get(page))
        .route("/api", get(json))
        .route("/declared", get(declared))
        .layer(AdminPanelLayer::new(state.clone()));
    let (panel, _) = panel_router(state).split_for_parts();
    let (system, _) = system_router::<()>().split_for_parts();
    site.merge(panel).merge(system)
}

fn get_as(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body(response: Response) -> String {
    String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap()
}

#[tokio::test]
async fn test_open_panel_is_injected_before_body() {
    let state = state(true).await;
    let response = app(&state).oneshot(get_as("/", Some("admin"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "private, no-store");
    let html = body(response).await;

    assert!(html.contains("hidden=true"), "enricher output reaches the handler");
    let panel = html.find(r#"<div id="apanel""#).unwrap();
    assert!(panel < html.find("</body>").unwrap());
    assert!(html.contains("apanel-open"));
    assert!(html.contains(r#"href="/backend/page/layout?id=7""#));
    assert!(html.contains("3 captured"));
}

#[tokio::test]
async fn test_anonymous_requests_pass_through() {
    let state = state(true).await;
    let html = body(app(&state).oneshot(get_as("/", None)).await.unwrap()).await;

    assert_eq!(html, "<html><body><p>hidden=false</p></body></html>");
}

#[tokio::test]
async fn test_user_without_enablement_sees_no_panel() {
    let state = state(true).await;
    let html = body(app(&state).oneshot(get_as("/", Some("plain"))).await.unwrap()).await;
    assert!(!html.contains("apanel"));
}

#[tokio::test]
async fn test_hidden_user_keeps_modules_but_no_overlay() {
    let state = state(true).await;
    let html = body(app(&state).oneshot(get_as("/", Some("hidden"))).await.unwrap()).await;

    assert!(html.contains("hidden=true"));
    assert!(!html.contains(r#"id="apanel""#));
}

#[tokio::test]
async fn test_site_switch_disables_overlay() {
    let state = state(false).await;
    let html = body(app(&state).oneshot(get_as("/", Some("admin"))).await.unwrap()).await;
    assert!(!html.contains(r#"id="apanel""#));
}

#[tokio::test]
async fn test_closed_panel_shows_toggle_only() {
    let state = state(true).await;
    let html = body(app(&state).oneshot(get_as("/", Some("closed"))).await.unwrap()).await;

    assert!(html.contains("apanel-closed"));
    assert!(!html.contains("apanel-module"));
}

#[tokio::test]
async fn test_non_html_responses_are_untouched() {
    let state = state(true).await;
    let response = app(&state).oneshot(get_as("/api", Some("admin"))).await.unwrap();
    assert_eq!(body(response).await, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_oversized_pages_pass_through_without_overlay() {
    let mut inner = PanelConfigInner { modules: modules(), ..PanelConfigInner::default() };
    inner.panel.max_body_bytes = 16;
    let state = state_with(inner).await;

    let response = app(&state).oneshot(get_as("/", Some("admin"))).await.unwrap();
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    assert_eq!(body(response).await, "<html><body><p>hidden=true</p></body></html>");

    let response = app(&state).oneshot(get_as("/declared", Some("admin"))).await.unwrap();
    assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "34");
    assert_eq!(body(response).await, DECLARED_PAGE);
}

#[tokio::test]
async fn test_pages_within_the_limit_get_the_overlay() {
    let state = state(true).await;
    let response = app(&state).oneshot(get_as("/declared", Some("admin"))).await.unwrap();

    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    let html = body(response).await;
    assert!(html.starts_with("<html><body>declared<"));
    assert!(html.contains("apanel"));
}

#[tokio::test]
async fn test_toggle_flips_display_flag() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/toggle").header(USER_HEADER, "closed").body(Body::empty()).unwrap();
    let response = app(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, r#"{"open":true}"#);
    assert!(state.users.resolve(&header_for("closed")).unwrap().settings.display_top);
}

#[tokio::test]
async fn test_toggle_redirects_form_posts() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/toggle")
        .header(USER_HEADER, "admin")
        .header(header::REFERER, "/news")
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/news");
}

#[tokio::test]
async fn test_toggle_ignores_foreign_referer() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/toggle")
        .header(header::HOST, "site.example")
        .header(USER_HEADER, "admin")
        .header(header::REFERER, "https://evil.example/")
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body(response).await, r#"{"open":false}"#);
}

#[tokio::test]
async fn test_toggle_follows_absolute_referer_on_same_host() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/toggle")
        .header(header::HOST, "site.example")
        .header(USER_HEADER, "admin")
        .header(header::REFERER, "http://site.example/news?page=2")
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/news?page=2");
}

#[tokio::test]
async fn test_toggle_requires_user() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/toggle").body(Body::empty()).unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_save_stores_module_settings() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/save")
        .header(USER_HEADER, "admin")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("preview_simulateDate=2030-01-01&display_preview=1"))
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();

    assert_eq!(body(response).await, r#"{"saved":2}"#);
    let user = state.users.resolve(&header_for("admin")).unwrap();
    assert_eq!(user.settings.module_option("preview", "simulateDate"), Some("2030-01-01"));
    assert!(user.settings.is_displayed("preview"));
}

#[tokio::test]
async fn test_save_rejects_malformed_keys() {
    let state = state(true).await;
    let request = Request::post("/_adminpanel/save")
        .header(USER_HEADER, "admin")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("nounderscore=1"))
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health() {
    let state = state(true).await;
    let response = app(&state).oneshot(get_as("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
    assert_eq!(json["status"], "up");
}

fn header_for(user: &str) -> axum::http::HeaderMap {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(USER_HEADER, user.parse().unwrap());
    headers
}
