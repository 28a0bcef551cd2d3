use apanel::domain::config::{PanelConfig, PanelConfigInner};
use apanel::domain::user::{BackendUser, PanelTsConfig, UserSettings};
use apanel::request_cache::RequestCache;
use apanel::server::{PanelState, SessionStore, USER_HEADER};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

async fn state() -> PanelState {
    let config = PanelConfig::new(PanelConfigInner { modules: apanel::default_modules(), ..PanelConfigInner::default() });
    let users = SessionStore::new([
        BackendUser::new("admin")
            .with_tsconfig(PanelTsConfig::default().enable_all())
            .with_settings(UserSettings::default().open(true).with("preview_showHiddenPages", "1")),
        BackendUser::new("visitor"),
    ]);

    PanelState::builder()
        .config(config)
        .registry(apanel::default_registry())
        .cache(RequestCache::builder().memory().build())
        .users(users)
        .build()
        .await
        .unwrap()
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
async fn test_visitor_gets_plain_page() {
    let app = apanel_server::router(state().await);
    let response = app.oneshot(get_as("/", Some("visitor"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body(response).await;
    assert!(html.contains("<article>Welcome</article>"));
    assert!(!html.contains("Unreleased product"));
    assert!(!html.contains(r#"id="apanel""#));
}

#[tokio::test]
async fn test_admin_previews_hidden_page_with_overlay() {
    let app = apanel_server::router(state().await);
    let response = app.oneshot(get_as("/page/3", Some("admin"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body(response).await;
    assert!(html.contains(r#"<p class="preview-notice">Preview</p>"#));
    assert!(html.contains(r#"id="apanel""#));
    assert!(html.contains("<dt>Page id</dt><dd>3</dd>"));
    assert!(html.ends_with("</body></html>"));
}

#[tokio::test]
async fn test_hidden_page_is_missing_for_visitors() {
    let app = apanel_server::router(state().await);
    let response = app.oneshot(get_as("/page/3", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_docs_are_mounted() {
    let app = apanel_server::router(state().await);
    let response = app.clone().oneshot(get_as("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_as("/api", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
