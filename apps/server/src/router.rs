use crate::site;
use apanel::server::{AdminPanelLayer, PanelState, panel_router, system_router};
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(tags(
    (name = "System", description = "Host health"),
    (name = "AdminPanel", description = "Admin panel toggle and settings"),
))]
struct ApiDoc;

/// The demo site behind the overlay, the panel endpoints and the API docs.
pub fn init(state: PanelState) -> Router {
    let pages = Router::new()
        .route("/", get(site::home))
        .route("/page/{id}", get(site::page))
        .layer(AdminPanelLayer::new(state.clone()));

    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(panel_router(&state))
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new()
        .merge(pages)
        .merge(openapi_routes)
        .merge(scalar_routes)
        .layer(TraceLayer::new_for_http())
}
