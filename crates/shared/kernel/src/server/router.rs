use super::state::PanelState;
use super::{handlers, health};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
{
    OpenApiRouter::<S>::new().routes(routes!(health::health_handler))
}

/// Toggle and save endpoints, nested under the configured route prefix.
pub fn panel_router(state: &PanelState) -> OpenApiRouter {
    let routes = OpenApiRouter::<PanelState>::new()
        .routes(routes!(handlers::toggle_handler))
        .routes(routes!(handlers::save_handler))
        .with_state(state.clone());

    OpenApiRouter::new().nest(state.settings().route_prefix.trim_end_matches('/'), routes)
}
