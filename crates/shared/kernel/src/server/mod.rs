//! HTTP integration: the overlay middleware, the backend-user session store, the
//! shared [`PanelState`] and the panel's own routes.

mod handlers;
mod health;
mod layer;
mod router;
mod session;
mod state;

pub use handlers::{SaveResponse, ToggleResponse};
pub use health::HealthResponse;
pub use layer::{AdminPanelLayer, AdminPanelService};
pub use router::{panel_router, system_router};
pub use session::{BackendUserProvider, SessionStore, USER_COOKIE, USER_HEADER};
pub use state::{PanelState, PanelStateBuilder, PanelStateError, PanelStateErrorExt, PanelStateInner};
