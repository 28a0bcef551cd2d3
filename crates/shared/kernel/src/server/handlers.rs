use super::state::PanelState;
use apanel_domain::constants::PANEL_TAG;
use axum::extract::State;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use utoipa::ToSchema;

const MAX_SETTING_KEY: usize = 128;

/// Panel toggle result
#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    /// Whether the panel is expanded now
    pub open: bool,
}

/// Saved settings result
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResponse {
    /// Number of stored settings
    pub saved: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub(super) struct ErrorResponse {
    error: String,
}

fn reject(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

/// Browser form posts return to the page they came from.
///
/// Only referers on this host are followed; anything else gets the JSON body.
fn respond<T: Serialize>(headers: &HeaderMap, body: T) -> Response {
    match same_site_referer(headers) {
        Some(path) => Redirect::to(&path).into_response(),
        None => Json(body).into_response(),
    }
}

/// A path on this site, never a scheme-relative (`//host`) reference.
fn local_path(path: &str) -> Option<&str> {
    (path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')).then_some(path)
}

/// The referring page as a local path, if it was served by the host in `Host`.
fn same_site_referer(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    if referer.starts_with('/') {
        return local_path(referer).map(str::to_owned);
    }

    let uri: Uri = referer.parse().ok()?;
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let same_host = matches!(uri.scheme_str(), Some("http" | "https"))
        && uri.authority().zip(host).is_some_and(|(authority, host)| authority.as_str().eq_ignore_ascii_case(host));
    if !same_host {
        debug!(referer, "Ignoring foreign referer");
        return None;
    }

    local_path(uri.path_and_query().map_or("/", PathAndQuery::as_str)).map(str::to_owned)
}

fn username(state: &PanelState, headers: &HeaderMap) -> Option<String> {
    state.users.resolve(headers).map(|user| user.username.clone())
}

/// Setting keys look like `display_top`, `display_<id>` or `<id>_<option>`.
fn is_valid_setting_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_SETTING_KEY
        && key.contains('_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[utoipa::path(
    post,
    path = "/toggle",
    responses(
        (status = OK, description = "Panel expanded or collapsed", body = ToggleResponse),
        (status = SEE_OTHER, description = "Redirect back to the referring page"),
        (status = UNAUTHORIZED, description = "No backend user", body = ErrorResponse),
    ),
    tag = PANEL_TAG,
)]
pub(super) async fn toggle_handler(State(state): State<PanelState>, headers: HeaderMap) -> Response {
    let Some(username) = username(&state, &headers) else {
        return reject(StatusCode::UNAUTHORIZED, "No backend user");
    };

    let mut open = false;
    state.users.update_settings(&username, &mut |settings| {
        settings.display_top = !settings.display_top;
        open = settings.display_top;
    });

    info!(%username, open, "Admin panel toggled");
    respond(&headers, ToggleResponse { open })
}

#[utoipa::path(
    post,
    path = "/save",
    request_body(content = BTreeMap<String, String>, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = OK, description = "Settings stored", body = SaveResponse),
        (status = SEE_OTHER, description = "Redirect back to the referring page"),
        (status = UNAUTHORIZED, description = "No backend user", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Malformed setting key", body = ErrorResponse),
    ),
    tag = PANEL_TAG,
)]
pub(super) async fn save_handler(
    State(state): State<PanelState>,
    headers: HeaderMap,
    Form(values): Form<BTreeMap<String, String>>,
) -> Response {
    let Some(username) = username(&state, &headers) else {
        return reject(StatusCode::UNAUTHORIZED, "No backend user");
    };

    if let Some(key) = values.keys().find(|key| !is_valid_setting_key(key)) {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, format!("Malformed setting key '{key}'"));
    }

    let saved = values.len();
    let mut values = Some(values);
    state.users.update_settings(&username, &mut |settings| {
        for (key, value) in values.take().into_iter().flatten() {
            if key == "display_top" {
                settings.display_top = apanel_domain::user::is_truthy(&value);
            } else {
                settings.set(key, value);
            }
        }
    });

    debug!(%username, saved, "Admin panel settings stored");
    respond(&headers, SaveResponse { saved })
}
