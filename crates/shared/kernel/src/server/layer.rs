//! Tower middleware running the panel phases around a page handler.
//!
//! Per request:
//! 1. resolve the backend user and run `initialize`; the resulting
//!    [`RequestContext`] and [`RequestId`] are inserted into the request extensions,
//! 2. call the inner service,
//! 3. for HTML responses of an activated user: record a [`ResponseSummary`], pick up
//!    the [`PageContext`] the handler published, capture module data and, when the
//!    overlay is rendered for this user and site, splice it in front of `</body>`.
//!
//! Any panel failure is logged and the response passes through untouched. So do pages
//! larger than `max_body_bytes`.

use super::state::PanelState;
use crate::markup::inject_before_body;
use crate::request::{PageContext, PanelRequest, RequestContext, RequestId, ResponseSummary};
use crate::user_state;
use axum::body::{Body, Bytes};
use axum::http::response::Parts;
use axum::http::{HeaderValue, Request, Response, header};
use futures_util::{StreamExt, stream};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{debug, warn};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Wraps page handlers with the admin panel.
#[derive(Debug, Clone)]
pub struct AdminPanelLayer {
    state: PanelState,
}

impl AdminPanelLayer {
    #[must_use]
    pub const fn new(state: PanelState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AdminPanelLayer {
    type Service = AdminPanelService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminPanelService { inner, state: self.state.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct AdminPanelService<S> {
    inner: S,
    state: PanelState,
}

impl<S> Service<Request<Body>> for AdminPanelService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // The clone is not ready; keep the polled service for this call.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let state = self.state.clone();
        Box::pin(process(state, inner, request))
    }
}

async fn process<S>(state: PanelState, mut inner: S, mut request: Request<Body>) -> Result<Response<Body>, S::Error>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    let started = Instant::now();
    let user = state.users.resolve(request.headers());
    let panel_request =
        PanelRequest::new(request.method().clone(), request.uri().clone(), request.headers().clone())
            .with_user(user);

    let panel_request = match state.controller.initialize(panel_request) {
        Ok(panel_request) => panel_request,
        Err(e) => {
            warn!(error = %e, code = ?e.loader_code(), "Admin panel unavailable for this request");
            return inner.call(request).await;
        },
    };

    request.extensions_mut().insert::<RequestContext>(panel_request.context().clone());
    request.extensions_mut().insert::<RequestId>(panel_request.id().clone());

    let response = inner.call(request).await?;
    if !is_html(&response) || !user_state::is_activated_for_user(panel_request.user()) {
        return Ok(response);
    }

    let limit = state.settings().max_body_bytes;
    let (mut parts, body) = response.into_parts();
    if declared_length(&parts).is_some_and(|length| length > limit) {
        debug!(limit, "Page body exceeds the admin panel limit");
        return Ok(Response::from_parts(parts, body));
    }

    let bytes = match buffer(body, limit).await {
        Ok(Buffered::Complete(bytes)) => bytes,
        Ok(Buffered::Oversized(body)) => {
            debug!(limit, "Page body exceeds the admin panel limit");
            return Ok(Response::from_parts(parts, body));
        },
        Err(e) => {
            warn!(error = %e, "Failed to buffer response body for the admin panel");
            return Ok(Response::from_parts(parts, Body::empty()));
        },
    };

    let summary = ResponseSummary {
        status: parts.status.as_u16(),
        content_type: content_type(&parts).map(str::to_owned),
        body_size: bytes.len(),
        elapsed: started.elapsed(),
    };
    let page = parts.extensions.get::<PageContext>().copied();
    let panel_request = panel_request.with_page(page).with_response(summary);

    if let Err(e) = state.controller.store_data(&panel_request).await {
        warn!(error = %e, request_id = %panel_request.id().id, "Admin panel data capture failed");
    }

    if !user_state::should_render(panel_request.user(), state.settings().enabled) {
        return Ok(Response::from_parts(parts, Body::from(bytes)));
    }

    let markup = match state.controller.render(&panel_request).await {
        Ok(markup) => markup,
        Err(e) => {
            warn!(error = %e, request_id = %panel_request.id().id, "Admin panel rendering failed");
            return Ok(Response::from_parts(parts, Body::from(bytes)));
        },
    };

    Ok(splice(parts, bytes, &markup))
}

enum Buffered {
    Complete(Bytes),
    /// Over the limit; replays the chunks read so far, then the rest of the body.
    Oversized(Body),
}

async fn buffer(body: Body, limit: usize) -> Result<Buffered, axum::Error> {
    let mut rest = body.into_data_stream();
    let mut chunks = Vec::new();
    let mut size = 0_usize;

    while let Some(chunk) = rest.next().await {
        let chunk = chunk?;
        size = size.saturating_add(chunk.len());
        chunks.push(chunk);
        if size > limit {
            let replay = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>)).chain(rest);
            return Ok(Buffered::Oversized(Body::from_stream(replay)));
        }
    }

    Ok(Buffered::Complete(match chunks.len() {
        1 => chunks.swap_remove(0),
        _ => Bytes::from(chunks.concat()),
    }))
}

fn declared_length(parts: &Parts) -> Option<usize> {
    parts.headers.get(header::CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

fn splice(mut parts: Parts, bytes: Bytes, markup: &str) -> Response<Body> {
    let Some(html) = std::str::from_utf8(&bytes).ok().and_then(|doc| inject_before_body(doc, markup))
    else {
        debug!("No closing body tag, admin panel not injected");
        return Response::from_parts(parts, Body::from(bytes));
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    Response::from_parts(parts, Body::from(html))
}

fn content_type(parts: &Parts) -> Option<&str> {
    parts.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

fn is_html(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
}
