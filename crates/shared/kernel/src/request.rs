//! The request as the panel sees it, plus the request-scoped context modules write.
//!
//! Nothing here is global: simulated time, visibility and cache bypass live in a
//! [`RequestContext`] that travels with the request, and the module tree built for
//! the request travels alongside it.

use crate::module::{Module, ModuleList};
use crate::safe_nanoid;
use apanel_domain::user::BackendUser;
use axum::http::{HeaderMap, Method, Uri};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const NONCE_LENGTH: usize = 22;

/// Per-request identifier (cache key of the captured data) and CSP nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestId {
    pub id: String,
    pub nonce: String,
}

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self { id: safe_nanoid!(), nonce: safe_nanoid!(NONCE_LENGTH) }
    }

    /// A fixed id, e.g. when the host already assigned one.
    #[must_use]
    pub fn new(id: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self { id: id.into(), nonce: nonce.into() }
    }
}

/// Rendering behaviour requested through the panel for this request only.
///
/// The host reads it from the request extensions when it renders the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// The instant the page should be rendered for.
    pub access_time: DateTime<Utc>,
    /// Set when a date is simulated; `access_time` follows it.
    pub simulated_time: Option<DateTime<Utc>>,
    pub show_hidden_pages: bool,
    pub show_hidden_records: bool,
    /// Frontend user group to render the page for.
    pub simulated_user_group: Option<u32>,
    /// The page differs from what visitors see.
    pub preview: bool,
    /// Bypass page caches.
    pub no_cache: bool,
    /// Annotate template output with debug information.
    pub template_debug: bool,
}

impl RequestContext {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            access_time: now,
            simulated_time: None,
            show_hidden_pages: false,
            show_hidden_records: false,
            simulated_user_group: None,
            preview: false,
            no_cache: false,
            template_debug: false,
        }
    }

    /// Whether anything visitors would not see is simulated.
    #[must_use]
    pub const fn simulates_anything(&self) -> bool {
        self.simulated_time.is_some()
            || self.show_hidden_pages
            || self.show_hidden_records
            || self.simulated_user_group.is_some()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// Page the host rendered, published through the response extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub id: u64,
    pub page_type: u32,
}

impl PageContext {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self { id, page_type: 0 }
    }
}

/// What the downstream handler produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSummary {
    pub status: u16,
    pub content_type: Option<String>,
    pub body_size: usize,
    pub elapsed: Duration,
}

/// A request travelling through the three panel phases.
///
/// Enrichers consume and return it; the module tree is shared behind an `Arc` so a
/// phase can walk the tree while handing the request from module to module.
#[derive(Debug, Clone)]
pub struct PanelRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    id: RequestId,
    user: Option<Arc<BackendUser>>,
    context: RequestContext,
    page: Option<PageContext>,
    response: Option<ResponseSummary>,
    modules: Arc<ModuleList>,
}

impl PanelRequest {
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            id: RequestId::generate(),
            user: None,
            context: RequestContext::default(),
            page: None,
            response: None,
            modules: Arc::default(),
        }
    }

    /// A `GET` request for `uri` without headers (tests and tooling).
    #[must_use]
    pub fn get(uri: &'static str) -> Self {
        Self::new(Method::GET, Uri::from_static(uri), HeaderMap::new())
    }

    #[must_use]
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: Option<Arc<BackendUser>>) -> Self {
        self.user = user;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: Option<PageContext>) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: ResponseSummary) -> Self {
        self.response = Some(response);
        self
    }

    #[must_use]
    pub fn with_modules(mut self, modules: ModuleList) -> Self {
        self.modules = Arc::new(modules);
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    #[must_use]
    pub fn user(&self) -> Option<&BackendUser> {
        self.user.as_deref()
    }

    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    pub const fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.context
    }

    #[must_use]
    pub const fn page(&self) -> Option<&PageContext> {
        self.page.as_ref()
    }

    #[must_use]
    pub const fn response(&self) -> Option<&ResponseSummary> {
        self.response.as_ref()
    }

    /// The module tree loaded for this request.
    #[must_use]
    pub fn modules(&self) -> &[Box<dyn Module>] {
        &self.modules
    }

    pub(crate) fn shared_user(&self) -> Option<Arc<BackendUser>> {
        self.user.clone()
    }

    pub(crate) fn shared_modules(&self) -> Arc<ModuleList> {
        Arc::clone(&self.modules)
    }
}
