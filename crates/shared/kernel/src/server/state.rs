use super::session::{BackendUserProvider, SessionStore};
use crate::controller::MainController;
use crate::loader::{DependencyOrdering, DependencyOrderingService, ModuleLoader, ModuleRegistry};
use apanel_domain::config::{PanelConfig, PanelSettings};
use apanel_request_cache::{CacheError, RequestCache};
use axum::extract::FromRef;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[apanel_derive::panel_error]
pub enum PanelStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("State cache setup failed{}: {source}", format_context(.context))]
    Cache { source: CacheError, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct PanelStateInner {
    pub config: PanelConfig,
    pub controller: MainController,
    pub users: Arc<dyn BackendUserProvider>,
}

/// Shared state of the overlay middleware and the panel routes.
#[derive(Debug, Clone)]
pub struct PanelState {
    inner: Arc<PanelStateInner>,
}

impl PanelState {
    #[must_use]
    pub fn builder() -> PanelStateBuilder {
        PanelStateBuilder::default()
    }

    #[must_use]
    pub fn settings(&self) -> &PanelSettings {
        self.controller.settings()
    }
}

impl Deref for PanelState {
    type Target = PanelStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<PanelState> for PanelConfig {
    fn from_ref(state: &PanelState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<PanelState> for MainController {
    fn from_ref(state: &PanelState) -> Self {
        state.inner.controller.clone()
    }
}

#[derive(Debug, Default)]
pub struct PanelStateBuilder {
    config: Option<PanelConfig>,
    registry: Option<ModuleRegistry>,
    ordering: Option<Arc<dyn DependencyOrdering>>,
    cache: Option<RequestCache>,
    users: Option<Arc<dyn BackendUserProvider>>,
}

impl PanelStateBuilder {
    #[must_use]
    pub fn config(mut self, config: PanelConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the default topological ordering.
    #[must_use]
    pub fn ordering(mut self, ordering: impl DependencyOrdering + 'static) -> Self {
        self.ordering = Some(Arc::new(ordering));
        self
    }

    /// Uses an already connected cache instead of the `[cache]` section.
    #[must_use]
    pub fn cache(mut self, cache: RequestCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the configuration-seeded [`SessionStore`].
    #[must_use]
    pub fn users(mut self, users: impl BackendUserProvider + 'static) -> Self {
        self.users = Some(Arc::new(users));
        self
    }

    /// # Errors
    /// Returns [`PanelStateError::Validation`] if the configuration or the module
    /// registry is missing and [`PanelStateError::Cache`] if the configured cache
    /// backend cannot be prepared.
    pub async fn build(self) -> Result<PanelState, PanelStateError> {
        let config = self.config.ok_or_else(|| PanelStateError::Validation {
            message: "PanelConfig not provided".into(),
            context: None,
        })?;
        let registry = self.registry.ok_or_else(|| PanelStateError::Validation {
            message: "ModuleRegistry not provided".into(),
            context: None,
        })?;

        let cache = match self.cache {
            Some(cache) => cache,
            None => RequestCache::builder().from_config(&config.cache).await.context("Connecting request cache")?,
        };
        let users = self.users.unwrap_or_else(|| Arc::new(SessionStore::from_config(&config)));
        let ordering = self.ordering.unwrap_or_else(|| Arc::new(DependencyOrderingService));

        let loader = ModuleLoader::with_shared_ordering(registry, ordering);
        let controller = MainController::new(loader, config.modules.clone(), cache, config.panel.clone());

        Ok(PanelState { inner: Arc::new(PanelStateInner { config, controller, users }) })
    }
}
