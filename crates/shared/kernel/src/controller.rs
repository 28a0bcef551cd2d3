//! The three-phase lifecycle driver.
//!
//! 1. [`MainController::initialize`] builds the module tree for the request and lets
//!    enrichers rewrite the request before the page is rendered.
//! 2. [`MainController::store_data`] captures module data after rendering and stores it
//!    under the request id.
//! 3. [`MainController::render`] reads the captured data back and renders the overlay.
//!
//! Enrich and capture visit the tree in pre-order and skip configurable modules that
//! are not enabled. The first module failure aborts the phase. Captured data is keyed
//! by [`module_path`], so equal identifiers under different parents stay apart.

use crate::error::{PanelError, PanelErrorExt};
use crate::loader::{ModuleContext, ModuleKind, ModuleLoader};
use crate::markup::PanelView;
use crate::module::{Module, ModuleDataStorageCollection, module_path};
use crate::request::PanelRequest;
use crate::resources::Resources;
use crate::user_state;
use apanel_domain::config::PanelSettings;
use apanel_domain::modules::ModuleConfiguration;
use apanel_request_cache::RequestCache;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
pub struct MainControllerInner {
    loader: ModuleLoader,
    modules: ModuleConfiguration,
    cache: RequestCache,
    settings: PanelSettings,
}

impl MainControllerInner {
    #[must_use]
    pub const fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    #[must_use]
    pub const fn modules(&self) -> &ModuleConfiguration {
        &self.modules
    }

    #[must_use]
    pub const fn cache(&self) -> &RequestCache {
        &self.cache
    }

    #[must_use]
    pub const fn settings(&self) -> &PanelSettings {
        &self.settings
    }
}

/// Long-lived, shareable controller. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct MainController {
    inner: Arc<MainControllerInner>,
}

impl Deref for MainController {
    type Target = MainControllerInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl MainController {
    #[must_use]
    pub fn new(
        loader: ModuleLoader,
        modules: ModuleConfiguration,
        cache: RequestCache,
        settings: PanelSettings,
    ) -> Self {
        Self { inner: Arc::new(MainControllerInner { loader, modules, cache, settings }) }
    }

    /// Phase 1: loads the module tree into the request and, if the panel is activated
    /// for the user, runs every enabled enricher.
    ///
    /// # Errors
    /// Returns [`PanelError::Loader`] for invalid module configuration and
    /// [`PanelError::Module`] for the first failing enricher.
    #[instrument(skip_all, fields(request_id = %request.id().id))]
    pub fn initialize(&self, request: PanelRequest) -> Result<PanelRequest, PanelError> {
        let context = ModuleContext::new(request.shared_user());
        let modules = self
            .loader
            .validate_sort_and_initialize(&self.modules, ModuleKind::Main, &context)
            .context("Loading main modules")?;

        let mut request = request.with_modules(modules);
        if user_state::is_activated_for_user(request.user()) {
            let modules = request.shared_modules();
            request = enrich(&modules, request)?;
        }

        debug!(modules = request.modules().len(), "Admin panel initialized");
        Ok(request)
    }

    /// Phase 2: captures module data and stores it under the request id.
    ///
    /// Does nothing unless the panel is open; returns whether data was stored.
    /// Expired entries of earlier requests are swept afterwards.
    ///
    /// # Errors
    /// Returns [`PanelError::Module`] for the first failing data provider and
    /// [`PanelError::Cache`] if the collection cannot be stored.
    #[instrument(skip_all, fields(request_id = %request.id().id))]
    pub async fn store_data(&self, request: &PanelRequest) -> Result<bool, PanelError> {
        if !user_state::is_open(request.user()) {
            return Ok(false);
        }

        let data = collect(request.modules(), None, request, ModuleDataStorageCollection::new())?;
        self.cache
            .set(request.id().id.as_str(), &data)
            .await
            .context("Storing module data")?;
        debug!(entries = data.len(), "Module data stored");

        match self.cache.collect_garbage().await {
            Ok(Some(report)) => debug!(removed = report.removed, remaining = report.remaining, "Request cache swept"),
            Ok(None) => {},
            Err(e) => warn!(error = %e, "Request cache garbage collection failed"),
        }
        Ok(true)
    }

    /// Phase 3: renders the overlay markup for the request.
    ///
    /// A closed panel renders the toggle only. An open panel reads the data captured
    /// under the request id; a missing entry renders as an empty collection.
    ///
    /// # Errors
    /// Returns [`PanelError::Cache`] if a stored entry cannot be read.
    #[instrument(skip_all, fields(request_id = %request.id().id))]
    pub async fn render(&self, request: &PanelRequest) -> Result<String, PanelError> {
        let open = user_state::is_open(request.user());
        let id = request.id();

        let data: ModuleDataStorageCollection = if open {
            self.cache.get(id.id.as_str()).await.context("Reading module data")?.unwrap_or_default()
        } else {
            ModuleDataStorageCollection::new()
        };

        let view = PanelView {
            request_id: &id.id,
            nonce: &id.nonce,
            toggle_url: self.settings.route("toggle"),
            save_url: self.settings.route("save"),
            open,
            core_resources: Resources::core(&self.settings),
            module_resources: if open { Resources::for_modules(request.modules()) } else { Resources::default() },
            modules: request.modules(),
            data: &data,
            backend_link: request.page().map(|page| self.settings.page_link(page.id)),
        };

        Ok(view.render())
    }
}

fn enrich(modules: &[Box<dyn Module>], mut request: PanelRequest) -> Result<PanelRequest, PanelError> {
    for module in modules {
        if let Some(enricher) = module.as_enricher()
            && module.is_active()
        {
            request = enricher.enrich(request).context(format!("Enriching '{}'", module.identifier()))?;
        }
        if let Some(provider) = module.as_submodule_provider() {
            request = enrich(provider.submodules(), request)?;
        }
    }
    Ok(request)
}

fn collect(
    modules: &[Box<dyn Module>],
    parent: Option<&str>,
    request: &PanelRequest,
    data: ModuleDataStorageCollection,
) -> Result<ModuleDataStorageCollection, PanelError> {
    modules.iter().try_fold(data, |mut data, module| {
        let path = module_path(parent, module.identifier());
        if let Some(provider) = module.as_data_provider()
            && module.is_active()
        {
            let captured = provider.data_to_store(request).context(format!("Capturing '{path}'"))?;
            data.add_module_data(path.as_str(), captured);
        }
        match module.as_submodule_provider() {
            Some(provider) => collect(provider.submodules(), Some(&path), request, data),
            None => Ok(data),
        }
    })
}
