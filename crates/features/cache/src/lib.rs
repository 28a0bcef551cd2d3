//! Cache module.
//!
//! With `cache_noCache` set, the request is marked as uncacheable before the page is
//! generated; the host is expected to honour [`RequestContext::no_cache`]. The captured
//! flag shows up in the pane, so the user can tell whether the page came out of a
//! cache.

use apanel_kernel::domain::constants::CACHE;
use apanel_kernel::domain::user::is_truthy;
use apanel_kernel::prelude::*;
use tracing::debug;

pub const CLASS: &str = "apanel.module.cache";

#[derive(Debug)]
pub struct CacheModule {
    state: ModuleState,
}

impl CacheModule {
    #[must_use]
    pub fn bypass_requested(&self) -> bool {
        is_truthy(&self.state.configuration_option("noCache"))
    }
}

impl RegisterModule for CacheModule {
    const CLASS: &'static str = CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state(CACHE) }
    }
}

impl Module for CacheModule {
    fn identifier(&self) -> &str {
        CACHE
    }

    fn label(&self) -> &str {
        "Cache"
    }

    fn as_main(&self) -> Option<&dyn MainModule> {
        Some(self)
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        Some(self)
    }

    fn as_enricher(&self) -> Option<&dyn RequestEnricher> {
        Some(self)
    }

    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }

    fn as_settings_provider(&self) -> Option<&dyn PageSettingsProvider> {
        Some(self)
    }

    fn as_content_provider(&self) -> Option<&dyn ContentProvider> {
        Some(self)
    }
}

impl MainModule for CacheModule {
    fn icon_identifier(&self) -> &str {
        "apps-toolbar-menu-cache"
    }

    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl Configurable for CacheModule {
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl RequestEnricher for CacheModule {
    fn enrich(&self, mut request: PanelRequest) -> Result<PanelRequest, ModuleError> {
        if self.bypass_requested() {
            debug!("Page cache bypassed");
            request.context_mut().no_cache = true;
        }
        Ok(request)
    }
}

impl DataProvider for CacheModule {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Ok(ModuleData::new()
            .with("noCache", request.context().no_cache)
            .with("requested", self.bypass_requested()))
    }
}

impl PageSettingsProvider for CacheModule {
    fn page_settings(&self) -> String {
        markup::checkbox(CACHE, "noCache", "Bypass the page cache", self.bypass_requested())
    }
}

impl ContentProvider for CacheModule {
    fn content(&self, data: &ModuleData) -> String {
        let flag = |key: &str| String::from(if data.get_bool(key).unwrap_or(false) { "yes" } else { "no" });
        markup::definition_list([("Cache bypassed", flag("noCache")), ("Requested by you", flag("requested"))])
    }
}
