//! Facade crate for the admin panel.
//! Re-exports domain/kernel primitives and wires up the bundled modules.
//! Keep this crate thin: it should compose other crates, not implement panel logic.
//!
//! ## Usage
//! - Add `apanel` with the desired feature flags (`server` for the axum layer).
//! - Hand [`default_registry`] to the panel state; use [`default_modules`] when the
//!   configuration file has no `[modules]` section.

pub use apanel_domain as domain;
pub use apanel_kernel as kernel;
pub use apanel_request_cache as request_cache;

use apanel_domain::modules::ModuleConfiguration;
use apanel_kernel::loader::ModuleRegistry;

#[cfg(feature = "server")]
pub mod server {
    pub use apanel_kernel::server::*;
}

/// Bundled modules.
pub mod features {
    #[cfg(feature = "cache")]
    pub use apanel_cache as cache;
    #[cfg(feature = "info")]
    pub use apanel_info as info;
    #[cfg(feature = "preview")]
    pub use apanel_preview as preview;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "preview")]
        "preview",
        #[cfg(feature = "cache")]
        "cache",
        #[cfg(feature = "info")]
        "info",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Registry with every bundled module compiled into this build.
#[must_use]
pub fn default_registry() -> ModuleRegistry {
    let registry = ModuleRegistry::new();

    #[cfg(feature = "preview")]
    let registry = registry.register_main::<features::preview::PreviewModule>();

    #[cfg(feature = "cache")]
    let registry = registry.register_main::<features::cache::CacheModule>();

    #[cfg(feature = "info")]
    let registry = registry
        .register_main::<features::info::InfoModule>()
        .register_sub::<features::info::GeneralInformation>()
        .register_sub::<features::info::RequestInformation>();

    registry
}

/// Module configuration matching [`default_registry`]: preview, cache, then info with
/// its general and request panes.
#[must_use]
pub fn default_modules() -> ModuleConfiguration {
    let modules = ModuleConfiguration::new();

    #[cfg(feature = "preview")]
    let modules = {
        use apanel_domain::modules::ModuleConfigEntry;
        modules.with(domain::constants::PREVIEW, ModuleConfigEntry::new(features::preview::CLASS))
    };

    #[cfg(feature = "cache")]
    let modules = {
        use apanel_domain::modules::ModuleConfigEntry;
        modules.with(
            domain::constants::CACHE,
            ModuleConfigEntry::new(features::cache::CLASS).after([domain::constants::PREVIEW]),
        )
    };

    #[cfg(feature = "info")]
    let modules = {
        use apanel_domain::constants::{CACHE, INFO, INFO_GENERAL, INFO_REQUEST};
        use apanel_domain::modules::ModuleConfigEntry;
        use features::info;

        modules.with(
            INFO,
            ModuleConfigEntry::new(info::CLASS).after([CACHE]).submodules(
                ModuleConfiguration::new()
                    .with(INFO_GENERAL, ModuleConfigEntry::new(info::GENERAL_CLASS))
                    .with(INFO_REQUEST, ModuleConfigEntry::new(info::REQUEST_CLASS).after([INFO_GENERAL])),
            ),
        )
    };

    modules
}
