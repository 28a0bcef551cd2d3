//! The module API.
//!
//! Every panel module implements [`Module`]. Optional behaviour is exposed through
//! capability facets: a module opts into a phase by returning `Some(self)` from the
//! matching `as_*` accessor. The controller dispatches on those accessors only, never
//! on concrete types.
//!
//! ```rust
//! use apanel_kernel::prelude::*;
//!
//! #[derive(Debug)]
//! struct Stopwatch;
//!
//! impl Module for Stopwatch {
//!     fn identifier(&self) -> &str { "stopwatch" }
//!     fn label(&self) -> &str { "Stopwatch" }
//!     fn as_sub(&self) -> Option<&dyn Submodule> { Some(self) }
//!     fn as_data_provider(&self) -> Option<&dyn DataProvider> { Some(self) }
//! }
//!
//! impl Submodule for Stopwatch {}
//!
//! impl DataProvider for Stopwatch {
//!     fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
//!         Ok(ModuleData::new().with("path", request.uri().path()))
//!     }
//! }
//!
//! assert!(Stopwatch.capabilities().contains(Capabilities::SUB | Capabilities::DATA_PROVIDER));
//! ```

mod data;
mod error;
mod state;

pub use data::{ModuleData, ModuleDataStorageCollection, module_path};
pub use error::{ModuleError, ModuleErrorExt};
pub use state::ModuleState;

use crate::request::PanelRequest;
use apanel_domain::capabilities::Capabilities;
use std::fmt::Debug;

/// An ordered list of module instances (one level of the module tree).
pub type ModuleList = Vec<Box<dyn Module>>;

/// Base contract of every panel module.
pub trait Module: Debug + Send + Sync {
    /// Unique, stable identifier within the sibling scope.
    fn identifier(&self) -> &str;

    /// Human readable label.
    fn label(&self) -> &str;

    fn as_main(&self) -> Option<&dyn MainModule> {
        None
    }

    fn as_sub(&self) -> Option<&dyn Submodule> {
        None
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        None
    }

    fn as_enricher(&self) -> Option<&dyn RequestEnricher> {
        None
    }

    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        None
    }

    fn as_settings_provider(&self) -> Option<&dyn PageSettingsProvider> {
        None
    }

    fn as_short_info_provider(&self) -> Option<&dyn ShortInfoProvider> {
        None
    }

    fn as_resource_provider(&self) -> Option<&dyn ResourceProvider> {
        None
    }

    fn as_submodule_provider(&self) -> Option<&dyn SubmoduleProvider> {
        None
    }

    fn as_submodule_provider_mut(&mut self) -> Option<&mut dyn SubmoduleProvider> {
        None
    }

    fn as_content_provider(&self) -> Option<&dyn ContentProvider> {
        None
    }

    /// The facets this module exposes.
    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::MAIN, self.as_main().is_some());
        caps.set(Capabilities::SUB, self.as_sub().is_some());
        caps.set(Capabilities::CONFIGURABLE, self.as_configurable().is_some());
        caps.set(Capabilities::ENRICHER, self.as_enricher().is_some());
        caps.set(Capabilities::DATA_PROVIDER, self.as_data_provider().is_some());
        caps.set(Capabilities::SETTINGS_PROVIDER, self.as_settings_provider().is_some());
        caps.set(Capabilities::SHORT_INFO_PROVIDER, self.as_short_info_provider().is_some());
        caps.set(Capabilities::RESOURCE_PROVIDER, self.as_resource_provider().is_some());
        caps.set(Capabilities::SUBMODULE_PROVIDER, self.as_submodule_provider().is_some());
        caps.set(Capabilities::CONTENT_PROVIDER, self.as_content_provider().is_some());
        caps
    }

    /// Whether the module takes part in enablement-gated phases right now.
    ///
    /// Non-configurable modules always act.
    fn is_active(&self) -> bool {
        !self.capabilities().is_gated() || self.as_configurable().is_some_and(|module| module.is_enabled())
    }
}

/// A top-level panel module (one tab of the overlay).
pub trait MainModule: Send + Sync {
    fn icon_identifier(&self) -> &str;

    /// Per-user state of this module.
    fn state(&self) -> &ModuleState;

    /// The module's pane is expanded (`display_<id>`).
    fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// The module is switched on in the user's panel configuration.
    fn is_shown(&self) -> bool {
        self.state().is_shown()
    }
}

/// Marker for modules that only live below a [`SubmoduleProvider`].
pub trait Submodule: Send + Sync {}

pub trait Configurable: Send + Sync {
    fn is_enabled(&self) -> bool;
}

/// Phase 1: mutates the request before the page is rendered.
pub trait RequestEnricher: Send + Sync {
    /// Returns the request the downstream handler should see.
    ///
    /// # Errors
    /// Any error aborts the enrich phase.
    fn enrich(&self, request: PanelRequest) -> Result<PanelRequest, ModuleError>;
}

/// Phase 2: reports what this module observed during rendering.
pub trait DataProvider: Send + Sync {
    /// # Errors
    /// Any error aborts the capture phase.
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError>;
}

/// Phase 3: contributes form markup to the settings pane.
pub trait PageSettingsProvider: Send + Sync {
    fn page_settings(&self) -> String;
}

/// A one-line status shown next to the module label.
pub trait ShortInfoProvider: Send + Sync {
    fn short_info(&self, data: &ModuleDataStorageCollection) -> String;
}

/// Script and stylesheet references the module needs in the page.
pub trait ResourceProvider: Send + Sync {
    fn javascript_files(&self) -> Vec<String> {
        Vec::new()
    }

    fn css_files(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Owner of an ordered list of child modules.
pub trait SubmoduleProvider: Send + Sync {
    fn submodules(&self) -> &[Box<dyn Module>];

    fn set_submodules(&mut self, submodules: ModuleList);
}

/// Renders the captured data of the module into its pane.
pub trait ContentProvider: Send + Sync {
    fn content(&self, data: &ModuleData) -> String;
}
