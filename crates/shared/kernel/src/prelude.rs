//! Everything a module crate needs to implement and register panel modules.

pub use crate::error::{PanelError, PanelErrorExt};
pub use crate::loader::{ModuleContext, ModuleKind, ModuleLoader, ModuleRegistry, RegisterModule};
pub use crate::markup;
pub use crate::module::{
    Configurable, ContentProvider, DataProvider, MainModule, Module, ModuleData,
    ModuleDataStorageCollection, ModuleError, ModuleErrorExt, ModuleList, ModuleState,
    PageSettingsProvider, RequestEnricher, ResourceProvider, ShortInfoProvider, Submodule,
    SubmoduleProvider, module_path,
};
pub use crate::request::{PageContext, PanelRequest, RequestContext, RequestId, ResponseSummary};
pub use apanel_domain::capabilities::Capabilities;
pub use apanel_domain::constants;
pub use apanel_domain::user::BackendUser;
