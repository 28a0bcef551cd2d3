//! Info module.
//!
//! A display parent without own data. What it shows comes from its submodules,
//! configured under `[modules.info.submodules]`:
//!
//! - [`GeneralInformation`] (`apanel.submodule.info_general`): page, response size,
//!   render time and the simulation state.
//! - [`RequestInformation`] (`apanel.submodule.info_request`): method, path, query and
//!   header names.

mod format;
mod submodules;

pub use format::{format_duration, format_size};
pub use submodules::{GENERAL_CLASS, GeneralInformation, REQUEST_CLASS, RequestInformation};

use apanel_kernel::domain::constants::{INFO, INFO_GENERAL};
use apanel_kernel::prelude::*;
use std::time::Duration;

pub const CLASS: &str = "apanel.module.info";

#[derive(Debug)]
pub struct InfoModule {
    state: ModuleState,
    submodules: ModuleList,
}

impl RegisterModule for InfoModule {
    const CLASS: &'static str = CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state(INFO), submodules: ModuleList::new() }
    }
}

impl Module for InfoModule {
    fn identifier(&self) -> &str {
        INFO
    }

    fn label(&self) -> &str {
        "Info"
    }

    fn as_main(&self) -> Option<&dyn MainModule> {
        Some(self)
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        Some(self)
    }

    fn as_short_info_provider(&self) -> Option<&dyn ShortInfoProvider> {
        Some(self)
    }

    fn as_submodule_provider(&self) -> Option<&dyn SubmoduleProvider> {
        Some(self)
    }

    fn as_submodule_provider_mut(&mut self) -> Option<&mut dyn SubmoduleProvider> {
        Some(self)
    }
}

impl MainModule for InfoModule {
    fn icon_identifier(&self) -> &str {
        "actions-document-info"
    }

    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl Configurable for InfoModule {
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl ShortInfoProvider for InfoModule {
    /// Render time and document size, taken from the general information capture.
    fn short_info(&self, data: &ModuleDataStorageCollection) -> String {
        let Some(general) = data.get(&module_path(Some(INFO), INFO_GENERAL)) else { return String::new() };

        let time = general.get_u64("totalParsetime").map(|ms| format_duration(Duration::from_millis(ms)));
        let size = general.get_u64("documentSize").map(format_size);
        match (time, size) {
            (Some(time), Some(size)) => format!("{time} / {size}"),
            (Some(one), None) | (None, Some(one)) => one,
            (None, None) => String::new(),
        }
    }
}

impl SubmoduleProvider for InfoModule {
    fn submodules(&self) -> &[Box<dyn Module>] {
        &self.submodules
    }

    fn set_submodules(&mut self, submodules: ModuleList) {
        self.submodules = submodules;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_info_from_general_data() {
        let module = InfoModule::create(&ModuleContext::default());
        let mut data = ModuleDataStorageCollection::new();
        assert_eq!(module.short_info(&data), "");

        data.add_module_data("info/info_general", ModuleData::new().with("documentSize", 2048_u64));
        assert_eq!(module.short_info(&data), "2.0 KB");

        data.add_module_data(
            "info/info_general",
            ModuleData::new().with("documentSize", 512_u64).with("totalParsetime", 15_u64),
        );
        assert_eq!(module.short_info(&data), "15 ms / 512 B");
    }

    #[test]
    fn short_info_ignores_general_data_of_other_parents() {
        let module = InfoModule::create(&ModuleContext::default());
        let mut data = ModuleDataStorageCollection::new();
        data.add_module_data(INFO_GENERAL, ModuleData::new().with("documentSize", 2048_u64));
        data.add_module_data("debug/info_general", ModuleData::new().with("totalParsetime", 9_u64));
        assert_eq!(module.short_info(&data), "");
    }

    #[test]
    fn is_a_display_parent() {
        let module = InfoModule::create(&ModuleContext::default());
        assert!(module.capabilities().contains(Capabilities::DISPLAY_PARENT));
        assert!(module.submodules().is_empty());
    }
}
