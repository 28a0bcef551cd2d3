#![allow(dead_code, unreachable_pub)]

use apanel_kernel::domain::config::PanelSettings;
use apanel_kernel::domain::modules::{ModuleConfigEntry, ModuleConfiguration};
use apanel_kernel::domain::user::{PanelTsConfig, UserSettings};
use apanel_kernel::controller::MainController;
use apanel_kernel::http::HeaderValue;
use apanel_kernel::prelude::*;
use apanel_request_cache::RequestCache;
use std::sync::Arc;

pub const PREVIEW_CLASS: &str = "test.preview";
pub const ALWAYS_CLASS: &str = "test.always";
pub const PARENT_CLASS: &str = "test.parent";
pub const CHILD_CLASS: &str = "test.child";
pub const FAILING_CLASS: &str = "test.failing";
pub const SERVICE_CLASS: &str = "test.service";

/// Enrichers append their identifier to this header, so a walk leaves a trail.
pub const TRACE_HEADER: &str = "x-trace";
pub const TRACE_PARENT_CLASSES: [&str; 2] = ["test.trace_a", "test.trace_b"];
pub const TRACE_CHILD_CLASSES: [&str; 2] = ["test.trace_x", "test.trace_y"];
const TRACE_PARENT_IDS: [&str; 2] = ["trace_a", "trace_b"];
const TRACE_CHILD_IDS: [&str; 2] = ["trace_x", "trace_y"];

/// Configurable main module that reveals hidden pages.
#[derive(Debug)]
pub struct Preview {
    state: ModuleState,
}

impl RegisterModule for Preview {
    const CLASS: &'static str = PREVIEW_CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state("preview") }
    }
}

impl Module for Preview {
    fn identifier(&self) -> &str {
        "preview"
    }
    fn label(&self) -> &str {
        "Preview"
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
    fn as_resource_provider(&self) -> Option<&dyn ResourceProvider> {
        Some(self)
    }
}

impl MainModule for Preview {
    fn icon_identifier(&self) -> &str {
        "actions-preview"
    }
    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl Configurable for Preview {
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl RequestEnricher for Preview {
    fn enrich(&self, mut request: PanelRequest) -> Result<PanelRequest, ModuleError> {
        request.context_mut().show_hidden_pages = true;
        Ok(request)
    }
}

impl DataProvider for Preview {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Ok(ModuleData::new().with("hiddenPages", request.context().show_hidden_pages))
    }
}

impl PageSettingsProvider for Preview {
    fn page_settings(&self) -> String {
        markup::checkbox("preview", "showHiddenPages", "Show hidden pages", false)
    }
}

impl ResourceProvider for Preview {
    fn javascript_files(&self) -> Vec<String> {
        vec!["/preview.js".to_owned()]
    }
}

/// Non-configurable main module; always takes part.
#[derive(Debug)]
pub struct Always {
    state: ModuleState,
}

impl RegisterModule for Always {
    const CLASS: &'static str = ALWAYS_CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state("always") }
    }
}

impl Module for Always {
    fn identifier(&self) -> &str {
        "always"
    }
    fn label(&self) -> &str {
        "Always"
    }
    fn as_main(&self) -> Option<&dyn MainModule> {
        Some(self)
    }
    fn as_enricher(&self) -> Option<&dyn RequestEnricher> {
        Some(self)
    }
    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }
}

impl MainModule for Always {
    fn icon_identifier(&self) -> &str {
        "actions-always"
    }
    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl RequestEnricher for Always {
    fn enrich(&self, mut request: PanelRequest) -> Result<PanelRequest, ModuleError> {
        request.context_mut().no_cache = true;
        Ok(request)
    }
}

impl DataProvider for Always {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Ok(ModuleData::new().with("path", request.uri().path()))
    }
}

/// Display parent with children.
#[derive(Debug)]
pub struct Parent {
    state: ModuleState,
    children: ModuleList,
}

impl RegisterModule for Parent {
    const CLASS: &'static str = PARENT_CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state("parent"), children: ModuleList::new() }
    }
}

impl Module for Parent {
    fn identifier(&self) -> &str {
        "parent"
    }
    fn label(&self) -> &str {
        "Parent"
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
    fn as_resource_provider(&self) -> Option<&dyn ResourceProvider> {
        Some(self)
    }
    fn as_submodule_provider(&self) -> Option<&dyn SubmoduleProvider> {
        Some(self)
    }
    fn as_submodule_provider_mut(&mut self) -> Option<&mut dyn SubmoduleProvider> {
        Some(self)
    }
}

impl MainModule for Parent {
    fn icon_identifier(&self) -> &str {
        "actions-parent"
    }
    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl Configurable for Parent {
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl ShortInfoProvider for Parent {
    fn short_info(&self, data: &ModuleDataStorageCollection) -> String {
        format!("{} captured", data.len())
    }
}

impl ResourceProvider for Parent {
    fn css_files(&self) -> Vec<String> {
        vec!["/parent.css".to_owned()]
    }
}

impl SubmoduleProvider for Parent {
    fn submodules(&self) -> &[Box<dyn Module>] {
        &self.children
    }
    fn set_submodules(&mut self, submodules: ModuleList) {
        self.children = submodules;
    }
}

/// Submodule reporting the simulated visibility.
#[derive(Debug)]
pub struct Child;

impl RegisterModule for Child {
    const CLASS: &'static str = CHILD_CLASS;

    fn create(_: &ModuleContext) -> Self {
        Self
    }
}

impl Module for Child {
    fn identifier(&self) -> &str {
        "child"
    }
    fn label(&self) -> &str {
        "Child"
    }
    fn as_sub(&self) -> Option<&dyn Submodule> {
        Some(self)
    }
    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }
    fn as_resource_provider(&self) -> Option<&dyn ResourceProvider> {
        Some(self)
    }
    fn as_content_provider(&self) -> Option<&dyn ContentProvider> {
        Some(self)
    }
}

impl Submodule for Child {}

impl DataProvider for Child {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Ok(ModuleData::new().with("noCache", request.context().no_cache))
    }
}

impl ResourceProvider for Child {
    fn javascript_files(&self) -> Vec<String> {
        vec!["/child.js".to_owned()]
    }
    fn css_files(&self) -> Vec<String> {
        vec!["/parent.css".to_owned()]
    }
}

impl ContentProvider for Child {
    fn content(&self, data: &ModuleData) -> String {
        markup::definition_list([("No cache", data.get_bool("noCache").unwrap_or(false).to_string())])
    }
}

/// Main module whose phases always fail.
#[derive(Debug)]
pub struct Failing {
    state: ModuleState,
}

impl RegisterModule for Failing {
    const CLASS: &'static str = FAILING_CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state("failing") }
    }
}

impl Module for Failing {
    fn identifier(&self) -> &str {
        "failing"
    }
    fn label(&self) -> &str {
        "Failing"
    }
    fn as_main(&self) -> Option<&dyn MainModule> {
        Some(self)
    }
    fn as_enricher(&self) -> Option<&dyn RequestEnricher> {
        Some(self)
    }
    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }
}

impl MainModule for Failing {
    fn icon_identifier(&self) -> &str {
        "actions-failing"
    }
    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl RequestEnricher for Failing {
    fn enrich(&self, _: PanelRequest) -> Result<PanelRequest, ModuleError> {
        Err(ModuleError::Enrich { message: "boom".into(), context: None })
    }
}

impl DataProvider for Failing {
    fn data_to_store(&self, _: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Err(ModuleError::Capture { message: "boom".into(), context: None })
    }
}

fn trail(request: &PanelRequest) -> &str {
    request.headers().get(TRACE_HEADER).and_then(|value| value.to_str().ok()).unwrap_or_default()
}

fn append_trail(mut request: PanelRequest, identifier: &str) -> Result<PanelRequest, ModuleError> {
    let trail = match trail(&request) {
        "" => identifier.to_owned(),
        earlier => format!("{earlier},{identifier}"),
    };
    let value = HeaderValue::from_str(&trail)
        .map_err(|e| ModuleError::Enrich { message: e.to_string().into(), context: None })?;
    request.headers_mut().insert(TRACE_HEADER, value);
    Ok(request)
}

/// Non-configurable parent that records when it is enriched and captured.
#[derive(Debug)]
pub struct TraceParent<const N: usize> {
    state: ModuleState,
    children: ModuleList,
}

impl<const N: usize> RegisterModule for TraceParent<N> {
    const CLASS: &'static str = TRACE_PARENT_CLASSES[N];

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state(TRACE_PARENT_IDS[N]), children: ModuleList::new() }
    }
}

impl<const N: usize> Module for TraceParent<N> {
    fn identifier(&self) -> &str {
        TRACE_PARENT_IDS[N]
    }
    fn label(&self) -> &str {
        "Trace"
    }
    fn as_main(&self) -> Option<&dyn MainModule> {
        Some(self)
    }
    fn as_enricher(&self) -> Option<&dyn RequestEnricher> {
        Some(self)
    }
    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }
    fn as_submodule_provider(&self) -> Option<&dyn SubmoduleProvider> {
        Some(self)
    }
    fn as_submodule_provider_mut(&mut self) -> Option<&mut dyn SubmoduleProvider> {
        Some(self)
    }
}

impl<const N: usize> MainModule for TraceParent<N> {
    fn icon_identifier(&self) -> &str {
        "actions-trace"
    }
    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl<const N: usize> RequestEnricher for TraceParent<N> {
    fn enrich(&self, request: PanelRequest) -> Result<PanelRequest, ModuleError> {
        append_trail(request, self.identifier())
    }
}

impl<const N: usize> DataProvider for TraceParent<N> {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Ok(ModuleData::new().with("trail", trail(request)))
    }
}

impl<const N: usize> SubmoduleProvider for TraceParent<N> {
    fn submodules(&self) -> &[Box<dyn Module>] {
        &self.children
    }
    fn set_submodules(&mut self, submodules: ModuleList) {
        self.children = submodules;
    }
}

/// Submodule counterpart of [`TraceParent`].
#[derive(Debug)]
pub struct TraceChild<const N: usize>;

impl<const N: usize> RegisterModule for TraceChild<N> {
    const CLASS: &'static str = TRACE_CHILD_CLASSES[N];

    fn create(_: &ModuleContext) -> Self {
        Self
    }
}

impl<const N: usize> Module for TraceChild<N> {
    fn identifier(&self) -> &str {
        TRACE_CHILD_IDS[N]
    }
    fn label(&self) -> &str {
        "Trace child"
    }
    fn as_sub(&self) -> Option<&dyn Submodule> {
        Some(self)
    }
    fn as_enricher(&self) -> Option<&dyn RequestEnricher> {
        Some(self)
    }
    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }
}

impl<const N: usize> Submodule for TraceChild<N> {}

impl<const N: usize> RequestEnricher for TraceChild<N> {
    fn enrich(&self, request: PanelRequest) -> Result<PanelRequest, ModuleError> {
        append_trail(request, self.identifier())
    }
}

impl<const N: usize> DataProvider for TraceChild<N> {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        Ok(ModuleData::new().with("trail", trail(request)))
    }
}

pub fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .register_main::<Preview>()
        .register_main::<Always>()
        .register_main::<Parent>()
        .register_main::<Failing>()
        .register_main::<TraceParent<0>>()
        .register_main::<TraceParent<1>>()
        .register_sub::<Child>()
        .register_sub::<TraceChild<0>>()
        .register_sub::<TraceChild<1>>()
        .register_service(SERVICE_CLASS)
}

pub fn modules() -> ModuleConfiguration {
    ModuleConfiguration::new()
        .with("preview", ModuleConfigEntry::new(PREVIEW_CLASS))
        .with("always", ModuleConfigEntry::new(ALWAYS_CLASS))
        .with(
            "parent",
            ModuleConfigEntry::new(PARENT_CLASS)
                .submodules(ModuleConfiguration::new().with("child", ModuleConfigEntry::new(CHILD_CLASS))),
        )
}

/// `trace_b` is listed first but ordered after `trace_a`. Inside `trace_a`, `trace_y`
/// is listed first but ordered after `trace_x`. Both parents own a `trace_x`.
pub fn trace_modules() -> ModuleConfiguration {
    ModuleConfiguration::new()
        .with(
            "trace_b",
            ModuleConfigEntry::new(TRACE_PARENT_CLASSES[1])
                .submodules(ModuleConfiguration::new().with("trace_x", ModuleConfigEntry::new(TRACE_CHILD_CLASSES[0]))),
        )
        .with(
            "trace_a",
            ModuleConfigEntry::new(TRACE_PARENT_CLASSES[0]).before(["trace_b"]).submodules(
                ModuleConfiguration::new()
                    .with("trace_y", ModuleConfigEntry::new(TRACE_CHILD_CLASSES[1]).after(["trace_x"]))
                    .with("trace_x", ModuleConfigEntry::new(TRACE_CHILD_CLASSES[0])),
            ),
        )
}

pub fn controller(modules: ModuleConfiguration) -> MainController {
    let cache = RequestCache::builder().memory().build();
    MainController::new(ModuleLoader::new(registry()), modules, cache, PanelSettings::default())
}

pub fn editor(tsconfig: PanelTsConfig, settings: UserSettings) -> Arc<BackendUser> {
    Arc::new(BackendUser::new("editor").with_tsconfig(tsconfig).with_settings(settings))
}

/// Activated for everything, panel expanded.
pub fn open_admin() -> Arc<BackendUser> {
    editor(PanelTsConfig::default().enable_all(), UserSettings::default().open(true))
}
