//! Preview module.
//!
//! Lets a backend user look at the page the way it will be rendered at another point
//! in time, with hidden pages or records visible, or as a member of a frontend user
//! group. All of it lands in the request's [`RequestContext`]; nothing outlives the
//! request.
//!
//! Options (stored as `preview_<option>` or forced via `override.preview.<option>`):
//! `showHiddenPages`, `showHiddenRecords`, `simulateDate`, `simulateUserGroup`,
//! `showTemplateDebug`.

mod date;

pub use date::parse_date;

use apanel_kernel::domain::constants::PREVIEW;
use apanel_kernel::domain::user::is_truthy;
use apanel_kernel::prelude::*;
use chrono::{DateTime, Utc};
use tracing::debug;

pub const CLASS: &str = "apanel.module.preview";

const SCRIPT: &str = "/_adminpanel/assets/modules/preview.js";

/// Resolved preview options for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    pub show_hidden_pages: bool,
    pub show_hidden_records: bool,
    pub simulate_date: String,
    pub simulate_user_group: u32,
    pub show_template_debug: bool,
}

impl PreviewOptions {
    #[must_use]
    pub fn from_state(state: &ModuleState) -> Self {
        Self {
            show_hidden_pages: is_truthy(&state.configuration_option("showHiddenPages")),
            show_hidden_records: is_truthy(&state.configuration_option("showHiddenRecords")),
            simulate_date: state.configuration_option("simulateDate").trim().to_owned(),
            simulate_user_group: state.configuration_option("simulateUserGroup").trim().parse().unwrap_or(0),
            show_template_debug: is_truthy(&state.configuration_option("showTemplateDebug")),
        }
    }

    /// Writes the options into `context`, replacing earlier preview settings.
    ///
    /// The preview flag stays set only if something is actually simulated.
    pub fn apply(&self, context: &mut RequestContext) {
        context.simulated_time = None;
        context.show_hidden_pages = self.show_hidden_pages;
        context.show_hidden_records = self.show_hidden_records;
        context.simulated_user_group = (self.simulate_user_group != 0).then_some(self.simulate_user_group);

        if let Some(simulated) = parse_date(&self.simulate_date) {
            context.simulated_time = Some(simulated);
            context.access_time = round_to_minute(simulated);
        }

        if self.show_template_debug {
            context.template_debug = true;
            context.no_cache = true;
        }

        context.preview = context.simulates_anything();
    }
}

fn round_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = time.timestamp();
    DateTime::from_timestamp(seconds - seconds.rem_euclid(60), 0).unwrap_or(time)
}

#[derive(Debug)]
pub struct PreviewModule {
    state: ModuleState,
}

impl PreviewModule {
    #[must_use]
    pub fn options(&self) -> PreviewOptions {
        PreviewOptions::from_state(&self.state)
    }
}

impl RegisterModule for PreviewModule {
    const CLASS: &'static str = CLASS;

    fn create(context: &ModuleContext) -> Self {
        Self { state: context.state(PREVIEW) }
    }
}

impl Module for PreviewModule {
    fn identifier(&self) -> &str {
        PREVIEW
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

    fn as_settings_provider(&self) -> Option<&dyn PageSettingsProvider> {
        Some(self)
    }

    fn as_resource_provider(&self) -> Option<&dyn ResourceProvider> {
        Some(self)
    }
}

impl MainModule for PreviewModule {
    fn icon_identifier(&self) -> &str {
        "actions-preview"
    }

    fn state(&self) -> &ModuleState {
        &self.state
    }
}

impl Configurable for PreviewModule {
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl RequestEnricher for PreviewModule {
    fn enrich(&self, mut request: PanelRequest) -> Result<PanelRequest, ModuleError> {
        let options = self.options();
        options.apply(request.context_mut());
        debug!(?options, preview = request.context().preview, "Preview applied");
        Ok(request)
    }
}

impl PageSettingsProvider for PreviewModule {
    fn page_settings(&self) -> String {
        let options = self.options();
        let group = match options.simulate_user_group {
            0 => String::new(),
            group => group.to_string(),
        };

        [
            markup::checkbox(PREVIEW, "showHiddenPages", "Show hidden pages", options.show_hidden_pages),
            markup::checkbox(PREVIEW, "showHiddenRecords", "Show hidden records", options.show_hidden_records),
            markup::text_input(PREVIEW, "simulateDate", "Simulate date", &options.simulate_date),
            markup::text_input(PREVIEW, "simulateUserGroup", "Simulate frontend user group", &group),
            markup::checkbox(PREVIEW, "showTemplateDebug", "Show template debug output", options.show_template_debug),
        ]
        .concat()
    }
}

impl ResourceProvider for PreviewModule {
    fn javascript_files(&self) -> Vec<String> {
        vec![SCRIPT.to_owned()]
    }
}
