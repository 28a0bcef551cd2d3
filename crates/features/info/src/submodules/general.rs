use crate::format::{format_duration, format_size};
use apanel_kernel::domain::constants::INFO_GENERAL;
use apanel_kernel::prelude::*;
use std::time::Duration;

pub const CLASS: &str = "apanel.submodule.info_general";

/// Facts about the rendered page and the simulation state it was rendered under.
#[derive(Debug, Default)]
pub struct GeneralInformation;

impl RegisterModule for GeneralInformation {
    const CLASS: &'static str = CLASS;

    fn create(_: &ModuleContext) -> Self {
        Self
    }
}

impl Module for GeneralInformation {
    fn identifier(&self) -> &str {
        INFO_GENERAL
    }

    fn label(&self) -> &str {
        "General"
    }

    fn as_sub(&self) -> Option<&dyn Submodule> {
        Some(self)
    }

    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        Some(self)
    }

    fn as_content_provider(&self) -> Option<&dyn ContentProvider> {
        Some(self)
    }
}

impl Submodule for GeneralInformation {}

impl DataProvider for GeneralInformation {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        let context = request.context();
        let page = request.page().copied().unwrap_or(PageContext::new(0));

        let mut data = ModuleData::new()
            .with("pageId", page.id)
            .with("pageType", page.page_type)
            .with("noCache", context.no_cache)
            .with("preview", context.preview)
            .with("showHiddenPages", context.show_hidden_pages)
            .with("showHiddenRecords", context.show_hidden_records)
            .with("backendUser", request.user().map(|user| user.username.clone()).unwrap_or_default());

        data.insert("userGroup", &context.simulated_user_group)?;
        data.insert("simulatedTime", &context.simulated_time.map(|time| time.to_rfc3339()))?;

        if let Some(response) = request.response() {
            data = data
                .with("status", response.status)
                .with("documentSize", u64::try_from(response.body_size).unwrap_or(u64::MAX))
                .with("totalParsetime", u64::try_from(response.elapsed.as_millis()).unwrap_or(u64::MAX));
        }
        Ok(data)
    }
}

impl ContentProvider for GeneralInformation {
    fn content(&self, data: &ModuleData) -> String {
        let yes_no = |key: &str| String::from(if data.get_bool(key).unwrap_or(false) { "yes" } else { "no" });
        let number = |key: &str| data.get_u64(key).map_or_else(|| "-".to_owned(), |value| value.to_string());

        let mut rows = vec![
            ("Page id", number("pageId")),
            ("Page type", number("pageType")),
            ("Status", number("status")),
            ("Document size", data.get_u64("documentSize").map_or_else(|| "-".to_owned(), format_size)),
            (
                "Render time",
                data.get_u64("totalParsetime")
                    .map_or_else(|| "-".to_owned(), |ms| format_duration(Duration::from_millis(ms))),
            ),
            ("Cache bypassed", yes_no("noCache")),
            ("Preview", yes_no("preview")),
            ("Hidden pages", yes_no("showHiddenPages")),
            ("Hidden records", yes_no("showHiddenRecords")),
        ];
        if let Some(time) = data.get_str("simulatedTime") {
            rows.push(("Simulated time", time.to_owned()));
        }
        if let Some(group) = data.get_u64("userGroup") {
            rows.push(("Simulated user group", group.to_string()));
        }
        rows.push(("Backend user", data.get_str("backendUser").unwrap_or_default().to_owned()));

        markup::definition_list(rows)
    }
}
