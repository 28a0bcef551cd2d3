use apanel_kernel::domain::constants::INFO_REQUEST;
use apanel_kernel::prelude::*;

pub const CLASS: &str = "apanel.submodule.info_request";

/// The incoming request as the host saw it. Header values are never captured.
#[derive(Debug, Default)]
pub struct RequestInformation;

impl RegisterModule for RequestInformation {
    const CLASS: &'static str = CLASS;

    fn create(_: &ModuleContext) -> Self {
        Self
    }
}

impl Module for RequestInformation {
    fn identifier(&self) -> &str {
        INFO_REQUEST
    }

    fn label(&self) -> &str {
        "Request"
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

impl Submodule for RequestInformation {}

impl DataProvider for RequestInformation {
    fn data_to_store(&self, request: &PanelRequest) -> Result<ModuleData, ModuleError> {
        let mut headers: Vec<String> = request.headers().keys().map(|name| name.as_str().to_owned()).collect();
        headers.sort_unstable();
        headers.dedup();

        Ok(ModuleData::new()
            .with("requestId", request.id().id.clone())
            .with("method", request.method().as_str())
            .with("path", request.uri().path())
            .with("query", request.uri().query().unwrap_or_default())
            .with("headers", headers))
    }
}

impl ContentProvider for RequestInformation {
    fn content(&self, data: &ModuleData) -> String {
        let field = |key: &str| data.get_str(key).unwrap_or_default().to_owned();
        let headers = data
            .get("headers")
            .and_then(|value| value.as_array())
            .map(|names| names.iter().filter_map(|name| name.as_str()).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();

        markup::definition_list([
            ("Request id", field("requestId")),
            ("Method", field("method")),
            ("Path", field("path")),
            ("Query", field("query")),
            ("Headers", headers),
        ])
    }
}
