//! Well-known identifiers shared by the kernel, the built-in modules and the host.

// Built-in module identifiers
pub const PREVIEW: &str = "preview";
pub const CACHE: &str = "cache";
pub const INFO: &str = "info";
pub const INFO_GENERAL: &str = "info_general";
pub const INFO_REQUEST: &str = "info_request";

/// Catch-all key of the `enable` TS-config table.
pub const ENABLE_ALL: &str = "all";

/// Prefix of the per-module "panel is expanded" user setting (`display_<id>`).
pub const DISPLAY_PREFIX: &str = "display_";

// OpenAPI tags
pub const SYSTEM_TAG: &str = "System";
pub const PANEL_TAG: &str = "AdminPanel";
