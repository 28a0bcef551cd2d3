//! Backend-user state as exposed by the host's user/session subsystem.
//!
//! The panel never authenticates anyone; it only reads these values:
//! * `tsconfig` is the per-user panel configuration (`enable.<id>`, `enable.all`,
//!   `override.<id>`, `override.<id>.<option>`, `hide`).
//! * `settings` holds what the user chose in the panel itself (`display_top`,
//!   `display_<id>`, `<id>_<option>`).

use crate::constants::{DISPLAY_PREFIX, ENABLE_ALL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A logged-in backend user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendUser {
    pub username: String,
    pub language: Option<String>,
    pub tsconfig: PanelTsConfig,
    pub settings: UserSettings,
}

impl BackendUser {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_tsconfig(mut self, tsconfig: PanelTsConfig) -> Self {
        self.tsconfig = tsconfig;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: UserSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Per-user panel TS-config (`admPanel.` in the host's user configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelTsConfig {
    pub enable: BTreeMap<String, bool>,
    #[serde(rename = "override")]
    pub overrides: BTreeMap<String, ModuleOverride>,
    pub hide: bool,
}

impl PanelTsConfig {
    #[must_use]
    pub fn enable(mut self, identifier: impl Into<String>, enabled: bool) -> Self {
        self.enable.insert(identifier.into(), enabled);
        self
    }

    #[must_use]
    pub fn enable_all(self) -> Self {
        self.enable(ENABLE_ALL, true)
    }

    #[must_use]
    pub fn override_module(mut self, identifier: impl Into<String>, value: ModuleOverride) -> Self {
        self.overrides.insert(identifier.into(), value);
        self
    }

    #[must_use]
    pub const fn hidden(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    /// Whether any `enable.*` value (including the catch-all) is set.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.enable.values().any(|enabled| *enabled)
    }

    /// `enable.all` or `enable.<identifier>`.
    #[must_use]
    pub fn is_enabled(&self, identifier: &str) -> bool {
        self.enable.get(ENABLE_ALL).copied().unwrap_or(false)
            || self.enable.get(identifier).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn override_for(&self, identifier: &str) -> Option<&ModuleOverride> {
        self.overrides.get(identifier)
    }
}

/// `override.<id>` and `override.<id>.<option>` values.
///
/// An override forces module functionality on without showing the panel, e.g. to
/// display hidden records by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOverride {
    pub enabled: bool,
    pub options: BTreeMap<String, String>,
}

impl ModuleOverride {
    #[must_use]
    pub fn enabled() -> Self {
        Self { enabled: true, options: BTreeMap::new() }
    }

    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

/// Settings the user stored through the panel (the user's session configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// The whole panel is expanded.
    pub display_top: bool,
    pub values: BTreeMap<String, String>,
}

impl UserSettings {
    #[must_use]
    pub const fn open(mut self, open: bool) -> Self {
        self.display_top = open;
        self
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// `display_<identifier>` interpreted as a flag.
    #[must_use]
    pub fn is_displayed(&self, identifier: &str) -> bool {
        self.get(&format!("{DISPLAY_PREFIX}{identifier}")).is_some_and(is_truthy)
    }

    /// `<identifier>_<option>`, the way module forms store their values.
    #[must_use]
    pub fn module_option(&self, identifier: &str, option: &str) -> Option<&str> {
        self.get(&format!("{identifier}_{option}"))
    }
}

/// Interprets a stored setting as a flag (`"1"`, `"true"`, `"on"`, `"yes"`).
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}
