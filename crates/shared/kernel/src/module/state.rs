use apanel_domain::user::BackendUser;
use std::sync::Arc;

/// Per-user state of one module, derived from the backend user's panel configuration
/// and the settings they stored through the panel.
///
/// Without a backend user every predicate is `false` and every option is empty.
#[derive(Debug, Clone)]
pub struct ModuleState {
    identifier: String,
    user: Option<Arc<BackendUser>>,
}

impl ModuleState {
    #[must_use]
    pub fn new(identifier: impl Into<String>, user: Option<Arc<BackendUser>>) -> Self {
        Self { identifier: identifier.into(), user }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn user(&self) -> Option<&BackendUser> {
        self.user.as_deref()
    }

    /// Enabled via `enable.all` / `enable.<id>`, or forced on by `override.<id>`.
    ///
    /// An override can switch a module on, never off.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        let Some(user) = self.user() else { return false };
        user.tsconfig.is_enabled(&self.identifier)
            || user.tsconfig.override_for(&self.identifier).is_some_and(|o| o.enabled)
    }

    /// Enabled via `enable.all` / `enable.<id>` (overrides do not show a module).
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.user().is_some_and(|user| user.tsconfig.is_enabled(&self.identifier))
    }

    /// The module's pane is expanded (`display_<id>`).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.user().is_some_and(|user| user.settings.is_displayed(&self.identifier))
    }

    /// Resolves a module option: `override.<id>.<option>` first, then the stored user
    /// setting `<id>_<option>`, otherwise an empty string.
    #[must_use]
    pub fn configuration_option(&self, option: &str) -> String {
        let Some(user) = self.user() else { return String::new() };

        user.tsconfig
            .override_for(&self.identifier)
            .and_then(|o| o.options.get(option))
            .map(String::as_str)
            .or_else(|| user.settings.module_option(&self.identifier, option))
            .unwrap_or_default()
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apanel_domain::user::{ModuleOverride, PanelTsConfig, UserSettings};

    fn state(user: BackendUser) -> ModuleState {
        ModuleState::new("preview", Some(Arc::new(user)))
    }

    #[test]
    fn anonymous_state_is_inert() {
        let state = ModuleState::new("preview", None);
        assert!(!state.is_enabled());
        assert!(!state.is_shown());
        assert!(!state.is_open());
        assert_eq!(state.configuration_option("simulateDate"), "");
    }

    #[test]
    fn catch_all_enables_and_shows() {
        let state = state(BackendUser::new("editor").with_tsconfig(PanelTsConfig::default().enable_all()));
        assert!(state.is_enabled());
        assert!(state.is_shown());
    }

    #[test]
    fn override_enables_without_showing() {
        let tsconfig = PanelTsConfig::default().override_module("preview", ModuleOverride::enabled());
        let state = state(BackendUser::new("editor").with_tsconfig(tsconfig));
        assert!(state.is_enabled());
        assert!(!state.is_shown());
    }

    #[test]
    fn disabled_override_does_not_switch_off() {
        let tsconfig = PanelTsConfig::default()
            .enable("preview", true)
            .override_module("preview", ModuleOverride::default());
        let state = state(BackendUser::new("editor").with_tsconfig(tsconfig));
        assert!(state.is_enabled());
    }

    #[test]
    fn open_follows_display_setting() {
        let settings = UserSettings::default().with("display_preview", "1");
        assert!(state(BackendUser::new("editor").with_settings(settings)).is_open());

        let settings = UserSettings::default().with("display_preview", "0");
        assert!(!state(BackendUser::new("editor").with_settings(settings)).is_open());
    }

    #[test]
    fn override_option_wins_over_user_setting() {
        let tsconfig = PanelTsConfig::default()
            .override_module("preview", ModuleOverride::default().option("showHiddenPages", "1"));
        let settings = UserSettings::default()
            .with("preview_showHiddenPages", "0")
            .with("preview_simulateDate", "2030-01-01");
        let state = state(BackendUser::new("editor").with_tsconfig(tsconfig).with_settings(settings));

        assert_eq!(state.configuration_option("showHiddenPages"), "1");
        assert_eq!(state.configuration_option("simulateDate"), "2030-01-01");
        assert_eq!(state.configuration_option("showHiddenRecords"), "");
    }
}
