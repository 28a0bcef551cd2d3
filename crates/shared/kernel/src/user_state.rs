//! Panel-wide predicates over the current backend user.
//!
//! All of them are `false` when nobody is logged in.

use apanel_domain::user::BackendUser;

/// The user has at least one panel module (or the catch-all) enabled.
#[must_use]
pub fn is_activated_for_user(user: Option<&BackendUser>) -> bool {
    user.is_some_and(|user| user.tsconfig.any_enabled())
}

/// The user configured the panel to stay hidden while modules keep working.
#[must_use]
pub fn is_hidden_for_user(user: Option<&BackendUser>) -> bool {
    user.is_some_and(|user| user.tsconfig.hide)
}

/// The user expanded the panel.
#[must_use]
pub fn is_open(user: Option<&BackendUser>) -> bool {
    user.is_some_and(|user| user.settings.display_top)
}

/// The overlay markup should be injected into the page.
#[must_use]
pub fn should_render(user: Option<&BackendUser>, site_enabled: bool) -> bool {
    site_enabled && is_activated_for_user(user) && !is_hidden_for_user(user)
}
