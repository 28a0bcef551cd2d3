use apanel_domain::config::PanelConfig;
use apanel_domain::user::{BackendUser, UserSettings};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::Arc;

/// Header naming the logged-in backend user.
pub const USER_HEADER: &str = "x-apanel-user";
/// Cookie naming the logged-in backend user (browser sessions).
pub const USER_COOKIE: &str = "apanel_user";

/// The host's user/session subsystem as the panel sees it.
///
/// The panel performs no authentication; it trusts whatever user this resolves.
pub trait BackendUserProvider: Debug + Send + Sync {
    /// The backend user of the request, if any.
    fn resolve(&self, headers: &HeaderMap) -> Option<Arc<BackendUser>>;

    /// Applies `update` to the stored settings of `username`; returns `false` for
    /// unknown users.
    fn update_settings(&self, username: &str, update: &mut dyn FnMut(&mut UserSettings)) -> bool;
}

/// In-memory session store seeded from the `users` configuration section.
///
/// Users are identified by the `x-apanel-user` header or the `apanel_user` cookie.
/// Settings changes replace the user's snapshot, so requests already in flight keep
/// the state they started with.
#[derive(Debug, Default)]
pub struct SessionStore {
    users: RwLock<FxHashMap<String, Arc<BackendUser>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new<I>(users: I) -> Self
    where
        I: IntoIterator<Item = BackendUser>,
    {
        let users = users.into_iter().map(|user| (user.username.clone(), Arc::new(user))).collect();
        Self { users: RwLock::new(users) }
    }

    #[must_use]
    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.users.iter().cloned())
    }

    #[must_use]
    pub fn get(&self, username: &str) -> Option<Arc<BackendUser>> {
        self.users.read().get(username).cloned()
    }

    pub fn insert(&self, user: BackendUser) {
        self.users.write().insert(user.username.clone(), Arc::new(user));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }
}

fn username_from(headers: &HeaderMap) -> Option<&str> {
    let from_header = headers.get(USER_HEADER).and_then(|v| v.to_str().ok());
    let from_cookie = || {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find_map(|(name, value)| (name == USER_COOKIE).then_some(value))
    };
    from_header.or_else(from_cookie).map(str::trim).filter(|name| !name.is_empty())
}

impl BackendUserProvider for SessionStore {
    fn resolve(&self, headers: &HeaderMap) -> Option<Arc<BackendUser>> {
        username_from(headers).and_then(|name| self.get(name))
    }

    fn update_settings(&self, username: &str, update: &mut dyn FnMut(&mut UserSettings)) -> bool {
        let mut users = self.users.write();
        let Some(user) = users.get_mut(username) else { return false };
        update(&mut Arc::make_mut(user).settings);
        true
    }
}
