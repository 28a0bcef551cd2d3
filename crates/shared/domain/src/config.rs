use crate::modules::ModuleConfiguration;
use crate::user::BackendUser;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level panel configuration shared across the host and the overlay.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub panel: PanelSettings,
    pub modules: ModuleConfiguration,
    pub users: Vec<BackendUser>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PanelConfig {
    #[serde(flatten, default)]
    inner: Arc<PanelConfigInner>,
}

impl PanelConfig {
    #[must_use]
    pub fn new(inner: PanelConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    #[must_use]
    pub fn user(&self, username: &str) -> Option<&BackendUser> {
        self.users.iter().find(|user| user.username == username)
    }
}

impl Deref for PanelConfig {
    type Target = PanelConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PanelConfig {
    fn deref_mut(&mut self) -> &mut PanelConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Logger setup (`[logging]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Full `EnvFilter` directive; takes precedence over `level`.
    pub filter: Option<String>,
    pub console: bool,
    /// Enables rolling file output when set.
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

/// Where captured module data lives between the capture and render passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    File,
}

/// Request-scoped cache (`[cache]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub ttl_seconds: u64,
    pub capacity: u64,
    pub root: PathBuf,
    pub compression: bool,
}

/// Overlay behaviour (`[panel]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Site-level switch; the overlay is never injected while this is off.
    pub enabled: bool,
    pub route_prefix: String,
    /// Link into the backend page module, `{page_id}` is replaced.
    pub backend_page_link: String,
    pub script: String,
    pub stylesheet: String,
    /// Larger page bodies are passed through without the overlay.
    pub max_body_bytes: usize,
}

impl PanelSettings {
    #[must_use]
    pub fn page_link(&self, page_id: u64) -> String {
        self.backend_page_link.replace("{page_id}", &page_id.to_string())
    }

    #[must_use]
    pub fn route(&self, path: &str) -> String {
        format!("{}/{}", self.route_prefix.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 7,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl_seconds: 3600,
            capacity: 10_000,
            root: PathBuf::from("var/cache/adminpanel"),
            compression: true,
        }
    }
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            route_prefix: "/_adminpanel".to_owned(),
            backend_page_link: "/backend/page/layout?id={page_id}".to_owned(),
            script: "/_adminpanel/assets/admin-panel.js".to_owned(),
            stylesheet: "/_adminpanel/assets/adminpanel.css".to_owned(),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}
