use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides (`APANEL__CACHE__BACKEND=file`).
pub const ENV_PREFIX: &str = "APANEL";

const DEFAULT_CONFIG_FILE: &str = "apanel";

#[apanel_derive::panel_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered with environment overrides.
///
/// 1. **Base file**: `path`, or `apanel` in the working directory when `None`. The
///    extension picks the format (`toml`, `yaml`, `json`) and may be omitted.
/// 2. **Environment**: variables prefixed `APANEL__`, nested keys separated by `__`
///    (`APANEL__PANEL__ROUTE_PREFIX` maps to `panel.route_prefix`).
///
/// Map order of the file is preserved, which the `modules` table relies on.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or the merged values do not
/// deserialize into `T`.
///
/// # Example
/// ```rust
/// use apanel_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct HostConfig {
///     port: u16,
/// }
///
/// let cfg: HostConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
