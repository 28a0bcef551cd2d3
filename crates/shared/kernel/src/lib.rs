//! Admin panel kernel.
//!
//! Holds the module API (a base [`module::Module`] trait plus optional capability
//! facets), the configuration-driven [`loader::ModuleLoader`], the three-phase
//! [`controller::MainController`] and the request-scoped context modules write into.
//! With the `server` feature it also ships the tower middleware that drives the
//! controller around a host's page handler.
//!
//! ## ID generation
//! Request ids and CSP nonces use `safe_nanoid!` (URL-safe, no ambiguous characters):
//! ```rust
//! # use apanel_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use apanel_kernel::config::load_config;
//! use apanel_kernel::domain::config::PanelConfig;
//!
//! let config: PanelConfig = load_config(Some("config/apanel.toml")).unwrap();
//! ```
pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod markup;
pub mod module;
pub mod prelude;
pub mod request;
pub mod resources;
#[cfg(feature = "server")]
pub mod server;
pub mod user_state;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use apanel_domain as domain;
pub use axum::http;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
