//! # Domain Models
//!
//! Pure panel types with minimal dependencies (`serde`, `bitflags`): configuration
//! sections, the ordered module configuration, backend-user state and capability flags.
//! No I/O lives here.

pub mod capabilities;
pub mod config;
pub mod constants;
pub mod modules;
pub mod user;
