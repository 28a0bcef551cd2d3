#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the panel infrastructure.
//!
//! ## Usage
//! Add the crate as a regular dependency; every crate that defines an error enum
//! also needs `thiserror` because the expansion derives `thiserror::Error`:
//! ```toml
//! [dependencies]
//! apanel-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The docstring examples are `ignore`d to avoid compiling in this crate.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// A high-level attribute macro for defining domain-specific error enums.
///
/// This macro reduces boilerplate by transforming a standard enum into a fully-featured
/// error type shared by every crate of the workspace.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `#[source]` field,
///   enabling the use of the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides specialized `From<&str>` and `From<String>` implementations
///   if an `Internal` variant is present.
/// * **Stable Codes**: Variants annotated with `#[code = 1519490105]` get a numeric code
///   returned by the generated `code()` accessor, so callers can branch on error kinds
///   without matching on the enum.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must include a `source: T` field or a field marked
///    with `#[source]`/`#[from]` (compatible with `thiserror`).
/// 4. Tuple or unit variants are rejected to keep error wiring explicit and reliable.
/// 5. `#[code = N]` takes an unsigned integer literal that fits into `u32`.
///
/// # Generated Items
///
/// * `<ErrorName>Ext` trait with `.context(...)` for both `Result<T, ErrorName>` and
///   `Result<T, SourceError>` when a source field exists.
/// * `From<SourceError>` impls for variants with a source field and a context field.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant is present.
/// * `pub const fn code(&self) -> Option<u32>`.
///
/// # Example
///
/// ```rust,ignore
/// use apanel_derive::panel_error;
/// use std::borrow::Cow;
///
/// #[panel_error]
/// pub enum LoaderError {
///     #[code = 1519490105]
///     #[error("Missing configuration{}: {message}", format_context(.context))]
///     MissingConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// let err = LoaderError::MissingConfiguration { message: "preview".into(), context: None };
/// assert_eq!(err.code(), Some(1519490105));
/// ```
#[proc_macro_attribute]
pub fn panel_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
