use crate::loader::LoaderError;
use crate::module::ModuleError;
use apanel_request_cache::CacheError;
use std::borrow::Cow;

/// Failure of one controller phase.
///
/// Hosts treat any of these as "admin panel unavailable for this request".
#[apanel_derive::panel_error]
pub enum PanelError {
    #[error("Module loading failed{}: {source}", format_context(.context))]
    Loader { source: LoaderError, context: Option<Cow<'static, str>> },

    #[error("Module failed{}: {source}", format_context(.context))]
    Module { source: ModuleError, context: Option<Cow<'static, str>> },

    #[error("Request cache failure{}: {source}", format_context(.context))]
    Cache { source: CacheError, context: Option<Cow<'static, str>> },

    #[error("Internal panel error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl PanelError {
    /// Stable numeric code of the underlying loader failure, if any.
    #[must_use]
    pub fn loader_code(&self) -> Option<u32> {
        match self {
            Self::Loader { source, .. } => source.code(),
            _ => None,
        }
    }
}
