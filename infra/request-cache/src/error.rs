use std::borrow::Cow;

/// A specialized [`CacheError`] enum of this crate.
#[apanel_derive::panel_error]
pub enum CacheError {
    #[error("Invalid cache key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Corrupted cache entry{}: {message}", format_context(.context))]
    Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Cache I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Cache payload encoding failure{}: {source}", format_context(.context))]
    Encoding { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Decompression failure{}: {source}", format_context(.context))]
    Decompress { source: lz4_flex::block::DecompressError, context: Option<Cow<'static, str>> },

    #[error("Cache maintenance task failed{}: {source}", format_context(.context))]
    Join { source: tokio::task::JoinError, context: Option<Cow<'static, str>> },
}
