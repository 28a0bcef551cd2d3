use std::borrow::Cow;

/// Failure raised by a module while enriching or capturing.
#[apanel_derive::panel_error]
pub enum ModuleError {
    #[error("Enrich failed{}: {message}", format_context(.context))]
    Enrich { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Capture failed{}: {message}", format_context(.context))]
    Capture { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Module data serialization failed{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal module error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
