use std::borrow::Cow;

/// Configuration problems detected while loading modules.
///
/// Every variant is fatal to the whole load; no module is instantiated once one is
/// raised.
#[apanel_derive::panel_error]
pub enum LoaderError {
    /// The entry has no `module` reference or is not a mapping at all.
    #[code = 1519490105]
    #[error("Missing module configuration{}: {message}", format_context(.context))]
    MissingConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The reference is empty, unknown, not a module or of the wrong kind, or the
    /// module's identifier clashes with a sibling.
    #[code = 1519490112]
    #[error("Invalid module configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[code = 1381960494]
    #[error("Module dependency cycle{}: {message}", format_context(.context))]
    DependencyCycle { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
