use apanel_derive::panel_error;
use std::borrow::Cow;

#[panel_error]
pub enum ConfigurationError {
    #[code = 1519490105]
    #[error("Missing configuration{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[code = 1519490112]
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_missing() -> Result<(), ConfigurationError> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).context("Reading module table")
}

#[test]
fn panel_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/panel_error_pass.rs");
}

#[test]
fn codes_are_exposed_per_variant() {
    let missing = ConfigurationError::Missing { message: "preview".into(), context: None };
    let invalid = ConfigurationError::Invalid { message: "preview".into(), context: None };
    let internal = ConfigurationError::from("boom");

    assert_eq!(missing.code(), Some(1_519_490_105));
    assert_eq!(invalid.code(), Some(1_519_490_112));
    assert_eq!(internal.code(), None);
}

#[test]
fn context_is_rendered_in_display() {
    let err: Result<(), ConfigurationError> =
        Err(ConfigurationError::Missing { message: "preview".into(), context: None });
    let err = err.context("Loading main modules").unwrap_err();

    assert_eq!(err.to_string(), "Missing configuration (Loading main modules): preview");
}

#[test]
fn source_errors_convert_with_context() {
    let err = read_missing().unwrap_err();

    assert!(matches!(err, ConfigurationError::Io { context: Some(_), .. }));
    assert_eq!(err.code(), None);
    assert!(err.to_string().starts_with("IO error (Reading module table)"));
}
