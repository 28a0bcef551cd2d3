use crate::error::CacheError;
use std::fmt;

const MAX_KEY_LEN: usize = 128;

/// A validated cache key.
///
/// Keys double as file names in the file backend, so only ASCII alphanumerics,
/// `_` and `-` are accepted. Keys are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CacheKey {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, CacheError> {
        if value.is_empty() {
            return Err(CacheError::InvalidKey {
                message: "EMPTY".into(),
                context: Some("Cache key cannot be empty".into()),
            });
        }

        if value.len() > MAX_KEY_LEN {
            return Err(CacheError::InvalidKey {
                message: value.into(),
                context: Some("Cache key is too long".into()),
            });
        }

        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(CacheError::InvalidKey {
                message: value.into(),
                context: Some("Cache key contains illegal characters".into()),
            });
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for CacheKey {
    type Error = CacheError;

    fn try_from(value: &str) -> Result<Self, CacheError> {
        Self::try_from(value.to_owned())
    }
}

impl TryFrom<&String> for CacheKey {
    type Error = CacheError;

    fn try_from(value: &String) -> Result<Self, CacheError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
