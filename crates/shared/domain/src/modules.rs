//! Static module configuration as supplied by the host.
//!
//! The configuration is an ordered mapping `key → { module, before, after, submodules }`.
//! File order is significant (it breaks ties during dependency ordering), so the map is
//! kept as a vector of pairs and deserialized with a visitor that preserves input order.
//!
//! Malformed rows are *not* rejected during deserialization. They are kept as
//! [`ModuleConfigValue::Malformed`] / [`ModuleReference::Malformed`] so the loader can
//! report them with its own, distinguishable error kinds.

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Reference to the concrete module type (its registered class name).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModuleReference {
    Class(String),
    /// Anything that is not a string (a table, a list, a number ...).
    Malformed(Ignored),
}

/// Placeholder for discarded configuration values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ignored;

impl<'de> Deserialize<'de> for Ignored {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer).map(|_| Self)
    }
}

/// One row of static module configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModuleConfigEntry {
    pub module: Option<ModuleReference>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub submodules: ModuleConfiguration,
}

impl ModuleConfigEntry {
    /// Entry pointing at the given module class.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self { module: Some(ModuleReference::Class(class.into())), ..Self::default() }
    }

    /// Entry without a module reference.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn before<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn after<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn submodules(mut self, submodules: ModuleConfiguration) -> Self {
        self.submodules = submodules;
        self
    }

    /// The configured class name, if the reference is a string.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        match &self.module {
            Some(ModuleReference::Class(class)) => Some(class),
            _ => None,
        }
    }
}

/// A configuration value that may or may not be a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModuleConfigValue {
    Entry(ModuleConfigEntry),
    Malformed(Ignored),
}

impl From<ModuleConfigEntry> for ModuleConfigValue {
    fn from(entry: ModuleConfigEntry) -> Self {
        Self::Entry(entry)
    }
}

/// Ordered module configuration keyed by module key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleConfiguration {
    entries: Vec<(String, ModuleConfigValue)>,
}

impl ModuleConfiguration {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends (or replaces, keeping the original position) an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ModuleConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Appends a non-table row, as a hand-written configuration file may contain.
    #[must_use]
    pub fn with_malformed(self, key: impl Into<String>) -> Self {
        self.with(key, ModuleConfigValue::Malformed(Ignored))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ModuleConfigValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ModuleConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ModuleConfiguration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ModuleConfiguration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of module configurations")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut config = ModuleConfiguration::new();
                while let Some((key, value)) = map.next_entry::<String, ModuleConfigValue>()? {
                    config.insert(key, value);
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
