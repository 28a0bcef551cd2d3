use super::error::{ModuleError, ModuleErrorExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;

/// Opaque payload one module captured for a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleData(Map<String, Value>);

impl ModuleData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Stores any serializable value under `key`.
    ///
    /// # Errors
    /// Returns [`ModuleError::Serialization`] if `value` cannot be represented as JSON.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), ModuleError> {
        let value = serde_json::to_value(value).context(format!("Module data field '{key}'"))?;
        self.0.insert(key.to_owned(), value);
        Ok(())
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }
}

impl Deref for ModuleData {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Key of a module in a [`ModuleDataStorageCollection`]: the identifiers from the
/// root down to the module, joined with `/`.
#[must_use]
pub fn module_path(parent: Option<&str>, identifier: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}/{identifier}"),
        None => identifier.to_owned(),
    }
}

/// Captured data of every module of one request, keyed by [`module_path`].
///
/// This is the value stored in the request cache between the capture and the render
/// pass. Entries keep the order they were captured in; adding a path again replaces
/// the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleDataStorageCollection(Vec<(String, ModuleData)>);

impl ModuleDataStorageCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module_data(&mut self, path: impl Into<String>, data: ModuleData) {
        let path = path.into();
        match self.0.iter_mut().find(|(key, _)| *key == path) {
            Some((_, slot)) => *slot = data,
            None => self.0.push((path, data)),
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ModuleData> {
        self.0.iter().find(|(key, _)| key == path).map(|(_, data)| data)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Entries in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleData)> {
        self.0.iter().map(|(path, data)| (path.as_str(), data))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
