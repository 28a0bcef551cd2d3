//! Module loading: configuration validation, dependency ordering and instantiation.
//!
//! The whole configuration tree (including nested `submodules` tables and their
//! `before`/`after` edges) is validated before the first module is constructed, so a
//! bad entry never leaves a partially built tree behind. Sibling identifiers are only
//! known once modules exist and are checked while instantiating.

mod error;
mod ordering;
mod registry;

pub use error::{LoaderError, LoaderErrorExt};
pub use ordering::{DependencyOrdering, DependencyOrderingService};
pub use registry::{ModuleRegistry, RegisterModule, Registration};

use crate::module::{ModuleList, ModuleState};
use apanel_domain::modules::{ModuleConfigValue, ModuleConfiguration, ModuleReference};
use apanel_domain::user::BackendUser;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which level of the module tree a configuration table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Main,
    Sub,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main module"),
            Self::Sub => f.write_str("submodule"),
        }
    }
}

/// What a module receives when it is constructed for a request.
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    user: Option<Arc<BackendUser>>,
}

impl ModuleContext {
    #[must_use]
    pub const fn new(user: Option<Arc<BackendUser>>) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn user(&self) -> Option<&Arc<BackendUser>> {
        self.user.as_ref()
    }

    /// Per-user state for the module with the given identifier.
    #[must_use]
    pub fn state(&self, identifier: &str) -> ModuleState {
        ModuleState::new(identifier, self.user.clone())
    }
}

/// Turns module configuration into an ordered tree of module instances.
///
/// Cheap to clone; share one loader across requests.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    registry: Arc<ModuleRegistry>,
    ordering: Arc<dyn DependencyOrdering>,
}

impl ModuleLoader {
    #[must_use]
    pub fn new(registry: ModuleRegistry) -> Self {
        Self::with_ordering(registry, DependencyOrderingService)
    }

    #[must_use]
    pub fn with_ordering(registry: ModuleRegistry, ordering: impl DependencyOrdering + 'static) -> Self {
        Self::with_shared_ordering(registry, Arc::new(ordering))
    }

    #[must_use]
    pub fn with_shared_ordering(registry: ModuleRegistry, ordering: Arc<dyn DependencyOrdering>) -> Self {
        Self { registry: Arc::new(registry), ordering }
    }

    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Validates `config`, orders it and instantiates the modules it names.
    ///
    /// For [`ModuleKind::Main`] configurable modules that are not enabled for the
    /// user are dropped silently. [`ModuleKind::Sub`] loads every entry. Entries with a
    /// non-empty `submodules` table get their children loaded recursively when the
    /// module provides submodules.
    ///
    /// # Errors
    /// * [`LoaderError::MissingConfiguration`] if an entry lacks a `module` reference or
    ///   is not a mapping.
    /// * [`LoaderError::InvalidConfiguration`] if the reference is empty, unknown, not
    ///   a module or of the wrong kind, or if two loaded siblings share an identifier.
    /// * [`LoaderError::DependencyCycle`] if `before`/`after` edges form a cycle at any
    ///   level of the tree.
    pub fn validate_sort_and_initialize(
        &self,
        config: &ModuleConfiguration,
        kind: ModuleKind,
        context: &ModuleContext,
    ) -> Result<ModuleList, LoaderError> {
        self.validate(config, kind)?;
        self.instantiate(config, kind, context)
    }

    fn validate(&self, config: &ModuleConfiguration, kind: ModuleKind) -> Result<(), LoaderError> {
        self.ordering.order(config)?;

        for (key, value) in config.iter() {
            let ModuleConfigValue::Entry(entry) = value else {
                return Err(LoaderError::MissingConfiguration {
                    message: format!("Entry '{key}' is not a mapping").into(),
                    context: None,
                });
            };

            let class = match &entry.module {
                None => {
                    return Err(LoaderError::MissingConfiguration {
                        message: format!("Missing module reference for '{key}'").into(),
                        context: None,
                    });
                },
                Some(ModuleReference::Malformed(_)) => {
                    return Err(LoaderError::InvalidConfiguration {
                        message: format!("Module reference of '{key}' is not a class name").into(),
                        context: None,
                    });
                },
                Some(ModuleReference::Class(class)) => class.trim(),
            };

            if class.is_empty() {
                return Err(LoaderError::InvalidConfiguration {
                    message: format!("Empty module reference for '{key}'").into(),
                    context: None,
                });
            }

            match self.registry.resolve(class) {
                None => {
                    return Err(LoaderError::InvalidConfiguration {
                        message: format!("Module class '{class}' of '{key}' does not exist").into(),
                        context: None,
                    });
                },
                Some(Registration::Service) => {
                    return Err(LoaderError::InvalidConfiguration {
                        message: format!("Class '{class}' of '{key}' is not a panel module").into(),
                        context: None,
                    });
                },
                Some(Registration::Module { kind: registered, .. }) if registered != kind => {
                    return Err(LoaderError::InvalidConfiguration {
                        message: format!("Class '{class}' of '{key}' is not a {kind}").into(),
                        context: None,
                    });
                },
                Some(Registration::Module { .. }) => {},
            }

            if !entry.submodules.is_empty() {
                self.validate(&entry.submodules, ModuleKind::Sub)?;
            }
        }
        Ok(())
    }

    fn instantiate(
        &self,
        config: &ModuleConfiguration,
        kind: ModuleKind,
        context: &ModuleContext,
    ) -> Result<ModuleList, LoaderError> {
        let mut modules = ModuleList::new();

        for key in self.ordering.order(config)? {
            let Some(ModuleConfigValue::Entry(entry)) = config.get(&key) else { continue };
            let Some(Registration::Module { factory, .. }) =
                entry.class().and_then(|class| self.registry.resolve(class.trim()))
            else {
                continue;
            };

            let mut module = factory(context);
            if kind == ModuleKind::Main && !module.is_active() {
                debug!(%key, identifier = module.identifier(), "Skipping disabled module");
                continue;
            }

            if modules.iter().any(|loaded| loaded.identifier() == module.identifier()) {
                return Err(LoaderError::InvalidConfiguration {
                    message: format!("Identifier '{}' of '{key}' is already used by a sibling", module.identifier())
                        .into(),
                    context: None,
                });
            }

            if !entry.submodules.is_empty()
                && let Some(provider) = module.as_submodule_provider_mut()
            {
                let children = self.instantiate(&entry.submodules, ModuleKind::Sub, context)?;
                provider.set_submodules(children);
            }

            debug!(
                %key,
                %kind,
                identifier = module.identifier(),
                capabilities = ?module.capabilities(),
                "Module loaded"
            );
            modules.push(module);
        }

        Ok(modules)
    }
}
