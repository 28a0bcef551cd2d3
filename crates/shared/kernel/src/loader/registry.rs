use super::{ModuleContext, ModuleKind};
use crate::module::{MainModule, Module, Submodule};
use fxhash::FxHashMap;

/// A module type the registry can instantiate by class name.
///
/// `create` must be side-effect free; the loader may build modules that it
/// immediately drops.
pub trait RegisterModule: Module + Sized + 'static {
    /// Class name used in module configuration (`module = "..."`).
    const CLASS: &'static str;

    fn create(context: &ModuleContext) -> Self;
}

type Factory = fn(&ModuleContext) -> Box<dyn Module>;

/// What a class name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Registration {
    Module { kind: ModuleKind, factory: Factory },
    /// A known class that is not a panel module (e.g. a host service).
    Service,
}

/// Class name to constructor table consulted by the loader.
#[derive(Debug, Default, Clone)]
pub struct ModuleRegistry {
    entries: FxHashMap<String, Registration>,
}

fn construct<T: RegisterModule>(context: &ModuleContext) -> Box<dyn Module> {
    Box::new(T::create(context))
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register_main<T: RegisterModule + MainModule>(mut self) -> Self {
        self.insert(T::CLASS, Registration::Module { kind: ModuleKind::Main, factory: construct::<T> });
        self
    }

    #[must_use]
    pub fn register_sub<T: RegisterModule + Submodule>(mut self) -> Self {
        self.insert(T::CLASS, Registration::Module { kind: ModuleKind::Sub, factory: construct::<T> });
        self
    }

    /// Registers a class that resolves but must never be loaded as a module.
    #[must_use]
    pub fn register_service(mut self, class: impl Into<String>) -> Self {
        self.insert(class, Registration::Service);
        self
    }

    fn insert(&mut self, class: impl Into<String>, registration: Registration) {
        let class = class.into();
        if self.entries.insert(class.clone(), registration).is_some() {
            tracing::warn!(%class, "Module class registered twice, keeping the last registration");
        }
    }

    #[must_use]
    pub fn resolve(&self, class: &str) -> Option<Registration> {
        self.entries.get(class).copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
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
