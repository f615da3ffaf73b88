use std::collections::BTreeMap;
use std::sync::Arc;

use clap::ValueEnum;

use crate::adapter::{Adapter, SqlAdapter};
use crate::types::BackendKind;

/// Builds a fresh, unconnected adapter.
pub type AdapterFactory = Arc<dyn Fn() -> Box<dyn Adapter> + Send + Sync>;

/// Name-based lookup the mapping engine uses to pick an adapter for a source.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding one factory per compiled-in backend.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in BackendKind::value_variants() {
            let kind = *kind;
            registry.register(kind.name(), move || Box::new(SqlAdapter::new(kind)));
        }
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry. Names are
    /// case-insensitive.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Adapter> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    /// Create a new adapter instance for `name`.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<Box<dyn Adapter>> {
        self.factories
            .get(&name.to_ascii_lowercase())
            .map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
