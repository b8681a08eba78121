use std::sync::{Arc, LazyLock};

use tracing::debug;

use super::errors::RegistryError;
use super::types::ResourceKind;
use crate::managers::{ResourceManager, kinds};

/// Process-wide registry of the built-in kinds.
static BUILTIN: LazyLock<Result<Registry, RegistryError>> = LazyLock::new(Registry::builtin);

/// A kind together with the manager that implements its behavior.
#[derive(Clone)]
pub struct RegisteredKind {
    kind: ResourceKind,
    manager: Arc<dyn ResourceManager>,
}

impl RegisteredKind {
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn manager(&self) -> &Arc<dyn ResourceManager> {
        &self.manager
    }
}

impl std::fmt::Debug for RegisteredKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredKind")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Kinds sorted by `order`, ties kept in registration sequence.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    kinds: Vec<RegisteredKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every built-in kind.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        kinds::register_all(&mut registry)?;
        debug!(event = "core.registry.builtin_loaded", kinds = registry.len());
        Ok(registry)
    }

    /// Add a kind and bind its manager.
    pub fn register<M>(&mut self, kind: ResourceKind, manager: M) -> Result<(), RegistryError>
    where
        M: ResourceManager + 'static,
    {
        self.register_shared(kind, Arc::new(manager))
    }

    pub fn register_shared(
        &mut self,
        kind: ResourceKind,
        manager: Arc<dyn ResourceManager>,
    ) -> Result<(), RegistryError> {
        if self.get(kind.service, kind.resource).is_some() {
            return Err(RegistryError::DuplicateKind {
                service: kind.service.to_string(),
                resource: kind.resource.to_string(),
            });
        }

        // Insert after every kind with an order <= ours to keep ties stable.
        let position = self.kinds.partition_point(|k| k.kind.order <= kind.order);
        self.kinds.insert(position, RegisteredKind { kind, manager });
        Ok(())
    }

    /// All kinds in deletion order.
    pub fn all_kinds(&self) -> &[RegisteredKind] {
        &self.kinds
    }

    pub fn get(&self, service: &str, resource: &str) -> Option<&RegisteredKind> {
        self.kinds
            .iter()
            .find(|k| k.kind.service == service && k.kind.resource == resource)
    }

    /// Whether `name` is a known service (`nova`) or kind (`nova.servers`).
    pub fn knows(&self, name: &str) -> bool {
        self.kinds
            .iter()
            .any(|k| k.kind.service == name || k.kind.key() == name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Get the process-wide built-in registry.
pub fn builtin_registry() -> Result<&'static Registry, RegistryError> {
    BUILTIN.as_ref().map_err(Clone::clone)
}
