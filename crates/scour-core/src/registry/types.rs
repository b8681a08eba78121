use serde::Serialize;

/// Worker count used when a kind does not ask for a specific one.
pub const DEFAULT_WORKERS: usize = 20;

/// Identity and capabilities of one cleanable kind.
///
/// Built once per kind in the declarative tables under
/// [`managers::kinds`](crate::managers::kinds) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceKind {
    /// Backend family (`nova`, `neutron`, ...).
    pub service: &'static str,
    /// Backend-local collection name (`servers`, `port`, ...).
    pub resource: &'static str,
    /// Global deletion rank, lower deletes first.
    pub order: u32,
    /// Needs the admin identity to list and delete.
    pub admin_required: bool,
    /// Listed resources are restricted to the scope's tenant.
    pub tenant_scoped: bool,
    /// Only ever processed with the admin identity.
    pub perform_for_admin_only: bool,
    /// Concurrency cap for delete/confirm of this kind.
    pub workers: usize,
    /// The backend's delete call is synchronous, no confirmation polling.
    pub synchronized_deletion: bool,
}

impl ResourceKind {
    pub const fn new(service: &'static str, resource: &'static str, order: u32) -> Self {
        Self {
            service,
            resource,
            order,
            admin_required: false,
            tenant_scoped: false,
            perform_for_admin_only: false,
            workers: DEFAULT_WORKERS,
            synchronized_deletion: false,
        }
    }

    pub const fn tenant(mut self) -> Self {
        self.tenant_scoped = true;
        self
    }

    pub const fn admin_required(mut self) -> Self {
        self.admin_required = true;
        self
    }

    /// Admin-only kinds always require the admin identity too.
    pub const fn admin_only(mut self) -> Self {
        self.admin_required = true;
        self.perform_for_admin_only = true;
        self
    }

    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub const fn synchronized(mut self) -> Self {
        self.synchronized_deletion = true;
        self
    }

    /// `service.resource`, the name used in filters and config overrides.
    pub fn key(&self) -> String {
        format!("{}.{}", self.service, self.resource)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.service, self.resource)
    }
}
