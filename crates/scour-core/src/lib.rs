//! scour-core: Core library for ordered cloud resource cleanup
//!
//! Given a scope (tenant plus admin and/or user identities), enumerate every
//! live resource of every registered kind and delete them in a fixed,
//! dependency-respecting order, confirming each deletion against the backend.
//!
//! # Main Entry Points
//!
//! - [`registry`] - Kinds and their deletion order
//! - [`managers`] - Per-kind list/identify/name/delete/is_deleted behavior
//! - [`poller`] - Deletion confirmation
//! - [`cleanup`] - Run orchestration and reporting
//! - [`clients`] - Backend client contract
//! - [`memory`] - In-memory backend
//! - [`config`] - Configuration management

pub mod cleanup;
pub mod clients;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod managers;
pub mod memory;
pub mod poller;
pub mod registry;

// Re-export commonly used types at crate root for convenience
pub use cleanup::{
    Cleanup, CleanupError, CleanupReport, CleanupScope, KindFilter, KindReport, KindStatus,
    OutcomeCounts, ResourceReport,
};
pub use clients::{BackendError, ServiceClient, Session};
pub use config::ScourConfig;
pub use managers::{ManagerError, ResourceManager};
pub use memory::MemoryCloud;
pub use poller::{DeletionOutcome, PollSettings};
pub use registry::{Registry, ResourceKind, builtin_registry};

// Re-export logging initialization
pub use logging::init_logging;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::cleanup::CleanupScope;
    use crate::managers::KindContext;
    use crate::memory::MemoryCloud;
    use crate::poller::PollSettings;
    use crate::registry::ResourceKind;

    /// Both identities backed by `cloud`.
    pub fn admin_scope(cloud: &MemoryCloud, tenant_id: Option<&str>) -> Arc<CleanupScope> {
        let mut scope = CleanupScope::new()
            .with_admin(Arc::new(cloud.clone()))
            .with_user(Arc::new(cloud.clone()));
        scope.tenant_id = tenant_id.map(str::to_string);
        Arc::new(scope)
    }

    /// Only a user identity backed by `cloud`.
    pub fn user_scope(cloud: &MemoryCloud, tenant_id: Option<&str>) -> Arc<CleanupScope> {
        let mut scope = CleanupScope::new().with_user(Arc::new(cloud.clone()));
        scope.tenant_id = tenant_id.map(str::to_string);
        Arc::new(scope)
    }

    pub fn poll_settings() -> PollSettings {
        PollSettings::new(Duration::from_secs(600), Duration::from_secs(1))
    }

    pub fn context(kind: ResourceKind, scope: Arc<CleanupScope>) -> KindContext {
        KindContext::new(kind, scope, poll_settings(), CancellationToken::new())
    }
}
