use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::errors::ManagerError;
use crate::cleanup::CleanupScope;
use crate::clients::{ServiceClient, Session};
use crate::poller::PollSettings;
use crate::registry::ResourceKind;

/// One kind bound to one cleanup scope for the duration of that kind's
/// processing window. Cheap to clone; workers each hold a copy.
#[derive(Clone)]
pub struct KindContext {
    kind: ResourceKind,
    scope: Arc<CleanupScope>,
    poll: PollSettings,
    cancel: CancellationToken,
}

impl KindContext {
    pub fn new(
        kind: ResourceKind,
        scope: Arc<CleanupScope>,
        poll: PollSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            scope,
            poll,
            cancel,
        }
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn scope(&self) -> &CleanupScope {
        &self.scope
    }

    /// Confirmation settings resolved for this kind.
    pub fn poll(&self) -> PollSettings {
        self.poll
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.scope.tenant_id.as_deref()
    }

    pub fn admin(&self) -> Result<&Arc<dyn Session>, ManagerError> {
        self.scope
            .admin
            .as_ref()
            .ok_or_else(|| ManagerError::NoIdentity {
                kind: self.kind.key(),
                role: "admin",
            })
    }

    pub fn user(&self) -> Result<&Arc<dyn Session>, ManagerError> {
        self.scope
            .user
            .as_ref()
            .ok_or_else(|| ManagerError::NoIdentity {
                kind: self.kind.key(),
                role: "user",
            })
    }

    /// The identity this kind acts as: admin when required, user otherwise.
    pub fn identity(&self) -> Result<&Arc<dyn Session>, ManagerError> {
        if self.kind.admin_required {
            self.admin()
        } else {
            self.user()
        }
    }

    /// Admin when available, user otherwise.
    pub fn admin_or_user(&self) -> Result<&Arc<dyn Session>, ManagerError> {
        self.admin().or_else(|_| self.user())
    }

    fn role(&self) -> &'static str {
        if self.kind.admin_required {
            "admin"
        } else {
            "user"
        }
    }

    /// Client of this kind's own service, resolved through [`Self::identity`].
    pub fn client(&self) -> Result<Arc<dyn ServiceClient>, ManagerError> {
        let identity = self.identity()?;
        identity
            .client(self.kind.service)
            .ok_or_else(|| ManagerError::NoClient {
                service: self.kind.service.to_string(),
                role: self.role(),
            })
    }

    /// Client of an arbitrary service through a specific identity.
    pub fn client_of(
        &self,
        identity: &Arc<dyn Session>,
        service: &str,
    ) -> Result<Arc<dyn ServiceClient>, ManagerError> {
        identity
            .client(service)
            .ok_or_else(|| ManagerError::NoClient {
                service: service.to_string(),
                role: self.role(),
            })
    }
}

impl std::fmt::Debug for KindContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindContext")
            .field("kind", &self.kind.key())
            .field("tenant_id", &self.scope.tenant_id)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}
