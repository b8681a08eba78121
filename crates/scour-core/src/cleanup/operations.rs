use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::cleanup::errors::CleanupError;
use crate::cleanup::types::{CleanupScope, KindFilter, ResourceReport};
use crate::managers::{
    DeleteStatus, DisplayName, KindContext, ManagerError, RawResource, ResourceManager,
};
use crate::poller::{self, DeletionOutcome};
use crate::registry::{RegisteredKind, Registry, RegistryError, ResourceKind};

/// Reject scopes no kind could run under.
pub fn validate_scope(scope: &CleanupScope, filter: &KindFilter) -> Result<(), CleanupError> {
    if scope.admin.is_none() && scope.user.is_none() {
        return Err(CleanupError::ScopeValidation {
            message: "no admin or user identity supplied".to_string(),
        });
    }
    if filter.admin_required == Some(true) && scope.admin.is_none() {
        return Err(CleanupError::ScopeValidation {
            message: "admin cleanup requested without an admin identity".to_string(),
        });
    }
    Ok(())
}

/// Kinds selected by `filter`, in deletion order.
///
/// Every name in the filter must match a registered service or kind.
pub fn select_kinds<'r>(
    registry: &'r Registry,
    filter: &KindFilter,
) -> Result<Vec<&'r RegisteredKind>, CleanupError> {
    if let Some(unknown) = filter.names.iter().find(|name| !registry.knows(name)) {
        return Err(RegistryError::UnknownKind {
            name: unknown.clone(),
        }
        .into());
    }

    Ok(registry
        .all_kinds()
        .iter()
        .filter(|registered| filter.matches(registered.kind()))
        .collect())
}

/// Why `scope` cannot run `kind`, if it cannot.
pub fn unmet_requirement(kind: &ResourceKind, scope: &CleanupScope) -> Option<String> {
    if kind.admin_required && scope.admin.is_none() {
        return Some("requires an admin identity".to_string());
    }
    if !kind.admin_required && scope.user.is_none() {
        return Some("requires a user identity".to_string());
    }
    if kind.tenant_scoped && !kind.perform_for_admin_only && scope.tenant_id.is_none() {
        return Some("requires a tenant".to_string());
    }
    None
}

/// Issue `manager.delete`, retrying transient backend errors.
///
/// A cancelled run stops retrying but never interrupts a call in flight.
pub async fn delete_with_retry(
    manager: &dyn ResourceManager,
    ctx: &KindContext,
    raw: &RawResource,
    max_attempts: u32,
    retry_interval: Duration,
) -> Result<DeleteStatus, ManagerError> {
    let mut attempt = 1;
    loop {
        match manager.delete(ctx, raw).await {
            Ok(status) => return Ok(status),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    event = "core.cleanup.delete_retrying",
                    kind = %ctx.kind(),
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %e
                );
                tokio::select! {
                    _ = ctx.cancel_token().cancelled() => return Err(e),
                    _ = tokio::time::sleep(retry_interval) => {}
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Delete one resource and wait for the backend to confirm it.
pub async fn delete_one(
    manager: &dyn ResourceManager,
    ctx: &KindContext,
    raw: &RawResource,
    max_attempts: u32,
    retry_interval: Duration,
) -> ResourceReport {
    let name = manager.name(ctx, raw);
    let id = match manager.identify(ctx, raw) {
        Ok(id) => id.to_string(),
        Err(e) => {
            error!(
                event = "core.cleanup.resource_failed",
                kind = %ctx.kind(),
                name = %name,
                error = %e
            );
            return ResourceReport {
                id: String::new(),
                name,
                outcome: DeletionOutcome::Failed(e.to_string()),
            };
        }
    };

    debug!(
        event = "core.cleanup.resource_started",
        kind = %ctx.kind(),
        id = %id,
        name = %name
    );

    let outcome = match delete_with_retry(manager, ctx, raw, max_attempts, retry_interval).await {
        Ok(DeleteStatus::AlreadyGone) => DeletionOutcome::AlreadyGone,
        Ok(DeleteStatus::Confirmed) => DeletionOutcome::Deleted,
        Ok(DeleteStatus::Accepted) => {
            poller::wait_until_deleted(manager, ctx, raw, ctx.poll()).await
        }
        Err(ManagerError::ConfirmTimeout { .. }) => DeletionOutcome::TimedOut,
        Err(e) => DeletionOutcome::Failed(e.to_string()),
    };

    log_outcome(ctx, &id, &name, &outcome);
    ResourceReport { id, name, outcome }
}

fn log_outcome(ctx: &KindContext, id: &str, name: &DisplayName, outcome: &DeletionOutcome) {
    match outcome {
        DeletionOutcome::Deleted | DeletionOutcome::AlreadyGone => info!(
            event = "core.cleanup.resource_completed",
            kind = %ctx.kind(),
            id = id,
            name = %name,
            outcome = outcome.as_str()
        ),
        DeletionOutcome::TimedOut => warn!(
            event = "core.cleanup.resource_timed_out",
            kind = %ctx.kind(),
            id = id,
            name = %name
        ),
        DeletionOutcome::Failed(reason) => error!(
            event = "core.cleanup.resource_failed",
            kind = %ctx.kind(),
            id = id,
            name = %name,
            error = %reason
        ),
    }
}
