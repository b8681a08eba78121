//! Behaviors shared across backend families.
//!
//! - [`tenant_filtered`] - client-side tenant filter for list APIs that
//!   cannot filter server-side
//! - [`with_name_prefix`] - restrict a listing to names this tool created
//! - [`QuotaResource`] - quota settings exposed as one pseudo-resource
//!   keyed by the tenant
//!
//! Synchronized deletion is a kind flag
//! ([`ResourceKind::synchronized_deletion`](crate::registry::ResourceKind));
//! managers and the poller both honor it.

use async_trait::async_trait;

use super::adapter::ServiceResource;
use super::context::KindContext;
use super::errors::ManagerError;
use super::traits::ResourceManager;
use super::types::{DeleteStatus, DeletionState, RawResource};

/// Keep only resources whose `owner_field` equals the tenant id.
///
/// Without a tenant in scope the listing is returned unchanged.
pub fn tenant_filtered(
    resources: Vec<RawResource>,
    owner_field: &str,
    tenant_id: Option<&str>,
) -> Vec<RawResource> {
    match tenant_id {
        Some(tenant_id) => resources
            .into_iter()
            .filter(|r| r.str_field(owner_field) == Some(tenant_id))
            .collect(),
        None => resources,
    }
}

/// Keep only resources whose `name_field` starts with `prefix`.
pub fn with_name_prefix(
    resources: Vec<RawResource>,
    name_field: &str,
    prefix: &str,
) -> Vec<RawResource> {
    resources
        .into_iter()
        .filter(|r| r.str_field(name_field).is_some_and(|n| n.starts_with(prefix)))
        .collect()
}

/// Quotas have no id or name of their own. The scope's tenant stands in for
/// both: `list` yields at most the tenant's project record, so the id is the
/// tenant id and the name is the project's display name.
#[derive(Debug, Clone)]
pub struct QuotaResource {
    quotas: ServiceResource,
}

impl QuotaResource {
    pub fn new(service: &'static str) -> Self {
        Self {
            quotas: ServiceResource::new(service, "quotas"),
        }
    }
}

#[async_trait]
impl ResourceManager for QuotaResource {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let Some(tenant_id) = ctx.tenant_id() else {
            return Ok(Vec::new());
        };

        let identity = ctx.identity()?;
        let keystone = ctx.client_of(identity, "keystone")?;
        match keystone.get("projects", tenant_id).await {
            Ok(project) => Ok(vec![RawResource::new(project)]),
            // Project already removed, so are its quotas
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(ServiceResource::discovery_error(ctx, e)),
        }
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let tenant_id = self.identify(ctx, raw)?;
        let client = ctx.client()?;
        self.quotas
            .delete_id(ctx, client.as_ref(), tenant_id.as_str())
            .await
    }

    async fn is_deleted(
        &self,
        _ctx: &KindContext,
        _raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        Ok(DeletionState::NotFound)
    }
}
