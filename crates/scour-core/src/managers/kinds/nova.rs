//! Compute kinds.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{PROJECT_FIELD, precondition_error, tenant_resource};
use crate::clients::Action;
use crate::managers::capabilities::QuotaResource;
use crate::managers::{
    DeleteStatus, DeletionCheck, DeletionState, KindContext, ManagerError, RawResource,
    ResourceManager, ServiceResource,
};
use crate::registry::{Registry, RegistryError, ResourceKind};

const SERVERS: u32 = 200;
const SERVER_GROUPS: u32 = 201;
const KEYPAIRS: u32 = 202;
const QUOTAS: u32 = 203;
const FLAVORS: u32 = 204;
const AGGREGATES: u32 = 205;

const LOCKED_FIELD: &str = "OS-EXT-STS:locked";

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("nova", "servers", SERVERS).tenant(),
        NovaServer::new(),
    )?;
    registry.register(
        ResourceKind::new("nova", "server_groups", SERVER_GROUPS).tenant(),
        tenant_resource("nova", "server_groups", PROJECT_FIELD),
    )?;
    registry.register(
        ResourceKind::new("nova", "keypairs", KEYPAIRS).synchronized(),
        ServiceResource::new("nova", "keypairs").id_field("name"),
    )?;
    registry.register(
        ResourceKind::new("nova", "quotas", QUOTAS)
            .admin_required()
            .tenant()
            .synchronized(),
        QuotaResource::new("nova"),
    )?;
    registry.register(
        ResourceKind::new("nova", "flavors", FLAVORS).admin_only(),
        ServiceResource::new("nova", "flavors").deletion_check(DeletionCheck::NotFoundByName),
    )?;
    registry.register(
        ResourceKind::new("nova", "aggregates", AGGREGATES)
            .admin_only()
            .synchronized(),
        NovaAggregate::new(),
    )
}

/// Servers; a locked server is unlocked before it is deleted.
#[derive(Debug, Clone)]
pub struct NovaServer {
    servers: ServiceResource,
}

impl NovaServer {
    pub fn new() -> Self {
        Self {
            servers: tenant_resource("nova", "servers", PROJECT_FIELD),
        }
    }
}

impl Default for NovaServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for NovaServer {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        self.servers.list(ctx).await
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let id = self.identify(ctx, raw)?;
        let client = ctx.client()?;

        if raw.flag(LOCKED_FIELD) {
            debug!(event = "core.manager.server_unlock_started", id = %id);
            match client.perform("servers", id.as_str(), &Action::Unlock).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => return Ok(DeleteStatus::AlreadyGone),
                Err(e) => return Err(precondition_error(ctx, id.as_str(), "unlock", e)),
            }
        }

        self.servers.delete_id(ctx, client.as_ref(), id.as_str()).await
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        self.servers.is_deleted(ctx, raw).await
    }
}

/// Host aggregates; every member host is removed before the aggregate.
#[derive(Debug, Clone)]
pub struct NovaAggregate {
    aggregates: ServiceResource,
}

impl NovaAggregate {
    pub fn new() -> Self {
        Self {
            aggregates: ServiceResource::new("nova", "aggregates"),
        }
    }
}

impl Default for NovaAggregate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for NovaAggregate {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        self.aggregates.list(ctx).await
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let id = self.identify(ctx, raw)?;
        let client = ctx.client()?;

        let hosts: Vec<String> = raw
            .field("hosts")
            .and_then(Value::as_array)
            .map(|hosts| {
                hosts
                    .iter()
                    .filter_map(|h| h.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        for host in hosts {
            let action = Action::RemoveHost { host };
            match client.perform("aggregates", id.as_str(), &action).await {
                Ok(()) => {}
                // Host already detached by someone else
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(precondition_error(ctx, id.as_str(), "remove_host", e)),
            }
        }

        self.aggregates.delete_id(ctx, client.as_ref(), id.as_str()).await
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        self.aggregates.is_deleted(ctx, raw).await
    }
}
