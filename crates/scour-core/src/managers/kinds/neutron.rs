//! Network kinds.
//!
//! Neutron deletes synchronously except for load balancers, which are
//! confirmed by polling until the show call answers 404. Lists pass the
//! tenant to the server and filter again on `tenant_id`, since the list API
//! does not honor the filter for every resource.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::precondition_error;
use crate::clients::{Action, ListQuery, service_types};
use crate::managers::capabilities::{self, QuotaResource};
use crate::managers::{
    DeleteStatus, DeletionCheck, DeletionState, DisplayName, KindContext, ManagerError,
    RawResource, ResourceManager, ServiceResource,
};
use crate::registry::{Registry, RegistryError, ResourceKind};

const VIP: u32 = 300;
const HEALTH_MONITOR: u32 = 301;
const POOL: u32 = 302;
const LOADBALANCER: u32 = 303;
const BGPVPN: u32 = 304;
const FLOATINGIP: u32 = 305;
const PORT: u32 = 306;
const SUBNET: u32 = 307;
const NETWORK: u32 = 308;
const ROUTER: u32 = 309;
const SECURITY_GROUP: u32 = 310;
const QUOTA: u32 = 311;

const OWNER_FIELD: &str = "tenant_id";

/// Port owners that mark a router interface.
pub const ROUTER_INTERFACE_OWNERS: &[&str] = &[
    "network:router_interface",
    "network:router_interface_distributed",
    "network:ha_router_replicated_interface",
];

pub const ROUTER_GATEWAY_OWNER: &str = "network:router_gateway";

/// Adapter for a tenant-owned neutron collection.
fn neutron(collection: &'static str) -> ServiceResource {
    super::tenant_resource("neutron", collection, OWNER_FIELD)
}

fn is_default_group(raw: &RawResource) -> bool {
    raw.str_field("name") == Some("default")
}

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    for (resource, collection, order) in [
        ("vip", "vips", VIP),
        ("health_monitor", "health_monitors", HEALTH_MONITOR),
        ("pool", "pools", POOL),
    ] {
        registry.register(
            ResourceKind::new("neutron", resource, order)
                .tenant()
                .synchronized(),
            neutron(collection).requires_extension("lbaas"),
        )?;
    }
    registry.register(
        ResourceKind::new("neutron", "loadbalancer", LOADBALANCER).tenant(),
        neutron("loadbalancers")
            .requires_extension("lbaasv2")
            .deletion_check(DeletionCheck::NotFound),
    )?;
    registry.register(
        ResourceKind::new("neutron", "bgpvpn", BGPVPN)
            .admin_only()
            .synchronized(),
        ServiceResource::new("neutron", "bgpvpns").requires_extension("bgpvpn"),
    )?;
    registry.register(
        ResourceKind::new("neutron", "floatingip", FLOATINGIP)
            .tenant()
            .synchronized(),
        FloatingIp::new(),
    )?;
    registry.register(
        ResourceKind::new("neutron", "port", PORT)
            .tenant()
            .synchronized(),
        NeutronPort::new(),
    )?;
    for (resource, collection, order) in [
        ("subnet", "subnets", SUBNET),
        ("network", "networks", NETWORK),
        ("router", "routers", ROUTER),
    ] {
        registry.register(
            ResourceKind::new("neutron", resource, order)
                .tenant()
                .synchronized(),
            neutron(collection),
        )?;
    }
    registry.register(
        ResourceKind::new("neutron", "security_group", SECURITY_GROUP)
            .tenant()
            .synchronized(),
        neutron("security_groups").exclude(is_default_group),
    )?;
    registry.register(
        ResourceKind::new("neutron", "quota", QUOTA)
            .admin_required()
            .tenant()
            .synchronized(),
        QuotaResource::new("neutron"),
    )
}

/// Floating IPs have no name. Deployments without a network service in the
/// catalog list nothing and make no backend call.
#[derive(Debug, Clone)]
pub struct FloatingIp {
    floatingips: ServiceResource,
}

impl FloatingIp {
    pub fn new() -> Self {
        Self {
            floatingips: neutron("floatingips").anonymous(),
        }
    }
}

impl Default for FloatingIp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for FloatingIp {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        if !ctx.identity()?.has_service(service_types::NETWORK) {
            debug!(
                event = "core.manager.list_skipped_no_network",
                kind = %ctx.kind()
            );
            return Ok(Vec::new());
        }
        self.floatingips.list(ctx).await
    }

    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        self.floatingips.name(ctx, raw)
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        self.floatingips.delete(ctx, raw).await
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        self.floatingips.is_deleted(ctx, raw).await
    }
}

/// Ports, including the ones created implicitly for router interfaces and
/// gateways.
///
/// Implicit ports carry no name of their own; they are labelled with their
/// router's name. Router-owned ports are detached through the router instead
/// of being deleted directly.
#[derive(Debug, Clone)]
pub struct NeutronPort {
    ports: ServiceResource,
    routers: ServiceResource,
}

impl NeutronPort {
    pub fn new() -> Self {
        Self {
            ports: neutron("ports"),
            routers: neutron("routers"),
        }
    }

    fn is_router_owned(owner: Option<&str>) -> bool {
        owner.is_some_and(|o| ROUTER_INTERFACE_OWNERS.contains(&o) || o == ROUTER_GATEWAY_OWNER)
    }
}

impl Default for NeutronPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for NeutronPort {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let client = ctx.client()?;
        let mut ports = self.ports.list(ctx).await?;

        let needs_parent = ports.iter().any(|p| {
            p.str_field("name").is_none_or(str::is_empty)
                && Self::is_router_owned(p.str_field("device_owner"))
        });
        if !needs_parent {
            return Ok(ports);
        }

        let routers = self
            .routers
            .fetch_all(client.as_ref(), self.routers.collection(), ListQuery::new())
            .await
            .map_err(|e| ServiceResource::discovery_error(ctx, e))?;
        let routers = capabilities::tenant_filtered(
            routers.into_iter().map(RawResource::new).collect(),
            OWNER_FIELD,
            ctx.tenant_id(),
        );
        let router_names: HashMap<String, String> = routers
            .iter()
            .filter_map(|r| Some((r.scalar_field("id")?, r.str_field("name")?.to_string())))
            .collect();

        for port in &mut ports {
            let unnamed = port.str_field("name").is_none_or(str::is_empty);
            if !unnamed || !Self::is_router_owned(port.str_field("device_owner")) {
                continue;
            }
            let parent = port
                .str_field("device_id")
                .and_then(|device| router_names.get(device))
                .cloned();
            if let Some(parent) = parent {
                port.set("parent_name", parent);
            }
        }

        Ok(ports)
    }

    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        match raw.str_field("parent_name") {
            Some(parent) if !parent.is_empty() => DisplayName::Named(parent.to_string()),
            _ => self.ports.name(ctx, raw),
        }
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let id = self.identify(ctx, raw)?;
        let client = ctx.client()?;
        let owner = raw.str_field("device_owner");

        if !Self::is_router_owned(owner) {
            let status = self.ports.delete_id(ctx, client.as_ref(), id.as_str()).await?;
            if status == DeleteStatus::AlreadyGone {
                debug!(
                    event = "core.manager.port_already_gone",
                    id = %id
                );
            }
            return Ok(status);
        }

        let router_id = raw.str_field("device_id").unwrap_or_default();
        if owner == Some(ROUTER_GATEWAY_OWNER) {
            match client
                .perform("routers", router_id, &Action::RemoveRouterGateway)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    return Err(precondition_error(
                        ctx,
                        id.as_str(),
                        "remove_router_gateway",
                        e,
                    ));
                }
            }
        }

        let action = Action::RemoveRouterInterface {
            port_id: id.to_string(),
        };
        match client.perform("routers", router_id, &action).await {
            Ok(()) => Ok(DeleteStatus::Accepted),
            Err(e) if e.is_not_found() => {
                debug!(
                    event = "core.manager.port_already_gone",
                    id = %id,
                    router_id = router_id
                );
                Ok(DeleteStatus::AlreadyGone)
            }
            Err(source) => Err(ManagerError::Delete {
                kind: ctx.kind().key(),
                id: id.to_string(),
                source,
            }),
        }
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        self.ports.is_deleted(ctx, raw).await
    }
}
