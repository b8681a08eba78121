use super::{PROJECT_FIELD, tenant_resource};
use crate::registry::{Registry, RegistryError, ResourceKind};

const SHARES: u32 = 450;
const SHARE_NETWORKS: u32 = 451;
const SECURITY_SERVICES: u32 = 452;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    for (resource, order) in [
        ("shares", SHARES),
        ("share_networks", SHARE_NETWORKS),
        ("security_services", SECURITY_SERVICES),
    ] {
        registry.register(
            ResourceKind::new("manila", resource, order).tenant(),
            tenant_resource("manila", resource, PROJECT_FIELD),
        )?;
    }
    Ok(())
}
