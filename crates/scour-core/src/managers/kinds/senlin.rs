use super::{PROJECT_FIELD, tenant_resource};
use crate::managers::ServiceResource;
use crate::registry::{Registry, RegistryError, ResourceKind};

const CLUSTERS: u32 = 150;
const PROFILES: u32 = 151;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("senlin", "clusters", CLUSTERS).admin_required(),
        ServiceResource::new("senlin", "clusters"),
    )?;
    registry.register(
        ResourceKind::new("senlin", "profiles", PROFILES).tenant(),
        tenant_resource("senlin", "profiles", PROJECT_FIELD),
    )
}
