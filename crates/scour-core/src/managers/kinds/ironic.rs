use crate::managers::ServiceResource;
use crate::registry::{Registry, RegistryError, ResourceKind};

const NODES: u32 = 1300;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("ironic", "node", NODES).admin_only(),
        ServiceResource::new("ironic", "nodes").id_field("uuid"),
    )
}
