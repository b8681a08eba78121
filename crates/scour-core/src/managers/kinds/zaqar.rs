use crate::managers::ServiceResource;
use crate::registry::{Registry, RegistryError, ResourceKind};

const QUEUES: u32 = 800;

/// Queues are addressed by name and live in the caller's own project, so no
/// tenant filter applies.
pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("zaqar", "queues", QUEUES).tenant().synchronized(),
        ServiceResource::new("zaqar", "queues").id_field("name"),
    )
}
