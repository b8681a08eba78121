use super::{PROJECT_FIELD, tenant_resource};
use crate::registry::{Registry, RegistryError, ResourceKind};

const STACKS: u32 = 100;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("heat", "stacks", STACKS).tenant(),
        tenant_resource("heat", "stacks", PROJECT_FIELD).name_field("stack_name"),
    )
}
