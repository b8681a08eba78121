use super::{PROJECT_FIELD, tenant_resource};
use crate::registry::{Registry, RegistryError, ResourceKind};

const ALARMS: u32 = 700;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("ceilometer", "alarms", ALARMS)
            .tenant()
            .synchronized(),
        tenant_resource("ceilometer", "alarms", PROJECT_FIELD).id_field("alarm_id"),
    )
}
