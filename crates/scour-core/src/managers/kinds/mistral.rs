use super::{PROJECT_FIELD, tenant_resource};
use crate::registry::{Registry, RegistryError, ResourceKind};

const WORKBOOKS: u32 = 1100;
const WORKFLOWS: u32 = 1101;
const EXECUTIONS: u32 = 1102;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    // Workbooks are deleted by name, not id
    registry.register(
        ResourceKind::new("mistral", "workbooks", WORKBOOKS)
            .tenant()
            .synchronized(),
        tenant_resource("mistral", "workbooks", PROJECT_FIELD).delete_by("name"),
    )?;
    for (resource, order) in [("workflows", WORKFLOWS), ("executions", EXECUTIONS)] {
        registry.register(
            ResourceKind::new("mistral", resource, order).tenant().synchronized(),
            tenant_resource("mistral", resource, PROJECT_FIELD),
        )?;
    }
    Ok(())
}
