use super::{PROJECT_FIELD, tenant_resource};
use crate::managers::Pagination;
use crate::registry::{Registry, RegistryError, ResourceKind};

const CLUSTERS: u32 = 80;
const CLUSTER_TEMPLATES: u32 = 81;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    for (resource, order) in [("clusters", CLUSTERS), ("cluster_templates", CLUSTER_TEMPLATES)] {
        registry.register(
            ResourceKind::new("magnum", resource, order).tenant(),
            tenant_resource("magnum", resource, PROJECT_FIELD)
                .id_field("uuid")
                .paginate(Pagination::LastItem { field: "uuid" }),
        )?;
    }
    Ok(())
}
