use super::{PROJECT_FIELD, tenant_resource};
use crate::managers::RawResource;
use crate::registry::{Registry, RegistryError, ResourceKind};

const ENVIRONMENTS: u32 = 1200;
const PACKAGES: u32 = 1201;

/// Ships with the catalog and must survive cleanup.
const CORE_LIBRARY: &str = "Core library";

fn is_core_library(package: &RawResource) -> bool {
    package.str_field("name") == Some(CORE_LIBRARY)
}

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("murano", "environments", ENVIRONMENTS)
            .tenant()
            .synchronized(),
        tenant_resource("murano", "environments", PROJECT_FIELD),
    )?;
    registry.register(
        ResourceKind::new("murano", "packages", PACKAGES).tenant(),
        tenant_resource("murano", "packages", PROJECT_FIELD).exclude(is_core_library),
    )
}
