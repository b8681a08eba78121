//! Data processing kinds. Clusters are torn down asynchronously; everything
//! else is gone once the delete call returns.

use super::{PROJECT_FIELD, tenant_resource};
use crate::managers::DeletionCheck;
use crate::registry::{Registry, RegistryError, ResourceKind};

const JOB_EXECUTIONS: u32 = 600;
const JOBS: u32 = 601;
const JOB_BINARY_INTERNALS: u32 = 602;
const JOB_BINARIES: u32 = 603;
const DATA_SOURCES: u32 = 604;
const CLUSTERS: u32 = 605;
const CLUSTER_TEMPLATES: u32 = 606;
const NODE_GROUP_TEMPLATES: u32 = 607;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    let synchronized = [
        ("job_executions", JOB_EXECUTIONS),
        ("jobs", JOBS),
        ("job_binary_internals", JOB_BINARY_INTERNALS),
        ("job_binaries", JOB_BINARIES),
        ("data_sources", DATA_SOURCES),
    ];
    for (resource, order) in synchronized {
        registry.register(
            ResourceKind::new("sahara", resource, order).tenant().synchronized(),
            tenant_resource("sahara", resource, PROJECT_FIELD),
        )?;
    }

    registry.register(
        ResourceKind::new("sahara", "clusters", CLUSTERS).tenant(),
        tenant_resource("sahara", "clusters", PROJECT_FIELD)
            .deletion_check(DeletionCheck::NotFound),
    )?;

    for (resource, order) in [
        ("cluster_templates", CLUSTER_TEMPLATES),
        ("node_group_templates", NODE_GROUP_TEMPLATES),
    ] {
        registry.register(
            ResourceKind::new("sahara", resource, order).tenant().synchronized(),
            tenant_resource("sahara", resource, PROJECT_FIELD),
        )?;
    }
    Ok(())
}
