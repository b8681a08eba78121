//! Infrastructure optimization kinds. Their records carry no tenant and are
//! keyed by uuid; deletion is confirmed by the record disappearing.

use crate::managers::{DeletionCheck, ServiceResource};
use crate::registry::{Registry, RegistryError, ResourceKind};

const AUDIT_TEMPLATES: u32 = 1500;
const ACTION_PLANS: u32 = 1501;
const AUDITS: u32 = 1502;

fn watcher(collection: &'static str) -> ServiceResource {
    ServiceResource::new("watcher", collection)
        .id_field("uuid")
        .deletion_check(DeletionCheck::NotFound)
}

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("watcher", "audit_template", AUDIT_TEMPLATES).admin_only(),
        watcher("audit_templates"),
    )?;
    registry.register(
        ResourceKind::new("watcher", "action_plan", ACTION_PLANS).admin_only(),
        watcher("action_plans").anonymous(),
    )?;
    registry.register(
        ResourceKind::new("watcher", "audit", AUDITS).admin_only(),
        watcher("audits").name_field("uuid"),
    )
}
