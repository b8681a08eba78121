//! Built-in kinds, one module per backend family.
//!
//! Each family declares its kinds with explicit order constants and binds a
//! manager to each. Most managers are a configured
//! [`ServiceResource`](super::ServiceResource); kinds with preconditions or
//! unusual records get their own type next to the table.

mod ceilometer;
mod cinder;
mod designate;
mod ec2;
mod glance;
mod heat;
mod ironic;
mod keystone;
mod magnum;
mod manila;
mod mistral;
mod murano;
mod neutron;
mod nova;
mod sahara;
mod senlin;
mod swift;
mod watcher;
mod zaqar;

pub use cinder::ImageVolumeCache;
pub use glance::GlanceImage;
pub use keystone::Ec2Credentials;
pub use neutron::{FloatingIp, NeutronPort, ROUTER_GATEWAY_OWNER, ROUTER_INTERFACE_OWNERS};
pub use nova::{NovaAggregate, NovaServer};
pub use swift::{SwiftContainer, SwiftObject};

use super::adapter::ServiceResource;
use super::context::KindContext;
use super::errors::ManagerError;
use crate::clients::BackendError;
use crate::registry::{Registry, RegistryError};

/// Owner field of most non-network records.
pub(crate) const PROJECT_FIELD: &str = "project_id";

/// Adapter for a collection whose records name their tenant in `owner_field`.
///
/// The tenant is passed to the list call and checked again on the results.
pub(crate) fn tenant_resource(
    service: &'static str,
    collection: &'static str,
    owner_field: &'static str,
) -> ServiceResource {
    ServiceResource::new(service, collection)
        .tenant_query(owner_field)
        .owned_by(owner_field)
}

pub(crate) fn precondition_error(
    ctx: &KindContext,
    id: &str,
    step: &str,
    source: BackendError,
) -> ManagerError {
    ManagerError::Precondition {
        kind: ctx.kind().key(),
        id: id.to_string(),
        step: step.to_string(),
        source,
    }
}

/// Register every built-in kind.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
    magnum::register(registry)?;
    heat::register(registry)?;
    senlin::register(registry)?;
    nova::register(registry)?;
    ec2::register(registry)?;
    neutron::register(registry)?;
    cinder::register(registry)?;
    manila::register(registry)?;
    glance::register(registry)?;
    sahara::register(registry)?;
    ceilometer::register(registry)?;
    zaqar::register(registry)?;
    designate::register(registry)?;
    swift::register(registry)?;
    mistral::register(registry)?;
    murano::register(registry)?;
    ironic::register(registry)?;
    watcher::register(registry)?;
    keystone::register(registry)?;
    Ok(())
}
