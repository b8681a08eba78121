//! Identity kinds. These run last so that everything owned by a project is
//! gone before the project itself.

use async_trait::async_trait;

use crate::clients::ListQuery;
use crate::managers::{
    DeleteStatus, DeletionState, DisplayName, KindContext, ManagerError, RawResource, ResourceId,
    ResourceManager, ServiceResource,
};
use crate::registry::{Registry, RegistryError, ResourceKind};

const USERS: u32 = 9000;
const PROJECTS: u32 = 9001;
const SERVICES: u32 = 9002;
const ROLES: u32 = 9003;
const EC2_CREDENTIALS: u32 = 9004;

/// Placeholder id; credentials are only addressable by their access key.
const EC2_ID: &str = "n/a";

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    for (resource, collection, order) in [
        ("user", "users", USERS),
        ("project", "projects", PROJECTS),
        ("service", "services", SERVICES),
        ("role", "roles", ROLES),
    ] {
        registry.register(
            ResourceKind::new("keystone", resource, order)
                .admin_only()
                .synchronized(),
            ServiceResource::new("keystone", collection),
        )?;
    }
    registry.register(
        ResourceKind::new("keystone", "ec2", EC2_CREDENTIALS)
            .tenant()
            .synchronized(),
        Ec2Credentials,
    )
}

/// EC2 credentials of the scope's user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ec2Credentials;

impl Ec2Credentials {
    fn collection(ctx: &KindContext) -> Result<String, ManagerError> {
        let user_id = ctx.user()?.user_id().ok_or_else(|| ManagerError::MissingField {
            kind: ctx.kind().key(),
            field: "user_id".to_string(),
        })?;
        Ok(format!("users/{user_id}/credentials/OS-EC2"))
    }
}

#[async_trait]
impl ResourceManager for Ec2Credentials {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let collection = Self::collection(ctx)?;
        let client = ctx.client()?;
        let listing = ServiceResource::new("keystone", "credentials");
        let records = listing
            .fetch_all(client.as_ref(), &collection, ListQuery::new())
            .await
            .map_err(|e| ServiceResource::discovery_error(ctx, e))?;
        Ok(records.into_iter().map(RawResource::new).collect())
    }

    fn identify(&self, _ctx: &KindContext, _raw: &RawResource) -> Result<ResourceId, ManagerError> {
        Ok(ResourceId::new(EC2_ID))
    }

    fn name(&self, ctx: &KindContext, _raw: &RawResource) -> DisplayName {
        DisplayName::Anonymous(ctx.kind().resource.to_string())
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let access = raw
            .scalar_field("access")
            .ok_or_else(|| ManagerError::MissingField {
                kind: ctx.kind().key(),
                field: "access".to_string(),
            })?;
        let collection = Self::collection(ctx)?;
        let client = ctx.client()?;
        ServiceResource::delete_record(ctx, client.as_ref(), &collection, &access).await
    }

    async fn is_deleted(
        &self,
        _ctx: &KindContext,
        _raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        Ok(DeletionState::NotFound)
    }
}
