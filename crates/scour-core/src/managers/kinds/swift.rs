//! Object storage kinds.
//!
//! Objects and containers have no ids of their own; a resource is its path
//! inside the account. The raw record is the path as a JSON array of
//! segments, `["container"]` or `["container", "object"]`.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::clients::{ListQuery, ServiceClient};
use crate::managers::{
    DeleteStatus, DeletionState, DisplayName, KindContext, ManagerError, RawResource, ResourceId,
    ResourceManager, ServiceResource,
};
use crate::registry::{Registry, RegistryError, ResourceKind};

const OBJECTS: u32 = 1000;
const CONTAINERS: u32 = 1001;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("swift", "object", OBJECTS)
            .tenant()
            .synchronized(),
        SwiftObject::new(),
    )?;
    registry.register(
        ResourceKind::new("swift", "container", CONTAINERS)
            .tenant()
            .synchronized(),
        SwiftContainer::new(),
    )
}

fn objects_collection(container: &str) -> String {
    format!("containers/{container}/objects")
}

fn segments(raw: &RawResource) -> Vec<&str> {
    raw.value()
        .as_array()
        .map(|parts| parts.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn path_id(ctx: &KindContext, raw: &RawResource) -> Result<ResourceId, ManagerError> {
    let parts = segments(raw);
    if parts.is_empty() {
        return Err(ManagerError::MissingField {
            kind: ctx.kind().key(),
            field: "path".to_string(),
        });
    }
    Ok(ResourceId::new(parts.join("/")))
}

fn path_name(ctx: &KindContext, raw: &RawResource) -> DisplayName {
    match segments(raw).last() {
        Some(last) => DisplayName::Named((*last).to_string()),
        None => DisplayName::Anonymous(ctx.kind().resource.to_string()),
    }
}

/// Names of every container in the account.
async fn container_names(
    ctx: &KindContext,
    client: &dyn ServiceClient,
    containers: &ServiceResource,
) -> Result<Vec<String>, ManagerError> {
    let records = containers
        .fetch_all(client, containers.collection(), ListQuery::new())
        .await
        .map_err(|e| ServiceResource::discovery_error(ctx, e))?;
    Ok(records
        .iter()
        .filter_map(|r| r.get("name").and_then(Value::as_str).map(str::to_string))
        .collect())
}

#[derive(Debug, Clone)]
pub struct SwiftContainer {
    containers: ServiceResource,
}

impl SwiftContainer {
    pub fn new() -> Self {
        Self {
            containers: ServiceResource::new("swift", "containers"),
        }
    }
}

impl Default for SwiftContainer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for SwiftContainer {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let client = ctx.client()?;
        let names = container_names(ctx, client.as_ref(), &self.containers).await?;
        Ok(names
            .into_iter()
            .map(|name| RawResource::new(json!([name])))
            .collect())
    }

    fn identify(&self, ctx: &KindContext, raw: &RawResource) -> Result<ResourceId, ManagerError> {
        path_id(ctx, raw)
    }

    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        path_name(ctx, raw)
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let id = self.identify(ctx, raw)?;
        let client = ctx.client()?;
        let collection = self.containers.collection();
        ServiceResource::delete_record(ctx, client.as_ref(), collection, id.as_str()).await
    }

    async fn is_deleted(
        &self,
        _ctx: &KindContext,
        _raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        Ok(DeletionState::NotFound)
    }
}

#[derive(Debug, Clone)]
pub struct SwiftObject {
    containers: ServiceResource,
}

impl SwiftObject {
    pub fn new() -> Self {
        Self {
            containers: ServiceResource::new("swift", "containers"),
        }
    }
}

impl Default for SwiftObject {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for SwiftObject {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let client = ctx.client()?;
        let mut objects = Vec::new();

        for container in container_names(ctx, client.as_ref(), &self.containers).await? {
            let records = self
                .containers
                .fetch_all(client.as_ref(), &objects_collection(&container), ListQuery::new())
                .await
                .map_err(|e| ServiceResource::discovery_error(ctx, e))?;
            objects.extend(
                records
                    .iter()
                    .filter_map(|r| r.get("name").and_then(Value::as_str))
                    .map(|object| RawResource::new(json!([container, object]))),
            );
        }
        Ok(objects)
    }

    fn identify(&self, ctx: &KindContext, raw: &RawResource) -> Result<ResourceId, ManagerError> {
        path_id(ctx, raw)
    }

    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        path_name(ctx, raw)
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let parts = segments(raw);
        let [container, object] = parts.as_slice() else {
            return Err(ManagerError::MissingField {
                kind: ctx.kind().key(),
                field: "path".to_string(),
            });
        };
        let client = ctx.client()?;
        ServiceResource::delete_record(ctx, client.as_ref(), &objects_collection(container), object)
            .await
    }

    async fn is_deleted(
        &self,
        _ctx: &KindContext,
        _raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        Ok(DeletionState::NotFound)
    }
}
