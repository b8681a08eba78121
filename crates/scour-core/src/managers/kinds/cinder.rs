//! Block storage kinds.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use super::{PROJECT_FIELD, tenant_resource};
use crate::clients::ListQuery;
use crate::managers::capabilities::QuotaResource;
use crate::managers::{
    DeleteStatus, DeletionState, DisplayName, KindContext, ManagerError, RawResource, ResourceId,
    ResourceManager, ServiceResource,
};
use crate::registry::{Registry, RegistryError, ResourceKind};

const BACKUPS: u32 = 400;
const VOLUME_TYPES: u32 = 401;
const VOLUME_SNAPSHOTS: u32 = 402;
const TRANSFERS: u32 = 403;
const VOLUMES: u32 = 404;
const IMAGE_VOLUMES_CACHE: u32 = 405;
const QUOTAS: u32 = 406;
const QOS_SPECS: u32 = 407;

/// Cache volumes are named after the image they hold.
const CACHE_VOLUME_PREFIX: &str = "image-";

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    let tenant_kinds = [
        ("backups", BACKUPS),
        ("volume_snapshots", VOLUME_SNAPSHOTS),
        ("transfers", TRANSFERS),
        ("volumes", VOLUMES),
    ];
    let admin_kinds = [("volume_types", VOLUME_TYPES), ("qos_specs", QOS_SPECS)];

    for (resource, order) in tenant_kinds {
        registry.register(
            ResourceKind::new("cinder", resource, order).tenant(),
            tenant_resource("cinder", resource, PROJECT_FIELD),
        )?;
    }
    for (resource, order) in admin_kinds {
        registry.register(
            ResourceKind::new("cinder", resource, order).admin_only(),
            ServiceResource::new("cinder", resource),
        )?;
    }
    registry.register(
        ResourceKind::new("cinder", "image_volumes_cache", IMAGE_VOLUMES_CACHE).admin_only(),
        ImageVolumeCache::new(),
    )?;
    registry.register(
        ResourceKind::new("cinder", "quotas", QUOTAS)
            .admin_required()
            .tenant()
            .synchronized(),
        QuotaResource::new("cinder"),
    )
}

/// Volumes cinder keeps as an image cache, across every tenant.
///
/// Each listed record pairs the volume with its image:
/// `{"volume": {...}, "image": {...}}`. The id is the volume's, the name the
/// image's.
#[derive(Debug, Clone)]
pub struct ImageVolumeCache {
    volumes: ServiceResource,
    images: ServiceResource,
}

impl ImageVolumeCache {
    pub fn new() -> Self {
        Self {
            volumes: ServiceResource::new("cinder", "volumes"),
            images: ServiceResource::new("glance", "images"),
        }
    }

    fn volume(raw: &RawResource) -> RawResource {
        RawResource::new(raw.field("volume").cloned().unwrap_or_default())
    }
}

impl Default for ImageVolumeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for ImageVolumeCache {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let admin = ctx.admin()?;
        let glance = ctx.client_of(admin, self.images.service())?;
        let cinder = ctx.client_of(admin, self.volumes.service())?;

        let images = self
            .images
            .fetch_all(glance.as_ref(), self.images.collection(), ListQuery::new())
            .await
            .map_err(|e| ServiceResource::discovery_error(ctx, e))?;
        let by_volume_name: HashMap<String, serde_json::Value> = images
            .into_iter()
            .filter_map(|image| {
                let id = RawResource::new(image.clone()).scalar_field("id")?;
                Some((format!("{CACHE_VOLUME_PREFIX}{id}"), image))
            })
            .collect();

        let volumes = self
            .volumes
            .fetch_all(
                cinder.as_ref(),
                self.volumes.collection(),
                ListQuery::new().filter("all_tenants", "1"),
            )
            .await
            .map_err(|e| ServiceResource::discovery_error(ctx, e))?;

        Ok(volumes
            .into_iter()
            .filter_map(|volume| {
                let name = volume.get("name")?.as_str()?;
                let image = by_volume_name.get(name)?.clone();
                Some(RawResource::new(json!({"volume": volume, "image": image})))
            })
            .collect())
    }

    fn identify(&self, ctx: &KindContext, raw: &RawResource) -> Result<ResourceId, ManagerError> {
        self.volumes.identify(ctx, &Self::volume(raw))
    }

    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        let image = RawResource::new(raw.field("image").cloned().unwrap_or_default());
        DisplayName::from_field(&image, "name", ctx.kind().resource)
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        self.volumes.delete(ctx, &Self::volume(raw)).await
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        self.volumes.is_deleted(ctx, &Self::volume(raw)).await
    }
}
