//! Images.
//!
//! The image API refuses to delete a deactivated image, so such images are
//! reactivated first. Deletion then blocks until the image is confirmed gone,
//! using the image confirmation settings rather than the generic ones.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use super::precondition_error;
use crate::clients::Action;
use crate::managers::{
    DeleteStatus, DeletionState, KindContext, ManagerError, RawResource, ResourceManager,
    ServiceResource,
};
use crate::poller::{self, DeletionOutcome};
use crate::registry::{Registry, RegistryError, ResourceKind};

const IMAGES: u32 = 500;

const OWNER_FIELD: &str = "owner";
const DEACTIVATED: &str = "deactivated";

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("glance", "images", IMAGES).tenant(),
        GlanceImage::new(),
    )
}

#[derive(Debug, Clone)]
pub struct GlanceImage {
    images: ServiceResource,
    deactivated: ServiceResource,
}

impl GlanceImage {
    pub fn new() -> Self {
        let images = super::tenant_resource("glance", "images", OWNER_FIELD);
        Self {
            deactivated: images.clone().query("status", DEACTIVATED),
            images,
        }
    }
}

impl Default for GlanceImage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceManager for GlanceImage {
    /// Active images plus deactivated ones, which some deployments only
    /// return when asked for by status.
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let mut images = self.images.list(ctx).await?;
        let mut seen: HashSet<String> =
            images.iter().filter_map(|i| i.scalar_field("id")).collect();

        for image in self.deactivated.list(ctx).await? {
            if image.scalar_field("id").is_some_and(|id| seen.insert(id)) {
                images.push(image);
            }
        }
        Ok(images)
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let id = self.identify(ctx, raw)?;
        let identity = ctx.admin_or_user()?;
        let client = ctx.client_of(identity, self.images.service())?;

        if raw.str_field("status") == Some(DEACTIVATED) {
            debug!(event = "core.manager.image_reactivate_started", id = %id);
            match client
                .perform(self.images.collection(), id.as_str(), &Action::Reactivate)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_not_found() => return Ok(DeleteStatus::AlreadyGone),
                Err(e) => return Err(precondition_error(ctx, id.as_str(), "reactivate", e)),
            }
        }

        let status = self
            .images
            .delete_id(ctx, client.as_ref(), id.as_str())
            .await?;
        if status == DeleteStatus::AlreadyGone {
            return Ok(status);
        }

        let settings = ctx.poll();
        match poller::wait_until_deleted(self, ctx, raw, settings).await {
            DeletionOutcome::Deleted | DeletionOutcome::AlreadyGone => Ok(DeleteStatus::Confirmed),
            DeletionOutcome::TimedOut => Err(ManagerError::ConfirmTimeout {
                kind: ctx.kind().key(),
                id: id.to_string(),
                timeout: settings.timeout,
            }),
            DeletionOutcome::Failed(message) => Err(ManagerError::ConfirmFailed {
                kind: ctx.kind().key(),
                id: id.to_string(),
                message,
            }),
        }
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        let id = self.identify(ctx, raw)?;
        let identity = ctx.admin_or_user()?;
        let client = ctx.client_of(identity, self.images.service())?;
        let lookup = client.get(self.images.collection(), id.as_str()).await;
        self.images.state_from_lookup(ctx, id.as_str(), lookup)
    }
}
