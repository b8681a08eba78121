//! Resource manager trait definition.

use async_trait::async_trait;

use super::context::KindContext;
use super::errors::ManagerError;
use super::types::{DeleteStatus, DeletionState, DisplayName, RawResource, ResourceId};

/// Behavior of one resource kind.
///
/// A single manager value is registered per kind and shared by every worker;
/// the per-scope binding travels in [`KindContext`] and the per-resource
/// binding in [`RawResource`].
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Enumerate every live resource of this kind visible in the scope.
    ///
    /// Paginated backends are drained completely before returning.
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError>;

    /// Backend identifier of a listed resource. Defaults to the `id` field.
    fn identify(&self, ctx: &KindContext, raw: &RawResource) -> Result<ResourceId, ManagerError> {
        raw.scalar_field("id")
            .map(ResourceId::from)
            .ok_or_else(|| ManagerError::MissingField {
                kind: ctx.kind().key(),
                field: "id".to_string(),
            })
    }

    /// Label for reporting. Defaults to the `name` field.
    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        DisplayName::from_field(raw, "name", ctx.kind().resource)
    }

    /// Issue the deletion, running any precondition steps first.
    ///
    /// Not-found answers from the backend are reported as
    /// [`DeleteStatus::AlreadyGone`], never as errors.
    async fn delete(&self, ctx: &KindContext, raw: &RawResource)
    -> Result<DeleteStatus, ManagerError>;

    /// Re-query the backend for this resource's state.
    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError>;
}
