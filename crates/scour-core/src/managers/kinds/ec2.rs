//! EC2-compatible instances.
//!
//! A terminated instance may stay listed for a while; it reports
//! [`DeletionState::Terminated`](crate::managers::DeletionState) while an
//! instance the API no longer knows (`InvalidInstanceID.NotFound`) reports
//! `NotFound`. Any other API error is surfaced to the poller.

use crate::managers::ServiceResource;
use crate::registry::{Registry, RegistryError, ResourceKind};

const SERVERS: u32 = 250;

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("ec2", "servers", SERVERS),
        ServiceResource::new("ec2", "instances").status_field("state"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::BackendError;
    use crate::managers::{DeletionState, RawResource, ResourceManager};
    use crate::memory::MemoryCloud;
    use crate::test_support::{context, user_scope};
    use serde_json::json;

    fn instances() -> ServiceResource {
        ServiceResource::new("ec2", "instances").status_field("state")
    }

    #[tokio::test]
    async fn test_terminated_and_not_found_are_distinct() {
        let cloud = MemoryCloud::new();
        cloud.insert("ec2", "instances", json!({"id": "i-1", "state": "terminated"}));
        cloud.insert("ec2", "instances", json!({"id": "i-2", "state": "running"}));
        let ctx = context(ResourceKind::new("ec2", "servers", SERVERS), user_scope(&cloud, None));
        let manager = instances();

        let terminated = RawResource::new(json!({"id": "i-1"}));
        let running = RawResource::new(json!({"id": "i-2"}));
        let gone = RawResource::new(json!({"id": "i-3"}));

        assert_eq!(
            manager.is_deleted(&ctx, &terminated).await.unwrap(),
            DeletionState::Terminated
        );
        assert_eq!(
            manager.is_deleted(&ctx, &running).await.unwrap(),
            DeletionState::Present
        );
        assert_eq!(
            manager.is_deleted(&ctx, &gone).await.unwrap(),
            DeletionState::NotFound
        );
    }

    #[test]
    fn test_vendor_not_found_code_is_not_found() {
        let error = BackendError::Api {
            status: 400,
            code: Some("InvalidInstanceID.NotFound".to_string()),
            message: "The instance ID 'i-3' does not exist".to_string(),
        };
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_other_api_errors_propagate() {
        let cloud = MemoryCloud::new();
        cloud.insert("ec2", "instances", json!({"id": "i-1", "state": "running"}));
        cloud.fail_get("ec2", "instances", 1);
        let ctx = context(ResourceKind::new("ec2", "servers", SERVERS), user_scope(&cloud, None));

        let result = instances()
            .is_deleted(&ctx, &RawResource::new(json!({"id": "i-1"})))
            .await;
        assert!(result.is_err());
    }
}
