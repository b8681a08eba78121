use std::sync::Arc;

use async_trait::async_trait;

use super::errors::BackendError;
use super::types::{Action, ListQuery, Page, Record};

/// Client for one backend family (compute, network, image, ...).
///
/// Collections are addressed by their backend-local plural name
/// (`servers`, `ports`, `containers/<name>/objects`). Implementations must
/// be safe to share across the workers of a kind.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// Fetch one page of a collection.
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Page, BackendError>;

    /// Fetch a single record, `BackendError::NotFound` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Record, BackendError>;

    /// Issue the deletion call for a single record.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError>;

    /// Perform a non-delete action on a single record.
    async fn perform(&self, collection: &str, id: &str, action: &Action)
    -> Result<(), BackendError>;

    /// Aliases of the API extensions this endpoint advertises.
    async fn list_extensions(&self) -> Result<Vec<String>, BackendError>;
}

/// An authenticated identity (admin or user) that hands out service clients.
pub trait Session: Send + Sync {
    /// Client for a backend family, `None` when the identity cannot reach it.
    fn client(&self, service: &str) -> Option<Arc<dyn ServiceClient>>;

    /// Service types advertised in this identity's catalog.
    fn catalog(&self) -> Vec<String>;

    /// The user id this session is authenticated as.
    fn user_id(&self) -> Option<String>;

    fn has_service(&self, service_type: &str) -> bool {
        self.catalog().iter().any(|s| s == service_type)
    }
}
