//! Reusable manager for kinds that map onto one backend collection.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::capabilities;
use super::context::KindContext;
use super::errors::ManagerError;
use super::traits::ResourceManager;
use super::types::{DeleteStatus, DeletionState, DisplayName, RawResource, ResourceId};
use crate::clients::{BackendError, ListQuery, Record, ServiceClient};

/// Statuses that count as deleted when the backend still returns the record.
const TERMINAL_STATUSES: &[&str] = &["deleted", "delete_complete", "terminated"];

/// Default upper bound on pages fetched for one listing.
const MAX_PAGES: usize = 10_000;

/// How a collection is paged by its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Everything comes back in one response.
    Single,
    /// Follow `Page::next_marker` until the backend stops returning one.
    Marker { limit: Option<usize> },
    /// Pass the last item's `field` as marker until an empty page comes back.
    LastItem { field: &'static str },
}

/// How `is_deleted` decides that a resource is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionCheck {
    /// `get` by id; not-found or a terminal status means deleted.
    Status,
    /// `get` by id; only not-found means deleted.
    NotFound,
    /// `get` by display name; only not-found means deleted.
    NotFoundByName,
}

/// A kind backed by a single `(service, collection)` pair.
///
/// Capabilities are switched on with the builder methods when the kind is
/// declared; nothing is resolved by name at run time.
#[derive(Debug, Clone)]
pub struct ServiceResource {
    service: &'static str,
    collection: &'static str,
    pagination: Pagination,
    id_field: &'static str,
    name_field: Option<&'static str>,
    delete_field: Option<&'static str>,
    tenant_query: Option<&'static str>,
    owner_field: Option<&'static str>,
    static_filters: Vec<(&'static str, &'static str)>,
    required_extension: Option<&'static str>,
    name_prefix: Option<&'static str>,
    exclude: Option<fn(&RawResource) -> bool>,
    deletion_check: DeletionCheck,
    status_field: &'static str,
    max_pages: usize,
}

impl ServiceResource {
    pub fn new(service: &'static str, collection: &'static str) -> Self {
        Self {
            service,
            collection,
            pagination: Pagination::Single,
            id_field: "id",
            name_field: Some("name"),
            delete_field: None,
            tenant_query: None,
            owner_field: None,
            static_filters: Vec::new(),
            required_extension: None,
            name_prefix: None,
            exclude: None,
            deletion_check: DeletionCheck::Status,
            status_field: "status",
            max_pages: MAX_PAGES,
        }
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn id_field(mut self, field: &'static str) -> Self {
        self.id_field = field;
        self
    }

    pub fn name_field(mut self, field: &'static str) -> Self {
        self.name_field = Some(field);
        self
    }

    /// The backend type has no name field.
    pub fn anonymous(mut self) -> Self {
        self.name_field = None;
        self
    }

    /// Delete by this field instead of the identifier.
    pub fn delete_by(mut self, field: &'static str) -> Self {
        self.delete_field = Some(field);
        self
    }

    /// Pass the scope's tenant id to the list call under `key`.
    pub fn tenant_query(mut self, key: &'static str) -> Self {
        self.tenant_query = Some(key);
        self
    }

    /// Drop listed records whose `field` is not the scope's tenant id.
    pub fn owned_by(mut self, field: &'static str) -> Self {
        self.owner_field = Some(field);
        self
    }

    pub fn query(mut self, key: &'static str, value: &'static str) -> Self {
        self.static_filters.push((key, value));
        self
    }

    /// Skip listing when the endpoint does not advertise `alias`.
    pub fn requires_extension(mut self, alias: &'static str) -> Self {
        self.required_extension = Some(alias);
        self
    }

    /// Only list resources whose name starts with `prefix`.
    pub fn name_prefix(mut self, prefix: &'static str) -> Self {
        self.name_prefix = Some(prefix);
        self
    }

    /// Drop listed records for which `predicate` returns true.
    pub fn exclude(mut self, predicate: fn(&RawResource) -> bool) -> Self {
        self.exclude = Some(predicate);
        self
    }

    /// Stop listing after `pages` pages even if the backend offers more.
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn deletion_check(mut self, check: DeletionCheck) -> Self {
        self.deletion_check = check;
        self
    }

    /// Field holding the lifecycle state checked against terminal statuses.
    pub fn status_field(mut self, field: &'static str) -> Self {
        self.status_field = field;
        self
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Drain every page of `collection` into one finite sequence.
    pub async fn fetch_all(
        &self,
        client: &dyn ServiceClient,
        collection: &str,
        query: ListQuery,
    ) -> Result<Vec<Record>, BackendError> {
        let mut records = Vec::new();
        let mut marker: Option<String> = None;

        for page_number in 0..self.max_pages {
            let page = client
                .list(collection, &query.clone().with_marker(marker.clone()))
                .await?;

            let next = match self.pagination {
                Pagination::Single => None,
                Pagination::Marker { .. } => page.next_marker.clone(),
                Pagination::LastItem { field } => page
                    .items
                    .last()
                    .and_then(|item| RawResource::new(item.clone()).scalar_field(field)),
            };
            let empty = page.items.is_empty();
            records.extend(page.items);

            match next {
                Some(next) if !empty && marker.as_deref() != Some(next.as_str()) => {
                    marker = Some(next);
                }
                Some(next) if !empty => {
                    warn!(
                        event = "core.manager.pagination_marker_repeated",
                        collection = collection,
                        marker = next,
                        page = page_number
                    );
                    return Ok(records);
                }
                _ => return Ok(records),
            }
        }

        warn!(
            event = "core.manager.pagination_truncated",
            collection = collection,
            pages = self.max_pages,
            records = records.len()
        );
        Ok(records)
    }

    /// Whether the endpoint advertises an API extension.
    pub async fn supports_extension(
        &self,
        client: &dyn ServiceClient,
        alias: &str,
    ) -> Result<bool, BackendError> {
        let extensions = client.list_extensions().await?;
        Ok(extensions.iter().any(|e| e == alias))
    }

    fn list_query(&self, ctx: &KindContext) -> ListQuery {
        let mut query = ListQuery::new();
        for (key, value) in &self.static_filters {
            query = query.filter(*key, *value);
        }
        if let (Some(key), Some(tenant_id)) = (self.tenant_query, ctx.tenant_id()) {
            query = query.filter(key, tenant_id);
        }
        if let Pagination::Marker { limit } = self.pagination {
            query = query.with_limit(limit);
        }
        query
    }

    /// Apply the post-list capabilities (tenant filter, prefix, exclusions).
    pub fn post_filter(&self, ctx: &KindContext, records: Vec<Record>) -> Vec<RawResource> {
        let mut resources: Vec<RawResource> = records.into_iter().map(RawResource::new).collect();

        if let Some(field) = self.owner_field {
            resources = capabilities::tenant_filtered(resources, field, ctx.tenant_id());
        }
        if let Some(prefix) = self.name_prefix {
            let name_field = self.name_field.unwrap_or("name");
            resources = capabilities::with_name_prefix(resources, name_field, prefix);
        }
        if let Some(exclude) = self.exclude {
            resources.retain(|r| !exclude(r));
        }
        resources
    }

    pub fn discovery_error(ctx: &KindContext, source: BackendError) -> ManagerError {
        ManagerError::Discovery {
            kind: ctx.kind().key(),
            source,
        }
    }

    /// Delete `id` from this collection, mapping not-found to `AlreadyGone`.
    pub async fn delete_id(
        &self,
        ctx: &KindContext,
        client: &dyn ServiceClient,
        id: &str,
    ) -> Result<DeleteStatus, ManagerError> {
        Self::delete_record(ctx, client, self.collection, id).await
    }

    /// Delete `id` from an arbitrary collection, mapping not-found to `AlreadyGone`.
    pub async fn delete_record(
        ctx: &KindContext,
        client: &dyn ServiceClient,
        collection: &str,
        id: &str,
    ) -> Result<DeleteStatus, ManagerError> {
        match client.delete(collection, id).await {
            Ok(()) => Ok(DeleteStatus::Accepted),
            Err(e) if e.is_not_found() => {
                debug!(
                    event = "core.manager.delete_already_gone",
                    kind = %ctx.kind(),
                    id = id
                );
                Ok(DeleteStatus::AlreadyGone)
            }
            Err(source) => Err(ManagerError::Delete {
                kind: ctx.kind().key(),
                id: id.to_string(),
                source,
            }),
        }
    }

    /// Map a status lookup to a [`DeletionState`].
    pub fn state_from_lookup(
        &self,
        ctx: &KindContext,
        id: &str,
        lookup: Result<Record, BackendError>,
    ) -> Result<DeletionState, ManagerError> {
        match lookup {
            Err(e) if e.is_not_found() => Ok(DeletionState::NotFound),
            Err(source) => Err(ManagerError::Status {
                kind: ctx.kind().key(),
                id: id.to_string(),
                source,
            }),
            Ok(record) => {
                let terminal = self.deletion_check == DeletionCheck::Status
                    && record
                        .get(self.status_field)
                        .and_then(|s| s.as_str())
                        .is_some_and(|s| TERMINAL_STATUSES.contains(&s.to_lowercase().as_str()));
                if terminal {
                    Ok(DeletionState::Terminated)
                } else {
                    Ok(DeletionState::Present)
                }
            }
        }
    }
}

#[async_trait]
impl ResourceManager for ServiceResource {
    async fn list(&self, ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
        let client = ctx.client()?;

        if let Some(alias) = self.required_extension {
            let supported = self
                .supports_extension(client.as_ref(), alias)
                .await
                .map_err(|e| Self::discovery_error(ctx, e))?;
            if !supported {
                debug!(
                    event = "core.manager.list_skipped_extension",
                    kind = %ctx.kind(),
                    extension = alias
                );
                return Ok(Vec::new());
            }
        }

        let records = self
            .fetch_all(client.as_ref(), self.collection, self.list_query(ctx))
            .await
            .map_err(|e| Self::discovery_error(ctx, e))?;
        Ok(self.post_filter(ctx, records))
    }

    fn identify(&self, ctx: &KindContext, raw: &RawResource) -> Result<ResourceId, ManagerError> {
        raw.scalar_field(self.id_field)
            .map(ResourceId::from)
            .ok_or_else(|| ManagerError::MissingField {
                kind: ctx.kind().key(),
                field: self.id_field.to_string(),
            })
    }

    fn name(&self, ctx: &KindContext, raw: &RawResource) -> DisplayName {
        match self.name_field {
            Some(field) => DisplayName::from_field(raw, field, ctx.kind().resource),
            None => DisplayName::Anonymous(ctx.kind().resource.to_string()),
        }
    }

    async fn delete(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeleteStatus, ManagerError> {
        let key = match self.delete_field {
            Some(field) => raw
                .scalar_field(field)
                .ok_or_else(|| ManagerError::MissingField {
                    kind: ctx.kind().key(),
                    field: field.to_string(),
                })?,
            None => self.identify(ctx, raw)?.to_string(),
        };
        let client = ctx.client()?;
        self.delete_id(ctx, client.as_ref(), &key).await
    }

    async fn is_deleted(
        &self,
        ctx: &KindContext,
        raw: &RawResource,
    ) -> Result<DeletionState, ManagerError> {
        if ctx.kind().synchronized_deletion {
            return Ok(DeletionState::NotFound);
        }

        let key = match self.deletion_check {
            DeletionCheck::NotFoundByName => self.name(ctx, raw).to_string(),
            _ => self.identify(ctx, raw)?.to_string(),
        };
        let client = ctx.client()?;
        let lookup = client.get(self.collection, &key).await;
        self.state_from_lookup(ctx, &key, lookup)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::clients::{Action, Page};
    use crate::memory::MemoryCloud;
    use crate::registry::ResourceKind;
    use crate::test_support::{admin_scope, context, user_scope};
    use serde_json::json;

    /// Serves a fixed sequence of pages and records the markers it was asked for.
    struct PagedClient {
        pages: Mutex<Vec<Page>>,
        markers: Mutex<Vec<Option<String>>>,
    }

    impl PagedClient {
        fn new(pages: Vec<Page>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                markers: Mutex::new(Vec::new()),
            }
        }

        fn markers(&self) -> Vec<Option<String>> {
            self.markers.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ServiceClient for PagedClient {
        async fn list(&self, _collection: &str, query: &ListQuery) -> Result<Page, BackendError> {
            self.markers.lock().unwrap().push(query.marker.clone());
            Ok(self
                .pages
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Page::last(Vec::new())))
        }

        async fn get(&self, collection: &str, id: &str) -> Result<Record, BackendError> {
            Err(BackendError::not_found(collection, id))
        }

        async fn delete(&self, _collection: &str, _id: &str) -> Result<(), BackendError> {
            Ok(())
        }

        async fn perform(
            &self,
            _collection: &str,
            _id: &str,
            _action: &Action,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        async fn list_extensions(&self) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> Page {
        Page {
            items: ids.iter().map(|id| json!({"id": id, "uuid": id})).collect(),
            next_marker: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_marker_pagination_drains_all_pages() {
        let client = PagedClient::new(vec![
            page(&["a", "b"], Some("b")),
            page(&["c"], Some("c")),
            page(&[], None),
        ]);
        let resource = ServiceResource::new("designate", "zones")
            .paginate(Pagination::Marker { limit: Some(2) });

        let records = resource
            .fetch_all(&client, "zones", ListQuery::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            client.markers(),
            vec![None, Some("b".to_string()), Some("c".to_string())]
        );
    }

    #[tokio::test]
    async fn test_last_item_pagination_stops_on_empty_page() {
        let client = PagedClient::new(vec![page(&["u1", "u2"], None), page(&[], None)]);
        let resource = ServiceResource::new("magnum", "clusters")
            .paginate(Pagination::LastItem { field: "uuid" });

        let records = resource
            .fetch_all(&client, "clusters", ListQuery::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(client.markers(), vec![None, Some("u2".to_string())]);
    }

    #[tokio::test]
    async fn test_repeated_marker_ends_listing() {
        let client = PagedClient::new(vec![
            page(&["a"], Some("a")),
            page(&["a"], Some("a")),
            page(&["never"], None),
        ]);
        let resource = ServiceResource::new("designate", "zones")
            .paginate(Pagination::Marker { limit: None });

        let records = resource
            .fetch_all(&client, "zones", ListQuery::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(client.markers().len(), 2);
    }

    #[tokio::test]
    async fn test_page_cap_truncates_listing() {
        let client = PagedClient::new(vec![
            page(&["a"], Some("a")),
            page(&["b"], Some("b")),
            page(&["c"], Some("c")),
            page(&["d"], Some("d")),
        ]);
        let resource = ServiceResource::new("designate", "zones")
            .paginate(Pagination::Marker { limit: None })
            .max_pages(2);

        let records = resource
            .fetch_all(&client, "zones", ListQuery::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(client.markers(), vec![None, Some("a".to_string())]);
    }

    #[tokio::test]
    async fn test_single_page_ignores_next_marker() {
        let client = PagedClient::new(vec![page(&["a"], Some("a")), page(&["b"], None)]);
        let resource = ServiceResource::new("nova", "keypairs");

        let records = resource
            .fetch_all(&client, "keypairs", ListQuery::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_list_applies_tenant_prefix_and_exclusions() {
        let cloud = MemoryCloud::new();
        for (id, name, project) in [
            ("v1", "s_rally_a", "T"),
            ("v2", "s_rally_b", "U"),
            ("v3", "keep", "T"),
            ("v4", "s_rally_skip", "T"),
        ] {
            let volume = json!({"id": id, "name": name, "project_id": project});
            cloud.insert("cinder", "volumes", volume);
        }
        let ctx = context(
            ResourceKind::new("cinder", "volumes", 404).tenant(),
            user_scope(&cloud, Some("T")),
        );
        let resource = ServiceResource::new("cinder", "volumes")
            .owned_by("project_id")
            .name_prefix("s_rally_")
            .exclude(|r| r.str_field("id") == Some("v4"));

        let listed = resource.list(&ctx).await.unwrap();
        let ids: Vec<&str> = listed.iter().filter_map(|r| r.str_field("id")).collect();
        assert_eq!(ids, vec!["v1"]);
    }

    #[tokio::test]
    async fn test_missing_extension_lists_nothing() {
        let cloud = MemoryCloud::new();
        cloud.insert("neutron", "vips", json!({"id": "x", "tenant_id": "T"}));
        let ctx = context(
            ResourceKind::new("neutron", "vip", 300).tenant().synchronized(),
            user_scope(&cloud, Some("T")),
        );
        let resource = ServiceResource::new("neutron", "vips").requires_extension("lbaas");

        assert!(resource.list(&ctx).await.unwrap().is_empty());
        assert!(!cloud.was_called("neutron", "list", "vips", None));

        cloud.set_extensions("neutron", &["lbaas"]);
        assert_eq!(resource.list(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discovery_error_names_kind() {
        let cloud = MemoryCloud::new();
        cloud.fail_list("heat", "stacks", "connection refused");
        let ctx = context(
            ResourceKind::new("heat", "stacks", 100).tenant(),
            user_scope(&cloud, Some("T")),
        );

        let err = ServiceResource::new("heat", "stacks").list(&ctx).await.unwrap_err();
        assert!(matches!(err, ManagerError::Discovery { ref kind, .. } if kind == "heat.stacks"));
    }

    #[tokio::test]
    async fn test_delete_maps_not_found_to_already_gone() {
        let cloud = MemoryCloud::new();
        cloud.insert("manila", "shares", json!({"id": "s1", "project_id": "T"}));
        let ctx = context(
            ResourceKind::new("manila", "shares", 450).tenant(),
            user_scope(&cloud, Some("T")),
        );
        let resource = ServiceResource::new("manila", "shares");
        let raw = RawResource::new(json!({"id": "s1"}));

        assert_eq!(resource.delete(&ctx, &raw).await.unwrap(), DeleteStatus::Accepted);
        assert_eq!(
            resource.delete(&ctx, &raw).await.unwrap(),
            DeleteStatus::AlreadyGone
        );
    }

    #[tokio::test]
    async fn test_delete_by_alternate_field() {
        let cloud = MemoryCloud::new();
        cloud.insert("mistral", "workbooks", json!({"id": "w1", "name": "wb"}));
        let ctx = context(
            ResourceKind::new("mistral", "workbooks", 1100).tenant().synchronized(),
            user_scope(&cloud, Some("T")),
        );
        let resource = ServiceResource::new("mistral", "workbooks").delete_by("name");

        resource
            .delete(&ctx, &RawResource::new(json!({"id": "w1", "name": "wb"})))
            .await
            .unwrap();
        assert!(cloud.was_called("mistral", "delete", "workbooks", Some("wb")));

        let err = resource
            .delete(&ctx, &RawResource::new(json!({"id": "w2"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::MissingField { ref field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn test_delete_error_is_wrapped() {
        let cloud = MemoryCloud::new();
        cloud.insert("nova", "server_groups", json!({"id": "g1"}));
        cloud.fail_delete("nova", "server_groups", 1, 500);
        let ctx = context(
            ResourceKind::new("nova", "server_groups", 201).tenant(),
            user_scope(&cloud, Some("T")),
        );

        let err = ServiceResource::new("nova", "server_groups")
            .delete(&ctx, &RawResource::new(json!({"id": "g1"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::Delete { ref id, .. } if id == "g1"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_state_from_lookup() {
        let cloud = MemoryCloud::new();
        let ctx = context(
            ResourceKind::new("cinder", "volumes", 404).tenant(),
            user_scope(&cloud, Some("T")),
        );
        let status = ServiceResource::new("cinder", "volumes");
        let not_found =
            ServiceResource::new("cinder", "volumes").deletion_check(DeletionCheck::NotFound);
        let record = |status: &str| Ok(json!({"id": "v1", "status": status}));

        let missing = Err(BackendError::not_found("volumes", "v1"));
        let gone = status.state_from_lookup(&ctx, "v1", missing);
        assert_eq!(gone.unwrap(), DeletionState::NotFound);

        let deleted = status.state_from_lookup(&ctx, "v1", record("DELETED"));
        assert_eq!(deleted.unwrap(), DeletionState::Terminated);

        let deleting = status.state_from_lookup(&ctx, "v1", record("deleting"));
        assert_eq!(deleting.unwrap(), DeletionState::Present);

        let ignored = not_found.state_from_lookup(&ctx, "v1", record("deleted"));
        assert_eq!(ignored.unwrap(), DeletionState::Present);

        let failed = status.state_from_lookup(
            &ctx,
            "v1",
            Err(BackendError::Transport {
                message: "reset".to_string(),
            }),
        );
        assert!(matches!(failed, Err(ManagerError::Status { .. })));
    }

    #[tokio::test]
    async fn test_synchronized_kind_skips_lookup() {
        let cloud = MemoryCloud::new();
        cloud.insert("nova", "keypairs", json!({"name": "k1"}));
        let ctx = context(
            ResourceKind::new("nova", "keypairs", 202).synchronized(),
            user_scope(&cloud, None),
        );
        let resource = ServiceResource::new("nova", "keypairs").id_field("name");

        let state = resource
            .is_deleted(&ctx, &RawResource::new(json!({"name": "k1"})))
            .await
            .unwrap();
        assert_eq!(state, DeletionState::NotFound);
        assert!(cloud.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let cloud = MemoryCloud::new();
        cloud.insert("nova", "flavors", json!({"id": "f1", "name": "m1.tiny"}));
        let ctx = context(
            ResourceKind::new("nova", "flavors", 204).admin_only(),
            admin_scope(&cloud, None),
        );
        let resource =
            ServiceResource::new("nova", "flavors").deletion_check(DeletionCheck::NotFoundByName);

        resource
            .is_deleted(&ctx, &RawResource::new(json!({"id": "f1", "name": "m1.tiny"})))
            .await
            .unwrap();
        assert!(cloud.was_called("nova", "get", "flavors", Some("m1.tiny")));
    }

    #[test]
    fn test_anonymous_name() {
        let cloud = MemoryCloud::new();
        let ctx = context(
            ResourceKind::new("watcher", "action_plan", 1501).admin_only(),
            admin_scope(&cloud, None),
        );
        let resource = ServiceResource::new("watcher", "action_plans").anonymous();
        let name = resource.name(&ctx, &RawResource::new(json!({"uuid": "p1", "name": "x"})));
        assert!(name.is_anonymous());
    }
}
