//! In-memory cloud implementing the backend client contract.
//!
//! Every service family shares one state behind a mutex. Calls are recorded
//! so callers can assert which backend methods a cleanup invoked, and faults
//! (failing lists, flaky status checks, slow deletions) can be injected per
//! collection.

pub mod errors;
pub mod fixture;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::{Action, BackendError, ListQuery, Page, Record, ServiceClient, Session};

pub use errors::FixtureError;
pub use fixture::{Fixture, ServiceFixture};

/// Fields that may address a record in get/delete calls.
const KEY_FIELDS: &[&str] = &["id", "uuid", "name", "access", "alarm_id"];

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub service: String,
    pub op: &'static str,
    pub collection: String,
    pub id: Option<String>,
    pub action: Option<Action>,
}

type CollectionKey = (String, String);

#[derive(Debug)]
struct Lingering {
    key: CollectionKey,
    record: Record,
    remaining: usize,
}

#[derive(Debug, Default)]
struct State {
    catalog: Vec<String>,
    user_id: Option<String>,
    collections: BTreeMap<CollectionKey, Vec<Record>>,
    extensions: HashMap<String, Vec<String>>,
    calls: Vec<Call>,
    failing_lists: HashMap<CollectionKey, String>,
    failing_gets: HashMap<CollectionKey, usize>,
    failing_deletes: HashMap<CollectionKey, (usize, u16)>,
    linger: HashMap<CollectionKey, (usize, String)>,
    lingering: Vec<Lingering>,
}

/// A whole cloud held in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCloud {
    state: Arc<Mutex<State>>,
}

fn key(service: &str, collection: &str) -> CollectionKey {
    (service.to_string(), collection.to_string())
}

fn field_string(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn matches_key(record: &Record, id: &str) -> bool {
    KEY_FIELDS
        .iter()
        .any(|field| field_string(record, field).as_deref() == Some(id))
}

fn matches_filter(record: &Record, field: &str, expected: &str) -> bool {
    let Some(actual) = field_string(record, field) else {
        return false;
    };
    match expected.strip_suffix('*') {
        Some(prefix) => actual.starts_with(prefix),
        None => actual == expected,
    }
}

fn conflict(message: String) -> BackendError {
    BackendError::Api {
        status: 409,
        code: None,
        message,
    }
}

impl MemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let cloud = Self::new();
        {
            let mut state = cloud.lock();
            state.catalog = fixture.catalog;
            state.user_id = fixture.user_id;
            for (service, service_fixture) in fixture.services {
                state
                    .extensions
                    .insert(service.clone(), service_fixture.extensions);
                for (collection, records) in service_fixture.collections {
                    state.collections.insert(key(&service, &collection), records);
                }
            }
        }
        cloud
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        Ok(Self::from_fixture(Fixture::load(path)?))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_catalog<I, S>(self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().catalog = services.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user_id(self, user_id: &str) -> Self {
        self.lock().user_id = Some(user_id.to_string());
        self
    }

    pub fn insert(&self, service: &str, collection: &str, record: Record) {
        self.lock()
            .collections
            .entry(key(service, collection))
            .or_default()
            .push(record);
    }

    pub fn set_extensions(&self, service: &str, aliases: &[&str]) {
        self.lock().extensions.insert(
            service.to_string(),
            aliases.iter().map(|a| a.to_string()).collect(),
        );
    }

    /// Current records of a collection.
    pub fn records(&self, service: &str, collection: &str) -> Vec<Record> {
        self.lock()
            .collections
            .get(&key(service, collection))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of records left across every collection.
    pub fn total_records(&self) -> usize {
        self.lock().collections.values().map(Vec::len).sum()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Whether a call with this service, op, collection and (optional) id
    /// was recorded.
    pub fn was_called(&self, service: &str, op: &str, collection: &str, id: Option<&str>) -> bool {
        self.lock().calls.iter().any(|c| {
            c.service == service
                && c.op == op
                && c.collection == collection
                && (id.is_none() || c.id.as_deref() == id)
        })
    }

    pub fn performed(&self, service: &str, action: &Action) -> bool {
        self.lock()
            .calls
            .iter()
            .any(|c| c.service == service && c.action.as_ref() == Some(action))
    }

    /// Every list of this collection fails with a transport error.
    pub fn fail_list(&self, service: &str, collection: &str, message: &str) {
        self.lock()
            .failing_lists
            .insert(key(service, collection), message.to_string());
    }

    /// The next `times` gets on this collection fail with a transport error.
    pub fn fail_get(&self, service: &str, collection: &str, times: usize) {
        self.lock()
            .failing_gets
            .insert(key(service, collection), times);
    }

    /// The next `times` deletes on this collection fail with `status`.
    pub fn fail_delete(&self, service: &str, collection: &str, times: usize, status: u16) {
        self.lock()
            .failing_deletes
            .insert(key(service, collection), (times, status));
    }

    /// Deleted records of this collection stay visible to `checks` gets,
    /// reporting `status`, before disappearing.
    pub fn linger(&self, service: &str, collection: &str, checks: usize, status: &str) {
        self.lock()
            .linger
            .insert(key(service, collection), (checks, status.to_string()));
    }

    fn record_call(
        state: &mut State,
        service: &str,
        op: &'static str,
        collection: &str,
        id: Option<&str>,
        action: Option<&Action>,
    ) {
        state.calls.push(Call {
            service: service.to_string(),
            op,
            collection: collection.to_string(),
            id: id.map(str::to_string),
            action: action.cloned(),
        });
    }

    fn list(
        &self,
        service: &str,
        collection: &str,
        query: &ListQuery,
    ) -> Result<Page, BackendError> {
        let mut state = self.lock();
        Self::record_call(&mut state, service, "list", collection, None, None);

        let k = key(service, collection);
        if let Some(message) = state.failing_lists.get(&k) {
            return Err(BackendError::Transport {
                message: message.clone(),
            });
        }

        let records: Vec<Record> = state
            .collections
            .get(&k)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| {
                        query
                            .filters
                            .iter()
                            .filter(|(field, _)| field.as_str() != "all_tenants")
                            .all(|(field, value)| matches_filter(r, field, value))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let start = match &query.marker {
            Some(marker) => records
                .iter()
                .position(|r| matches_key(r, marker))
                .map_or(records.len(), |p| p + 1),
            None => 0,
        };
        let remaining = &records[start.min(records.len())..];

        match query.limit {
            Some(limit) if remaining.len() > limit => {
                let items = remaining[..limit].to_vec();
                let next_marker = items
                    .last()
                    .and_then(|r| field_string(r, "id").or_else(|| field_string(r, "uuid")));
                Ok(Page { items, next_marker })
            }
            _ => Ok(Page::last(remaining.to_vec())),
        }
    }

    fn get(&self, service: &str, collection: &str, id: &str) -> Result<Record, BackendError> {
        let mut state = self.lock();
        Self::record_call(&mut state, service, "get", collection, Some(id), None);

        let k = key(service, collection);
        if let Some(remaining) = state.failing_gets.get_mut(&k)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(BackendError::Transport {
                message: format!("status check of {collection} '{id}' failed"),
            });
        }

        if let Some(record) = state
            .collections
            .get(&k)
            .and_then(|records| records.iter().find(|r| matches_key(r, id)))
        {
            return Ok(record.clone());
        }

        if let Some(position) = state
            .lingering
            .iter()
            .position(|l| l.key == k && matches_key(&l.record, id))
        {
            let entry = &mut state.lingering[position];
            if entry.remaining > 0 {
                entry.remaining -= 1;
                return Ok(entry.record.clone());
            }
            state.lingering.remove(position);
        }

        Err(BackendError::not_found(collection, id))
    }

    fn delete(&self, service: &str, collection: &str, id: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::record_call(&mut state, service, "delete", collection, Some(id), None);

        let k = key(service, collection);
        if let Some((remaining, status)) = state.failing_deletes.get_mut(&k)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(BackendError::Api {
                status: *status,
                code: None,
                message: format!("delete of {collection} '{id}' rejected"),
            });
        }

        let records = state.collections.entry(k.clone()).or_default();
        let Some(position) = records.iter().position(|r| matches_key(r, id)) else {
            return Err(BackendError::not_found(collection, id));
        };

        let record = &records[position];
        if record.get("status").and_then(Value::as_str) == Some("deactivated") {
            return Err(conflict(format!("{collection} '{id}' is deactivated")));
        }
        if record.get("OS-EXT-STS:locked").and_then(Value::as_bool) == Some(true) {
            return Err(conflict(format!("{collection} '{id}' is locked")));
        }
        if record
            .get("hosts")
            .and_then(Value::as_array)
            .is_some_and(|hosts| !hosts.is_empty())
        {
            return Err(conflict(format!("{collection} '{id}' still has hosts")));
        }

        let mut record = records.remove(position);
        if let Some((checks, status)) = state.linger.get(&k).cloned() {
            if let Value::Object(map) = &mut record {
                map.insert("status".to_string(), Value::String(status));
            }
            state.lingering.push(Lingering {
                key: k,
                record,
                remaining: checks,
            });
        }
        Ok(())
    }

    fn perform(
        &self,
        service: &str,
        collection: &str,
        id: &str,
        action: &Action,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::record_call(&mut state, service, "perform", collection, Some(id), Some(action));

        let k = key(service, collection);
        let record = state
            .collections
            .get_mut(&k)
            .and_then(|records| records.iter_mut().find(|r| matches_key(r, id)))
            .ok_or_else(|| BackendError::not_found(collection, id))?;
        let Value::Object(map) = record else {
            return Err(conflict(format!("{collection} '{id}' is not an object")));
        };

        match action {
            Action::Unlock => {
                map.insert("OS-EXT-STS:locked".to_string(), Value::Bool(false));
            }
            Action::Reactivate => {
                map.insert("status".to_string(), Value::String("active".to_string()));
            }
            Action::RemoveHost { host } => {
                let hosts = map
                    .get_mut("hosts")
                    .and_then(Value::as_array_mut)
                    .ok_or_else(|| BackendError::not_found("hosts", host))?;
                let before = hosts.len();
                hosts.retain(|h| h.as_str() != Some(host.as_str()));
                if hosts.len() == before {
                    return Err(BackendError::not_found("hosts", host));
                }
            }
            Action::RemoveRouterGateway => {
                map.insert("external_gateway_info".to_string(), Value::Null);
                let router_id = id.to_string();
                if let Some(ports) = state.collections.get_mut(&key(service, "ports")) {
                    ports.retain(|p| {
                        !(p.get("device_owner").and_then(Value::as_str)
                            == Some("network:router_gateway")
                            && p.get("device_id").and_then(Value::as_str)
                                == Some(router_id.as_str()))
                    });
                }
            }
            Action::RemoveRouterInterface { port_id } => {
                let ports = state
                    .collections
                    .get_mut(&key(service, "ports"))
                    .ok_or_else(|| BackendError::not_found("ports", port_id))?;
                let before = ports.len();
                ports.retain(|p| !matches_key(p, port_id));
                if ports.len() == before {
                    return Err(BackendError::not_found("ports", port_id));
                }
            }
        }
        Ok(())
    }

    fn extensions(&self, service: &str) -> Vec<String> {
        let mut state = self.lock();
        Self::record_call(&mut state, service, "list_extensions", "extensions", None, None);
        state.extensions.get(service).cloned().unwrap_or_default()
    }
}

/// Client of one service family of a [`MemoryCloud`].
#[derive(Debug, Clone)]
pub struct MemoryClient {
    cloud: MemoryCloud,
    service: String,
}

#[async_trait]
impl ServiceClient for MemoryClient {
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Page, BackendError> {
        self.cloud.list(&self.service, collection, query)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Record, BackendError> {
        self.cloud.get(&self.service, collection, id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        self.cloud.delete(&self.service, collection, id)
    }

    async fn perform(
        &self,
        collection: &str,
        id: &str,
        action: &Action,
    ) -> Result<(), BackendError> {
        self.cloud.perform(&self.service, collection, id, action)
    }

    async fn list_extensions(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.cloud.extensions(&self.service))
    }
}

impl Session for MemoryCloud {
    fn client(&self, service: &str) -> Option<Arc<dyn ServiceClient>> {
        Some(Arc::new(MemoryClient {
            cloud: self.clone(),
            service: service.to_string(),
        }))
    }

    fn catalog(&self) -> Vec<String> {
        self.lock().catalog.clone()
    }

    fn user_id(&self) -> Option<String> {
        self.lock().user_id.clone()
    }
}
