use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An opaque backend record. The core only reads named fields from it.
pub type Record = serde_json::Value;

/// Service types as advertised in an identity's service catalog.
pub mod service_types {
    pub const COMPUTE: &str = "compute";
    pub const NETWORK: &str = "network";
    pub const IMAGE: &str = "image";
    pub const VOLUME: &str = "volumev2";
    pub const IDENTITY: &str = "identity";
    pub const DNS: &str = "dns";
    pub const OBJECT_STORE: &str = "object-store";
}

/// Parameters for one list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: BTreeMap<String, String>,
    pub marker: Option<String>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_marker(mut self, marker: Option<String>) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// One page of a list response.
///
/// `next_marker` is `None` when the backend has nothing further to return.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Record>,
    pub next_marker: Option<String>,
}

impl Page {
    /// A page that is known to be the last one.
    pub fn last(items: Vec<Record>) -> Self {
        Self {
            items,
            next_marker: None,
        }
    }
}

/// Side-effecting calls a manager may need before (or instead of) a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Unlock a locked compute instance.
    Unlock,
    /// Reactivate a deactivated image.
    Reactivate,
    /// Remove one member host from a host aggregate.
    RemoveHost { host: String },
    /// Detach a port from the router it is an interface of.
    RemoveRouterInterface { port_id: String },
    /// Clear the external gateway of a router.
    RemoveRouterGateway,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Unlock => "unlock",
            Action::Reactivate => "reactivate",
            Action::RemoveHost { .. } => "remove_host",
            Action::RemoveRouterInterface { .. } => "remove_router_interface",
            Action::RemoveRouterGateway => "remove_router_gateway",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
