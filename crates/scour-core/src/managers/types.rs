use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A backend record as returned by a kind's listing call.
///
/// Owned by one list -> delete -> confirm cycle and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResource(Value);

impl RawResource {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn field(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String field, ignoring missing, null and non-string values.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// String or integer field rendered as a string.
    pub fn scalar_field(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Boolean field, `false` when missing.
    pub fn flag(&self, field: &str) -> bool {
        self.0.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        if let Value::Object(map) = &mut self.0 {
            map.insert(field.to_string(), value.into());
        }
    }
}

impl From<Value> for RawResource {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Backend-specific identifier of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Human-readable label of a resource for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DisplayName {
    Named(String),
    /// The backend type has no name; carries the kind's resource name.
    Anonymous(String),
}

impl DisplayName {
    /// `Named` when `field` holds a non-empty string, `Anonymous` otherwise.
    pub fn from_field(raw: &RawResource, field: &str, resource: &str) -> Self {
        match raw.str_field(field) {
            Some(name) if !name.is_empty() => DisplayName::Named(name.to_string()),
            _ => DisplayName::Anonymous(resource.to_string()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, DisplayName::Anonymous(_))
    }
}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayName::Named(name) => f.write_str(name),
            DisplayName::Anonymous(resource) => write!(f, "<anonymous {resource}>"),
        }
    }
}

/// What the delete call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The backend accepted the deletion; completion still has to be confirmed.
    Accepted,
    /// The backend reported the resource as already absent.
    AlreadyGone,
    /// The manager already waited for completion itself.
    Confirmed,
}

/// Backend state of a resource after a delete was issued.
///
/// A terminal state and an absent record are kept apart so callers can
/// report which one they observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    Present,
    /// Still listed but in a terminal state (`deleted`, `terminated`, ...).
    Terminated,
    NotFound,
}

impl DeletionState {
    pub fn is_gone(self) -> bool {
        !matches!(self, DeletionState::Present)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeletionState::Present => "present",
            DeletionState::Terminated => "terminated",
            DeletionState::NotFound => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_resource_fields() {
        let mut raw = RawResource::new(json!({"id": "p1", "name": "", "locked": true}));
        assert_eq!(raw.str_field("id"), Some("p1"));
        assert_eq!(raw.str_field("missing"), None);
        assert_eq!(raw.scalar_field("id").as_deref(), Some("p1"));
        assert!(raw.flag("locked"));
        assert!(!raw.flag("missing"));

        raw.set("parent_name", "router-1");
        assert_eq!(raw.str_field("parent_name"), Some("router-1"));
    }

    #[test]
    fn test_scalar_field_accepts_numbers() {
        let raw = RawResource::new(json!({"id": 7, "name": ""}));
        assert_eq!(raw.scalar_field("id").as_deref(), Some("7"));
        assert_eq!(raw.scalar_field("name"), None);
    }

    #[test]
    fn test_display_name_from_field() {
        let raw = RawResource::new(json!({"name": "web"}));
        assert_eq!(
            DisplayName::from_field(&raw, "name", "security_group"),
            DisplayName::Named("web".to_string())
        );

        let unnamed = RawResource::new(json!({"name": ""}));
        let name = DisplayName::from_field(&unnamed, "name", "port");
        assert!(name.is_anonymous());
        assert_eq!(name.to_string(), "<anonymous port>");
    }

    #[test]
    fn test_display_name_serde() {
        let name = DisplayName::Anonymous("floatingip".to_string());
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, r#"{"type":"anonymous","value":"floatingip"}"#);
    }

    #[test]
    fn test_deletion_state_labels() {
        assert_eq!(DeletionState::Terminated.as_str(), "terminated");
        assert_eq!(DeletionState::NotFound.as_str(), "not_found");
    }

    #[test]
    fn test_deletion_state_is_gone() {
        assert!(!DeletionState::Present.is_gone());
        assert!(DeletionState::Terminated.is_gone());
        assert!(DeletionState::NotFound.is_gone());
    }
}
