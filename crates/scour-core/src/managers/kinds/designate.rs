//! DNS kinds.
//!
//! DNS records are shared across tenants, so instead of an owner filter only
//! names carrying the benchmark prefix are touched. The API throttles
//! concurrent deletes, hence a single worker per kind.

use crate::managers::{Pagination, ServiceResource};
use crate::registry::{Registry, RegistryError, ResourceKind};

const DOMAINS: u32 = 900;
const SERVERS: u32 = 901;
const ZONES: u32 = 902;

/// Names created by benchmark runs start with this.
const NAME_PREFIX: &str = "s_rally_";

const ZONE_PAGE_SIZE: usize = 100;

fn dns(collection: &'static str) -> ServiceResource {
    ServiceResource::new("designate", collection).name_prefix(NAME_PREFIX)
}

pub(super) fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        ResourceKind::new("designate", "domains", DOMAINS)
            .tenant()
            .workers(1)
            .synchronized(),
        dns("domains"),
    )?;
    registry.register(
        ResourceKind::new("designate", "servers", SERVERS)
            .admin_only()
            .workers(1)
            .synchronized(),
        dns("servers"),
    )?;
    registry.register(
        ResourceKind::new("designate", "zones", ZONES)
            .tenant()
            .workers(1)
            .synchronized(),
        dns("zones")
            .paginate(Pagination::Marker {
                limit: Some(ZONE_PAGE_SIZE),
            })
            .query("name", "s_rally_*"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::ResourceManager;
    use crate::memory::MemoryCloud;
    use crate::test_support::{context, user_scope};
    use serde_json::json;

    #[tokio::test]
    async fn test_domains_only_prefixed_names() {
        let cloud = MemoryCloud::new();
        cloud.insert("designate", "domains", json!({"id": "d1", "name": "s_rally_abc.org."}));
        cloud.insert("designate", "domains", json!({"id": "d2", "name": "prod.example.org."}));
        let kind = ResourceKind::new("designate", "domains", DOMAINS).tenant().workers(1);
        let ctx = context(kind, user_scope(&cloud, Some("T")));

        let listed = dns("domains").list(&ctx).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].str_field("id"), Some("d1"));
    }

    #[test]
    fn test_designate_kinds_run_single_worker() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        assert!(registry.all_kinds().iter().all(|k| k.kind().workers == 1));
    }
}
