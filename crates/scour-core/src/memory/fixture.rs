//! On-disk description of an in-memory cloud.
//!
//! ```json
//! {
//!   "user_id": "u-1",
//!   "catalog": ["compute", "network"],
//!   "services": {
//!     "neutron": {
//!       "extensions": ["lbaasv2"],
//!       "collections": {
//!         "ports": [{"id": "p1", "tenant_id": "t1", "device_owner": ""}]
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::FixtureError;
use crate::clients::Record;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub user_id: Option<String>,

    /// Service types advertised to identities of this cloud.
    #[serde(default)]
    pub catalog: Vec<String>,

    #[serde(default)]
    pub services: BTreeMap<String, ServiceFixture>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFixture {
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub collections: BTreeMap<String, Vec<Record>>,
}

impl Fixture {
    pub fn from_json(content: &str) -> Result<Self, FixtureError> {
        serde_json::from_str(content).map_err(|e| FixtureError::Parse {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}
