use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clients::Session;
use crate::managers::DisplayName;
use crate::poller::DeletionOutcome;
use crate::registry::ResourceKind;

/// Target of one cleanup run.
#[derive(Clone, Default)]
pub struct CleanupScope {
    pub tenant_id: Option<String>,
    pub admin: Option<Arc<dyn Session>>,
    pub user: Option<Arc<dyn Session>>,
}

impl CleanupScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_admin(mut self, admin: Arc<dyn Session>) -> Self {
        self.admin = Some(admin);
        self
    }

    pub fn with_user(mut self, user: Arc<dyn Session>) -> Self {
        self.user = Some(user);
        self
    }
}

impl std::fmt::Debug for CleanupScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupScope")
            .field("tenant_id", &self.tenant_id)
            .field("admin", &self.admin.is_some())
            .field("user", &self.user.is_some())
            .finish()
    }
}

/// Which registered kinds a run processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindFilter {
    /// Services (`nova`) or kinds (`nova.servers`); empty selects everything.
    pub names: Vec<String>,
    /// `Some(true)` keeps only admin kinds, `Some(false)` only user kinds.
    pub admin_required: Option<bool>,
}

impl KindFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn admin_required(mut self, admin_required: bool) -> Self {
        self.admin_required = Some(admin_required);
        self
    }

    pub fn matches(&self, kind: &ResourceKind) -> bool {
        let named = self.names.is_empty()
            || self
                .names
                .iter()
                .any(|name| name == kind.service || *name == kind.key());
        let admin = self
            .admin_required
            .is_none_or(|required| required == kind.admin_required);
        named && admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub id: String,
    pub name: DisplayName,
    #[serde(flatten)]
    pub outcome: DeletionOutcome,
}

/// How far a kind got during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum KindStatus {
    Completed,
    /// The scope does not satisfy the kind's requirements.
    Skipped(String),
    /// The kind could not be enumerated.
    Failed(String),
    /// The run was cancelled before or while this kind was processed.
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub deleted: usize,
    pub already_gone: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &DeletionOutcome) {
        match outcome {
            DeletionOutcome::Deleted => self.deleted += 1,
            DeletionOutcome::AlreadyGone => self.already_gone += 1,
            DeletionOutcome::Failed(_) => self.failed += 1,
            DeletionOutcome::TimedOut => self.timed_out += 1,
        }
    }

    pub fn add(&mut self, other: &OutcomeCounts) {
        self.deleted += other.deleted;
        self.already_gone += other.already_gone;
        self.failed += other.failed;
        self.timed_out += other.timed_out;
    }

    pub fn total(&self) -> usize {
        self.deleted + self.already_gone + self.failed + self.timed_out
    }
}

/// Outcome of one kind, resources in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindReport {
    pub service: String,
    pub resource: String,
    pub order: u32,
    #[serde(flatten)]
    pub status: KindStatus,
    pub counts: OutcomeCounts,
    /// Listed resources never handed to a worker because the run was cancelled.
    pub undispatched: usize,
    pub resources: Vec<ResourceReport>,
}

impl KindReport {
    pub fn new(kind: &ResourceKind, status: KindStatus) -> Self {
        Self {
            service: kind.service.to_string(),
            resource: kind.resource.to_string(),
            order: kind.order,
            status,
            counts: OutcomeCounts::default(),
            undispatched: 0,
            resources: Vec::new(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.service, self.resource)
    }

    pub fn push(&mut self, report: ResourceReport) {
        self.counts.record(&report.outcome);
        self.resources.push(report);
    }

    /// Resources that were not observed gone.
    pub fn failures(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn has_failures(&self) -> bool {
        matches!(self.status, KindStatus::Failed(_))
            || self.counts.failed > 0
            || self.counts.timed_out > 0
    }
}

/// Structured summary of a run, ordered by kind order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,
    pub kinds: Vec<KindReport>,
}

impl CleanupReport {
    pub fn totals(&self) -> OutcomeCounts {
        let mut totals = OutcomeCounts::default();
        for kind in &self.kinds {
            totals.add(&kind.counts);
        }
        totals
    }

    pub fn has_failures(&self) -> bool {
        self.kinds.iter().any(KindReport::has_failures)
    }

    pub fn kind(&self, key: &str) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.key() == key)
    }
}
