use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cleanup::{errors::CleanupError, operations, types::*};
use crate::config::ScourConfig;
use crate::managers::KindContext;
use crate::poller::DeletionOutcome;
use crate::registry::{RegisteredKind, Registry};

/// Drives one registry over one scope.
///
/// Kinds run strictly one after another in registry order. Within a kind,
/// delete and confirm run on a bounded worker pool sized by
/// [`ScourConfig::workers_for`].
#[derive(Debug)]
pub struct Cleanup<'r> {
    registry: &'r Registry,
    config: ScourConfig,
}

impl<'r> Cleanup<'r> {
    pub fn new(registry: &'r Registry, config: ScourConfig) -> Self {
        Self { registry, config }
    }

    pub async fn run(
        &self,
        scope: CleanupScope,
        filter: &KindFilter,
    ) -> Result<CleanupReport, CleanupError> {
        self.run_with_cancel(scope, filter, CancellationToken::new())
            .await
    }

    /// Run until done or until `cancel` fires.
    ///
    /// Cancellation lets in-flight delete calls finish, abandons pending
    /// confirmations (reported as timed out) and dispatches nothing further.
    /// Kinds not yet reached are reported as cancelled. A `[run]` timeout in
    /// the config cancels the same way.
    pub async fn run_with_cancel(
        &self,
        scope: CleanupScope,
        filter: &KindFilter,
        cancel: CancellationToken,
    ) -> Result<CleanupReport, CleanupError> {
        let started_at = Utc::now();
        info!(
            event = "core.cleanup.run_started",
            tenant_id = ?scope.tenant_id,
            names = ?filter.names,
            admin_required = ?filter.admin_required
        );

        operations::validate_scope(&scope, filter)?;
        let selected = operations::select_kinds(self.registry, filter)?;
        let scope = Arc::new(scope);

        let token = cancel.child_token();
        // Stops the run timer once this function returns.
        let _timer_guard = token.clone().drop_guard();
        if let Some(timeout) = self.config.run_timeout() {
            let timer_token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = timer_token.cancelled() => {}
                    _ = tokio::time::sleep(timeout) => {
                        warn!(
                            event = "core.cleanup.run_timed_out",
                            timeout_secs = timeout.as_secs()
                        );
                        timer_token.cancel();
                    }
                }
            });
        }

        let mut kinds = Vec::with_capacity(selected.len());
        for registered in selected {
            let kind = registered.kind();

            if token.is_cancelled() {
                kinds.push(KindReport::new(kind, KindStatus::Cancelled));
                continue;
            }

            if let Some(reason) = operations::unmet_requirement(kind, &scope) {
                info!(
                    event = "core.cleanup.kind_skipped",
                    kind = %kind,
                    reason = %reason
                );
                kinds.push(KindReport::new(kind, KindStatus::Skipped(reason)));
                continue;
            }

            kinds.push(self.process_kind(registered, &scope, &token).await);
        }

        let report = CleanupReport {
            started_at,
            finished_at: Utc::now(),
            cancelled: token.is_cancelled(),
            kinds,
        };

        let totals = report.totals();
        info!(
            event = "core.cleanup.run_completed",
            kinds = report.kinds.len(),
            deleted = totals.deleted,
            already_gone = totals.already_gone,
            failed = totals.failed,
            timed_out = totals.timed_out,
            cancelled = report.cancelled
        );

        Ok(report)
    }

    async fn process_kind(
        &self,
        registered: &RegisteredKind,
        scope: &Arc<CleanupScope>,
        token: &CancellationToken,
    ) -> KindReport {
        let kind = registered.kind();
        let manager = Arc::clone(registered.manager());
        let ctx = KindContext::new(
            kind.clone(),
            Arc::clone(scope),
            self.config.poll_settings_for(kind),
            token.clone(),
        );
        let workers = self.config.workers_for(kind).max(1);

        info!(event = "core.cleanup.kind_started", kind = %kind, workers = workers);

        let resources = match manager.list(&ctx).await {
            Ok(resources) => resources,
            Err(e) => {
                error!(
                    event = "core.cleanup.kind_discovery_failed",
                    kind = %kind,
                    error = %e
                );
                return KindReport::new(kind, KindStatus::Failed(e.to_string()));
            }
        };

        let total = resources.len();
        info!(event = "core.cleanup.kind_listed", kind = %kind, count = total);

        let (max_attempts, retry_interval) = self.config.delete_retry();
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        // Task id -> (dispatch index, id, name) so a panicked worker is still reported.
        let mut dispatched = HashMap::new();
        let mut undispatched = 0;

        for (index, raw) in resources.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                undispatched = total - index;
                warn!(
                    event = "core.cleanup.kind_dispatch_stopped",
                    kind = %kind,
                    undispatched = undispatched
                );
                break;
            };

            let label = (
                index,
                manager
                    .identify(&ctx, &raw)
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                manager.name(&ctx, &raw),
            );
            let manager = Arc::clone(&manager);
            let ctx = ctx.clone();
            let handle = tasks.spawn(async move {
                let report = operations::delete_one(
                    manager.as_ref(),
                    &ctx,
                    &raw,
                    max_attempts,
                    retry_interval,
                )
                .await;
                drop(permit);
                report
            });
            dispatched.insert(handle.id(), label);
        }

        let mut slots: Vec<Option<ResourceReport>> = vec![None; dispatched.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, report) = match joined {
                Ok((task_id, report)) => (task_id, report),
                Err(join_error) => {
                    let task_id = join_error.id();
                    let Some((_, id, name)) = dispatched.get(&task_id) else {
                        continue;
                    };
                    error!(
                        event = "core.cleanup.worker_failed",
                        kind = %kind,
                        id = %id,
                        error = %join_error
                    );
                    let report = ResourceReport {
                        id: id.clone(),
                        name: name.clone(),
                        outcome: DeletionOutcome::Failed(format!("worker failed: {join_error}")),
                    };
                    (task_id, report)
                }
            };
            if let Some((index, _, _)) = dispatched.get(&task_id) {
                slots[*index] = Some(report);
            }
        }

        let status = if undispatched > 0 {
            KindStatus::Cancelled
        } else {
            KindStatus::Completed
        };
        let mut report = KindReport::new(kind, status);
        report.undispatched = undispatched;
        for resource in slots.into_iter().flatten() {
            report.push(resource);
        }

        info!(
            event = "core.cleanup.kind_completed",
            kind = %kind,
            deleted = report.counts.deleted,
            already_gone = report.counts.already_gone,
            failed = report.counts.failed,
            timed_out = report.counts.timed_out,
            undispatched = undispatched
        );

        report
    }
}
