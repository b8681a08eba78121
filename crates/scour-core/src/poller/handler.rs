use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use super::types::{DeletionOutcome, PollSettings};
use crate::managers::{KindContext, RawResource, ResourceManager};

/// Status-check failures tolerated in a row before giving up on a resource.
pub const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Poll `manager.is_deleted` until the resource is gone, the timeout
/// elapses, or the context's cancellation token fires.
///
/// Kinds with synchronized deletion return [`DeletionOutcome::Deleted`]
/// without touching the backend. A terminal status and a not-found answer
/// both count as deleted; the observed state is logged. Each status check is
/// bounded by the remaining budget and raced against cancellation.
/// Cancellation is reported as [`DeletionOutcome::TimedOut`] since the
/// resource was not observed gone.
pub async fn wait_until_deleted(
    manager: &dyn ResourceManager,
    ctx: &KindContext,
    raw: &RawResource,
    settings: PollSettings,
) -> DeletionOutcome {
    if ctx.kind().synchronized_deletion {
        return DeletionOutcome::Deleted;
    }

    let cancel = ctx.cancel_token();
    let started = Instant::now();
    let mut consecutive_errors = 0u32;

    loop {
        if cancel.is_cancelled() {
            debug!(event = "core.poller.cancelled", kind = %ctx.kind());
            return DeletionOutcome::TimedOut;
        }

        let remaining = settings.timeout.saturating_sub(started.elapsed());
        let checked = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(event = "core.poller.cancelled", kind = %ctx.kind());
                return DeletionOutcome::TimedOut;
            }
            checked = timeout(remaining, manager.is_deleted(ctx, raw)) => checked,
        };

        match checked {
            Err(_) => {
                warn!(
                    event = "core.poller.check_stalled",
                    kind = %ctx.kind(),
                    timeout_ms = settings.timeout.as_millis() as u64
                );
                return DeletionOutcome::TimedOut;
            }
            Ok(Ok(state)) if state.is_gone() => {
                info!(
                    event = "core.poller.confirmed",
                    kind = %ctx.kind(),
                    state = state.as_str(),
                    elapsed_ms = started.elapsed().as_millis() as u64
                );
                return DeletionOutcome::Deleted;
            }
            Ok(Ok(_)) => consecutive_errors = 0,
            Ok(Err(e)) => {
                consecutive_errors += 1;
                warn!(
                    event = "core.poller.check_failed",
                    kind = %ctx.kind(),
                    attempt = consecutive_errors,
                    error = %e
                );
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    return DeletionOutcome::Failed(e.to_string());
                }
            }
        }

        let elapsed = started.elapsed();
        if elapsed >= settings.timeout {
            warn!(
                event = "core.poller.timed_out",
                kind = %ctx.kind(),
                timeout_ms = settings.timeout.as_millis() as u64
            );
            return DeletionOutcome::TimedOut;
        }

        let pause = settings.interval.min(settings.timeout - elapsed);
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(event = "core.poller.cancelled", kind = %ctx.kind());
                return DeletionOutcome::TimedOut;
            }
            _ = sleep(pause) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::clients::BackendError;
    use crate::managers::{DeleteStatus, DeletionState, ManagerError};
    use crate::memory::MemoryCloud;
    use crate::registry::ResourceKind;
    use crate::test_support::{admin_scope, context};

    /// Answers from a script, repeating the last entry once exhausted.
    struct Scripted {
        answers: Vec<Result<DeletionState, u16>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(answers: Vec<Result<DeletionState, u16>>) -> Self {
            Self {
                answers,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResourceManager for Scripted {
        async fn list(&self, _ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
            Ok(Vec::new())
        }

        async fn delete(
            &self,
            _ctx: &KindContext,
            _raw: &RawResource,
        ) -> Result<DeleteStatus, ManagerError> {
            Ok(DeleteStatus::Accepted)
        }

        async fn is_deleted(
            &self,
            ctx: &KindContext,
            _raw: &RawResource,
        ) -> Result<DeletionState, ManagerError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let answer = self.answers[n.min(self.answers.len() - 1)].clone();
            answer.map_err(|status| ManagerError::Status {
                kind: ctx.kind().key(),
                id: "r1".to_string(),
                source: BackendError::Api {
                    status,
                    code: None,
                    message: "scripted".to_string(),
                },
            })
        }
    }

    fn settings(timeout_secs: u64) -> PollSettings {
        PollSettings::new(Duration::from_secs(timeout_secs), Duration::from_secs(1))
    }

    fn ctx_for(kind: ResourceKind) -> KindContext {
        let cloud = MemoryCloud::new();
        context(kind, admin_scope(&cloud, Some("t1")))
    }

    fn raw() -> RawResource {
        RawResource::new(serde_json::json!({"id": "r1"}))
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_present_answers() {
        let manager = Scripted::new(vec![
            Ok(DeletionState::Present),
            Ok(DeletionState::Present),
            Ok(DeletionState::NotFound),
        ]);
        let ctx = ctx_for(ResourceKind::new("nova", "servers", 200));
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(60)).await;
        assert_eq!(outcome, DeletionOutcome::Deleted);
        assert_eq!(manager.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_counts_as_deleted() {
        let manager = Scripted::new(vec![Ok(DeletionState::Terminated)]);
        let ctx = ctx_for(ResourceKind::new("ec2", "servers", 250));
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(60)).await;
        assert_eq!(outcome, DeletionOutcome::Deleted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synchronized_kind_skips_polling() {
        let manager = Scripted::new(vec![Ok(DeletionState::Present)]);
        let ctx = ctx_for(ResourceKind::new("nova", "keypairs", 202).synchronized());
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(60)).await;
        assert_eq!(outcome, DeletionOutcome::Deleted);
        assert_eq!(manager.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_resource_lingers() {
        let manager = Scripted::new(vec![Ok(DeletionState::Present)]);
        let ctx = ctx_for(ResourceKind::new("nova", "servers", 200));
        let started = Instant::now();
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(5)).await;
        assert_eq!(outcome, DeletionOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_errors_fail() {
        let manager = Scripted::new(vec![Err(500)]);
        let ctx = ctx_for(ResourceKind::new("nova", "servers", 200));
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(60)).await;
        assert!(matches!(outcome, DeletionOutcome::Failed(_)));
        assert_eq!(manager.calls(), MAX_CONSECUTIVE_ERRORS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_streak_resets_on_present() {
        let manager = Scripted::new(vec![
            Err(500),
            Err(500),
            Ok(DeletionState::Present),
            Err(503),
            Err(503),
            Ok(DeletionState::NotFound),
        ]);
        let ctx = ctx_for(ResourceKind::new("nova", "servers", 200));
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(60)).await;
        assert_eq!(outcome, DeletionOutcome::Deleted);
        assert_eq!(manager.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_waiting() {
        let manager = Arc::new(Scripted::new(vec![Ok(DeletionState::Present)]));
        let cloud = MemoryCloud::new();
        let token = CancellationToken::new();
        let ctx = KindContext::new(
            ResourceKind::new("nova", "servers", 200),
            admin_scope(&cloud, Some("t1")),
            settings(600),
            token.clone(),
        );

        let handle = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                wait_until_deleted(manager.as_ref(), &ctx, &raw(), settings(600)).await
            })
        };
        sleep(Duration::from_secs(3)).await;
        token.cancel();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome, DeletionOutcome::TimedOut);
        assert!(manager.calls() < 10);
    }

    /// Status check that never answers within any sane budget.
    struct Stalled {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ResourceManager for Stalled {
        async fn list(&self, _ctx: &KindContext) -> Result<Vec<RawResource>, ManagerError> {
            Ok(Vec::new())
        }

        async fn delete(
            &self,
            _ctx: &KindContext,
            _raw: &RawResource,
        ) -> Result<DeleteStatus, ManagerError> {
            Ok(DeleteStatus::Accepted)
        }

        async fn is_deleted(
            &self,
            _ctx: &KindContext,
            _raw: &RawResource,
        ) -> Result<DeletionState, ManagerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_secs(3600)).await;
            Ok(DeletionState::NotFound)
        }
    }

    fn stalled() -> Stalled {
        Stalled {
            calls: AtomicU32::new(0),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_check_times_out_within_budget() {
        let manager = stalled();
        let ctx = ctx_for(ResourceKind::new("nova", "servers", 200));
        let started = Instant::now();
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(5)).await;
        assert_eq!(outcome, DeletionOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_stalled_check() {
        let manager = Arc::new(stalled());
        let cloud = MemoryCloud::new();
        let token = CancellationToken::new();
        let ctx = KindContext::new(
            ResourceKind::new("nova", "servers", 200),
            admin_scope(&cloud, Some("t1")),
            settings(600),
            token.clone(),
        );

        let started = Instant::now();
        let handle = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                wait_until_deleted(manager.as_ref(), &ctx, &raw(), settings(600)).await
            })
        };
        sleep(Duration::from_secs(10)).await;
        token.cancel();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome, DeletionOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(11));
        assert_eq!(manager.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_skips_status_check() {
        let manager = Scripted::new(vec![Ok(DeletionState::NotFound)]);
        let cloud = MemoryCloud::new();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = KindContext::new(
            ResourceKind::new("nova", "servers", 200),
            admin_scope(&cloud, Some("t1")),
            settings(60),
            token,
        );
        let outcome = wait_until_deleted(&manager, &ctx, &raw(), settings(60)).await;
        assert_eq!(outcome, DeletionOutcome::TimedOut);
        assert_eq!(manager.calls(), 0);
    }
}
