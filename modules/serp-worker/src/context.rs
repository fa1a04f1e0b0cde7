use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::ActivityError;

/// Per-invocation execution context: the cancellation and deadline signals
/// the orchestrator attaches to one activity run.
///
/// Activities route every store call through [`ActivityContext::guard`], so a
/// cancelled or expired invocation stops at the next I/O boundary instead of
/// running to completion.
#[derive(Clone, Debug, Default)]
pub struct ActivityContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl ActivityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel this context when the returned guard is dropped.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.cancel.clone().drop_guard()
    }

    /// Race `fut` against cancellation and the deadline. Whichever fires
    /// first wins; the losing I/O future is dropped.
    pub async fn guard<F, T, E>(&self, fut: F) -> Result<T, ActivityError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ActivityError>,
    {
        if self.cancel.is_cancelled() {
            return Err(ActivityError::Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ActivityError::Cancelled),
            _ = deadline => Err(ActivityError::DeadlineExceeded),
            result = fut => result.map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn passes_through_results() {
        let ctx = ActivityContext::new();
        let ok: Result<u32, ActivityError> = ctx.guard(async { Ok::<_, ActivityError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = ctx
            .guard(async { Err::<(), _>(ActivityError::InvalidInput("x".into())) })
            .await;
        assert!(matches!(err, Err(ActivityError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let ctx = ActivityContext::new();
        ctx.cancel();
        let result = ctx.guard(async { Ok::<_, ActivityError>(()) }).await;
        assert!(matches!(result, Err(ActivityError::Cancelled)));
    }

    #[tokio::test]
    async fn cancellation_interrupts_pending_io() {
        let ctx = ActivityContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = ctx
            .guard(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ActivityError>(())
            })
            .await;
        assert!(matches!(result, Err(ActivityError::Cancelled)));
    }

    #[tokio::test]
    async fn deadline_interrupts_pending_io() {
        let ctx = ActivityContext::new().with_deadline(Instant::now() + Duration::from_millis(20));
        let result = ctx
            .guard(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, ActivityError>(())
            })
            .await;
        assert!(matches!(result, Err(ActivityError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn drop_guard_cancels() {
        let ctx = ActivityContext::new();
        {
            let _guard = ctx.cancel_on_drop();
            assert!(!ctx.is_cancelled());
        }
        assert!(ctx.is_cancelled());
    }
}
