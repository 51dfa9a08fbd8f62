//! Best-effort side effects.
//!
//! Notification sends and report refreshes must never fail the operation that
//! triggered them. This helper awaits the work, logs any failure with the task
//! name, and swallows the error.

use std::future::Future;

use tracing::warn;

/// Await `fut`; on failure, log and move on.
pub async fn best_effort<E>(task: &str, fut: impl Future<Output = Result<(), E>>)
where
    E: std::fmt::Display,
{
    if let Err(error) = fut.await {
        warn!(%error, task, "best-effort task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failure_is_swallowed() {
        best_effort("failing task", async { Err::<(), _>("boom") }).await;
    }

    #[tokio::test]
    async fn success_completes() {
        let mut ran = false;
        best_effort("ok task", async {
            ran = true;
            Ok::<_, String>(())
        })
        .await;
        assert!(ran);
    }
}
