//! Bounded retry on optimistic concurrency conflicts.

use std::future::Future;

use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Runs `attempt` until it succeeds, fails with anything other than
/// [`EngineError::ConcurrentUpdateConflict`], or has been retried `limit`
/// times.
///
/// Each attempt must re-read the rows it writes; the closure is called again
/// from scratch after a conflict.
pub async fn retry_on_conflict<T, F, Fut>(
    limit: u32,
    operation: &'static str,
    mut attempt: F,
) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Err(EngineError::ConcurrentUpdateConflict { entity, id }) if retries < limit => {
                retries += 1;
                warn!(
                    operation,
                    attempt = retries,
                    entity,
                    id = %id,
                    "Concurrent update conflict, retrying"
                );
                tokio::task::yield_now().await;
            }
            other => return other,
        }
    }
}
