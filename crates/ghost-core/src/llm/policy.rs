//! Per-call deadline and bounded retry for external model calls.

use crate::error::{GhostError, GhostResult};
use std::future::Future;
use std::time::{Duration, Instant};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);

/// Wraps a side-effect-free call with a timeout and up to `max_attempts` tries.
///
/// Only transient failures ([`GhostError::is_transient`]) are retried. Never wrap a
/// persistence step in a policy with more than one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: 1,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl CallPolicy {
    pub fn new(timeout: Duration, max_attempts: u32) -> Self {
        Self {
            timeout,
            max_attempts: max_attempts.max(1),
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Same deadline, single attempt.
    pub fn without_retry(self) -> Self {
        Self {
            max_attempts: 1,
            ..self
        }
    }

    pub async fn run<T, F, Fut>(&self, service: &'static str, mut op: F) -> GhostResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GhostResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(GhostError::Timeout {
                    service,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }),
            };
            match outcome {
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(
                        target: "ghost::llm",
                        service,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "{} call failed, retrying",
                        service
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> CallPolicy {
        CallPolicy::new(Duration::from_millis(50), max_attempts).with_backoff(Duration::ZERO)
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let out = fast(3)
            .run("embedding", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(GhostError::service("embedding", "503"))
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();
        assert_eq!(out, 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_validation() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let out: GhostResult<()> = fast(3)
            .run("generation", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GhostError::Validation("bad".into()))
            })
            .await;
        assert!(matches!(out, Err(GhostError::Validation(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let out: GhostResult<()> = fast(1)
            .run("generation", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(
            out,
            Err(GhostError::Timeout {
                service: "generation",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let out: GhostResult<()> = fast(2)
            .run("embedding", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GhostError::service("embedding", "down"))
            })
            .await;
        assert!(matches!(out, Err(GhostError::Service { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
