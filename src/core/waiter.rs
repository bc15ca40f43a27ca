use crate::core::{Probe, ReadinessReport, RetryPolicy};
use crate::utils::error::{ReadyError, Result};
use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Polls a [`Probe`] until it reports ready or the retry policy is exhausted.
///
/// Holds no state between calls; every `wait` starts again from attempt 1.
#[derive(Debug, Clone, Default)]
pub struct ReadinessWaiter {
    policy: RetryPolicy,
    cancel: Option<CancellationToken>,
}

impl ReadinessWaiter {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn wait<P: Probe + ?Sized>(&self, probe: &P) -> Result<ReadinessReport> {
        let dependency = probe.name();
        let max_attempts = self.policy.max_attempts();
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::debug!(
            "Probing {} up to {} times ({:?} total backoff)",
            dependency,
            max_attempts,
            self.policy.max_wait()
        );

        for attempt in 1..=max_attempts {
            if self.is_cancelled() {
                return Err(self.cancelled(dependency, attempt - 1));
            }

            match self.attempt(probe, dependency, attempt).await? {
                Ok(true) => {
                    tracing::info!("✅ {} is up and ready.", dependency);
                    return Ok(ReadinessReport {
                        dependency: dependency.to_string(),
                        attempts: attempt,
                        elapsed: start.elapsed(),
                        started_at,
                    });
                }
                Ok(false) => {
                    tracing::debug!("{} answered but is not ready", dependency);
                }
                Err(e) if e.is_transient() => {
                    tracing::debug!("{}", e);
                }
                Err(e) => {
                    tracing::error!("❌ Probe for {} failed on attempt {}: {}", dependency, attempt, e);
                    return Err(e);
                }
            }

            if attempt < max_attempts {
                tracing::info!(
                    "⏳ Waiting for {} to start... ({}/{})",
                    dependency,
                    attempt,
                    max_attempts
                );
                self.pause(dependency, attempt).await?;
            }
        }

        Err(ReadyError::DependencyUnavailable {
            dependency: dependency.to_string(),
            attempts: max_attempts,
        })
    }

    /// Runs one check; cancellation abandons an in-flight check, which then
    /// does not count as a completed attempt.
    async fn attempt<P: Probe + ?Sized>(
        &self,
        probe: &P,
        dependency: &str,
        attempt: u32,
    ) -> Result<Result<bool>> {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(self.cancelled(dependency, attempt - 1)),
                    outcome = probe.check() => Ok(outcome),
                }
            }
            None => Ok(probe.check().await),
        }
    }

    async fn pause(&self, dependency: &str, attempt: u32) -> Result<()> {
        let delay = self.policy.delay();
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(self.cancelled(dependency, attempt)),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn cancelled(&self, dependency: &str, attempts: u32) -> ReadyError {
        tracing::warn!("🛑 Stopped waiting for {} after {} attempts", dependency, attempts);
        ReadyError::Cancelled {
            dependency: dependency.to_string(),
            attempts,
        }
    }
}
