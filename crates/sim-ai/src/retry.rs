//! Bounded retry with exponential backoff around the narrative collaborator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::NarrativeConfig;
use std::time::Duration;
use tracing::{debug, warn};

use crate::narrative::{fallback_narrative, MonthSummary, Narrative, NarrativeError, NarrativeService};

/// Retry budget: attempt cap, exponential base delay, ceiling and jitter.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of each delay randomised, in [0,1].
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&NarrativeConfig::default())
    }
}

impl From<&NarrativeConfig> for RetryPolicy {
    fn from(cfg: &NarrativeConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            jitter: cfg.jitter.clamp(0.0, 1.0),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt `attempt` (1-based).
    ///
    /// `unit` in [0,1) positions the delay inside the jitter band
    /// `[d * (1 - jitter), d]`, where `d = min(base * 2^(attempt-1), max)`.
    pub fn delay_for(&self, attempt: u32, unit: f64) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let nominal = self
            .base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay);
        let scale = 1.0 - self.jitter * unit.clamp(0.0, 1.0);
        nominal.mul_f64(scale)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.delay_for(attempt, rand::thread_rng().gen::<f64>())
    }
}

/// Where the narrative text came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Generated,
    Fallback { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeOutcome {
    pub narrative: Narrative,
    pub source: NarrativeSource,
    pub attempts: u32,
}

/// Ask `service` for a narrative, retrying per `policy` with a per-attempt
/// `timeout`. Never fails: after the last attempt the template text is used.
pub async fn narrate_with_fallback(
    service: &dyn NarrativeService,
    summary: &MonthSummary,
    policy: &RetryPolicy,
    timeout: Duration,
) -> NarrativeOutcome {
    let mut last_error = NarrativeError::Empty;
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        let result = match tokio::time::timeout(timeout, service.narrate(summary)).await {
            Ok(Ok(n)) if n.headline.trim().is_empty() => Err(NarrativeError::Empty),
            Ok(inner) => inner,
            Err(_) => Err(NarrativeError::Timeout {
                after_ms: timeout.as_millis() as u64,
            }),
        };
        match result {
            Ok(narrative) => {
                debug!(service = service.name(), attempt, "narrative generated");
                return NarrativeOutcome {
                    narrative,
                    source: NarrativeSource::Generated,
                    attempts: attempt,
                };
            }
            Err(e) => {
                warn!(service = service.name(), attempt, error = %e, "narrative attempt failed");
                last_error = e;
                if attempt < attempts {
                    tokio::time::sleep(policy.backoff(attempt)).await;
                }
            }
        }
    }
    warn!(service = service.name(), "narrative unavailable; using template text");
    NarrativeOutcome {
        narrative: fallback_narrative(summary),
        source: NarrativeSource::Fallback {
            reason: last_error.to_string(),
        },
        attempts,
    }
}
