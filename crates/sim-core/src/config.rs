//! Simulation configuration parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ValidationError;

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the deterministic RNG behind the competitor-exit draw.
    pub rng_seed: u64,
    /// Fixed monthly overhead (insurance, licences, software) in USD.
    pub fixed_overhead_usd: f64,
    pub trend: TrendConfig,
    pub narrative: NarrativeConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            fixed_overhead_usd: 750.0,
            trend: TrendConfig::default(),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ValidationError> {
        let cfg: SimConfig =
            serde_yaml::from_str(text).map_err(|e| ValidationError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::check_non_negative("fixed_overhead_usd", self.fixed_overhead_usd)?;
        self.trend.validate()?;
        self.narrative.validate()
    }
}

/// Periods for the technical indicators applied to interest series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub rsi_period: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            rsi_period: 14,
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fast_period == 0 || self.signal_period == 0 || self.rsi_period == 0 {
            return Err(ValidationError::Config("indicator periods must be > 0".into()));
        }
        if self.fast_period >= self.slow_period {
            return Err(ValidationError::Config(
                "fast EMA period must be shorter than slow period".into(),
            ));
        }
        Ok(())
    }
}

/// Timeout and retry budget for the narrative collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fraction of each backoff delay randomised, in [0,1].
    pub jitter: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2_000,
            jitter: 0.25,
        }
    }
}

impl NarrativeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::Config("max_attempts must be >= 1".into()));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ValidationError::Config(
                "base_delay_ms exceeds max_delay_ms".into(),
            ));
        }
        crate::check_range("narrative.jitter", self.jitter, 0.0, 1.0, "[0, 1]")
    }
}
