//! Gateway configuration

use std::time::Duration;

/// Configuration for the simulated gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Simulated network latency per call, in milliseconds
    pub latency_ms: u64,

    /// Probability that a call fails with a transport error (0.0 to 1.0)
    pub failure_rate: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set the failure rate, clamped to 0.0..=1.0
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        self
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
