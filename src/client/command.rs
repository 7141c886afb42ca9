use crate::resilience::admission::AdmissionController;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use std::time::Duration;

/// Per-command configuration bundle.
///
/// Created once at client construction and immutable afterwards; every
/// command gets its own circuit breaker and in-flight cap built from it.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Deadline for one call, admission to response body fully read.
    pub timeout: Duration,
    /// Maximum number of concurrently executing requests.
    pub max_concurrent_requests: usize,
    /// Minimum attempts in the rolling window before the error rate can
    /// trip the circuit.
    pub request_volume_threshold: u64,
    /// How long an open circuit rejects requests before allowing a probe to
    /// determine whether it should close again.
    pub sleep_window: Duration,
    /// Error percentage (0-100) at or above which the circuit trips open.
    pub error_percent_threshold: u8,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_concurrent_requests: 100,
            request_volume_threshold: 20,
            sleep_window: Duration::from_secs(5),
            error_percent_threshold: 50,
        }
    }
}

impl CommandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }

    pub fn with_request_volume_threshold(mut self, volume: u64) -> Self {
        self.request_volume_threshold = volume;
        self
    }

    pub fn with_sleep_window(mut self, sleep_window: Duration) -> Self {
        self.sleep_window = sleep_window;
        self
    }

    pub fn with_error_percent_threshold(mut self, threshold: u8) -> Self {
        self.error_percent_threshold = threshold.min(100);
        self
    }
}

/// One registered command: its config plus the breaker/admission pair that
/// exclusively owns its state.
pub(crate) struct CommandState {
    pub(crate) name: String,
    pub(crate) config: CommandConfig,
    pub(crate) breaker: CircuitBreaker,
    pub(crate) admission: AdmissionController,
}

impl CommandState {
    pub(crate) fn new(name: String, config: CommandConfig) -> Self {
        let breaker_cfg = CircuitBreakerConfig {
            request_volume_threshold: config.request_volume_threshold,
            error_percent_threshold: config.error_percent_threshold.min(100),
            sleep_window: config.sleep_window,
        };
        Self {
            breaker: CircuitBreaker::new(name.clone(), breaker_cfg),
            admission: AdmissionController::new(config.max_concurrent_requests),
            name,
            config,
        }
    }
}
