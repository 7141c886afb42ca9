use crate::resilience::rolling_window::{RollingWindow, WindowCounts};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Admission state of a command's circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through and outcomes are recorded.
    Closed,
    /// Destination assumed down, requests fail fast.
    Open,
    /// Testing recovery: exactly one trial request is in flight.
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Minimum attempts in the rolling window before the error rate is
    /// evaluated at all.
    pub request_volume_threshold: u64,
    /// Error percentage (0-100) at or above which the circuit trips open.
    pub error_percent_threshold: u8,
    /// How long an open circuit rejects requests before admitting a probe.
    pub sleep_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            request_volume_threshold: 20,
            error_percent_threshold: 50,
            sleep_window: Duration::from_secs(5),
        }
    }
}

/// Point-in-time view of a breaker, for observability.
#[derive(Debug, Clone)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub window: WindowCounts,
    /// Remaining open time, if currently open.
    pub open_remaining: Option<Duration>,
    /// Whether the half-open probe slot is currently claimed.
    pub probe_in_flight: bool,
}

#[derive(Debug)]
struct State {
    circuit: CircuitState,
    window: RollingWindow,
    /// Valid only while the circuit is open.
    opened_at: Option<Instant>,
    half_open_in_flight: bool,
}

/// Per-command circuit breaker over a rolling attempt/failure window.
///
/// # State transitions
/// ```text
/// Closed → Open: window volume >= request_volume_threshold and
///                error rate >= error_percent_threshold
/// Open → Half-Open: sleep_window elapsed, one probe admitted
/// Half-Open → Closed: probe succeeded (window reset)
/// Half-Open → Open: probe failed or was abandoned
/// ```
///
/// One lock per breaker; different commands never contend.
pub struct CircuitBreaker {
    command: String,
    cfg: CircuitBreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(command: impl Into<String>, cfg: CircuitBreakerConfig) -> Self {
        Self {
            command: command.into(),
            cfg,
            state: Mutex::new(State {
                circuit: CircuitState::Closed,
                window: RollingWindow::with_defaults(Instant::now()),
                opened_at: None,
                half_open_in_flight: false,
            }),
        }
    }

    /// Decide whether a new request may proceed right now.
    ///
    /// An open circuit whose sleep window has elapsed transitions to
    /// half-open here, and the caller that observed the transition holds the
    /// single probe slot.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    pub(crate) fn allow_at(&self, now: Instant) -> bool {
        let mut st = self.lock();
        match st.circuit {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = st
                    .opened_at
                    .map(|at| now.saturating_duration_since(at) >= self.cfg.sleep_window)
                    .unwrap_or(false);
                if cooled_down {
                    st.circuit = CircuitState::HalfOpen;
                    st.opened_at = None;
                    st.half_open_in_flight = true;
                    debug!(command = %self.command, "circuit half-open, admitting probe");
                    true
                } else {
                    false
                }
            }
            // The probe slot is already claimed; everyone else fails fast.
            CircuitState::HalfOpen => false,
        }
    }

    /// Record the outcome of an admitted request.
    pub fn record(&self, success: bool) {
        self.record_at(success, Instant::now());
    }

    pub(crate) fn record_at(&self, success: bool, now: Instant) {
        let mut st = self.lock();
        match st.circuit {
            CircuitState::Closed => {
                st.window.record(success, now);
                let counts = st.window.snapshot(now);
                if counts.attempts >= self.cfg.request_volume_threshold
                    && counts.failures * 100
                        >= u64::from(self.cfg.error_percent_threshold) * counts.attempts
                {
                    st.circuit = CircuitState::Open;
                    st.opened_at = Some(now);
                    debug!(
                        command = %self.command,
                        attempts = counts.attempts,
                        failures = counts.failures,
                        "circuit opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                st.half_open_in_flight = false;
                if success {
                    st.circuit = CircuitState::Closed;
                    st.window.reset();
                    debug!(command = %self.command, "probe succeeded, circuit closed");
                } else {
                    st.circuit = CircuitState::Open;
                    st.opened_at = Some(now);
                    debug!(command = %self.command, "probe failed, circuit reopened");
                }
            }
            // Open: nothing was admitted, nothing to record. A straggler
            // completion from before the trip is dropped on purpose.
            CircuitState::Open => {}
        }
    }

    /// Release the half-open probe slot without an outcome.
    ///
    /// Called when the probe was cancelled by the caller: the destination is
    /// still unproven, so the circuit goes back to open and waits out another
    /// sleep window. No-op in any other state.
    pub fn abandon_probe(&self) {
        self.abandon_probe_at(Instant::now());
    }

    pub(crate) fn abandon_probe_at(&self, now: Instant) {
        let mut st = self.lock();
        if st.circuit == CircuitState::HalfOpen {
            st.half_open_in_flight = false;
            st.circuit = CircuitState::Open;
            st.opened_at = Some(now);
            debug!(command = %self.command, "probe abandoned, circuit reopened");
        }
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub(crate) fn snapshot_at(&self, now: Instant) -> CircuitSnapshot {
        let mut st = self.lock();
        let open_remaining = st.opened_at.map(|at| {
            self.cfg
                .sleep_window
                .saturating_sub(now.saturating_duration_since(at))
        });
        CircuitSnapshot {
            state: st.circuit,
            window: st.window.snapshot(now),
            open_remaining,
            probe_in_flight: st.half_open_in_flight,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panic while holding it; the state itself
        // is still structurally valid, so keep serving.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
