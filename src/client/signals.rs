use crate::resilience::admission::InflightSnapshot;
use crate::resilience::circuit_breaker::CircuitSnapshot;

/// A facts-only snapshot of one command's runtime state.
///
/// No policy lives here; applications can build backoff or routing
/// decisions on top of these signals.
#[derive(Debug, Clone)]
pub struct CommandSnapshot {
    pub command: String,
    pub inflight: InflightSnapshot,
    pub circuit: CircuitSnapshot,
}
