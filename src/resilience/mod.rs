//! Resilience primitives: admission control and circuit breaking.
//!
//! These are the per-command guards the client consults before any network
//! activity happens.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`admission`] | Fail-fast in-flight cap with RAII permit release |
//! | [`circuit_breaker`] | Three-state breaker over a rolling error window |
//! | [`rolling_window`] | Bucketed attempt/failure counters with lazy eviction |
//!
//! ## Circuit breaker
//!
//! The breaker prevents repeated calls to a failing destination:
//! - **Closed**: normal operation, outcomes recorded into the window
//! - **Open**: requests fail fast until the sleep window elapses
//! - **Half-Open**: a single probe tests whether the destination recovered
//!
//! ```rust
//! use fusegate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let breaker = CircuitBreaker::new("orders", CircuitBreakerConfig::default());
//! if breaker.allow() {
//!     // make the call...
//!     breaker.record(true);
//! }
//! ```
//!
//! ## Admission control
//!
//! ```rust
//! use fusegate::resilience::admission::AdmissionController;
//!
//! let admission = AdmissionController::new(100);
//! if let Some(permit) = admission.try_acquire() {
//!     // proceed; the slot is released when `permit` drops
//!     drop(permit);
//! }
//! ```
//!
//! Every command owns its own instances; nothing here is shared across
//! commands, so unrelated destinations never contend on a lock.

pub mod admission;
pub mod circuit_breaker;
pub mod rolling_window;
