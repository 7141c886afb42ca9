use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Unified error type for the client.
///
/// Admission rejections (`ConcurrencyExceeded`, `CircuitOpen`) are returned
/// before any network activity and are recoverable by backing off. `Timeout`
/// and `Transport` count as circuit-breaker failures; `Decode` does not,
/// because the remote call itself completed at the transport level.
#[derive(Debug, Error)]
pub enum Error {
    /// The command name was never registered on this client.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// The per-command in-flight cap is exhausted.
    #[error("too many in-flight requests for command '{command}' (max {max})")]
    ConcurrencyExceeded { command: String, max: usize },

    /// The circuit for this command is open; the destination is cooling down.
    #[error("circuit open for command '{command}'")]
    CircuitOpen { command: String },

    /// The call did not complete within the command's configured deadline.
    #[error("command '{command}' timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    /// The caller cancelled the in-flight call.
    #[error("request cancelled by caller")]
    Cancelled,

    /// Underlying network/transport failure from the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request body could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response body did not parse into the requested shape.
    ///
    /// Carries the raw response metadata so callers can still inspect what
    /// the destination actually returned.
    #[error("failed to decode response body (http {status}): {source}")]
    Decode {
        status: StatusCode,
        body: Bytes,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Whether this error should be recorded as a failure against the
    /// command's circuit breaker.
    pub(crate) fn counts_as_circuit_failure(&self) -> bool {
        matches!(self, Error::Timeout { .. } | Error::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_failure_classification() {
        let timeout = Error::Timeout {
            command: "cmd".into(),
            after: Duration::from_secs(1),
        };
        assert!(timeout.counts_as_circuit_failure());

        let unknown = Error::UnknownCommand("cmd".into());
        assert!(!unknown.counts_as_circuit_failure());

        let decode = Error::Decode {
            status: StatusCode::OK,
            body: Bytes::from_static(b"not json"),
            source: serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err(),
        };
        assert!(!decode.counts_as_circuit_failure());
    }

    #[test]
    fn test_display_includes_command() {
        let err = Error::ConcurrencyExceeded {
            command: "orders".into(),
            max: 10,
        };
        assert!(err.to_string().contains("orders"));
        assert!(err.to_string().contains("10"));
    }
}
