// ── Core error types ──
//
// User-facing errors from ghwatch-core. The `From<ghwatch_api::Error>` impl
// translates transport-layer failures into the three kinds a dashboard
// cycle can fail with; their display text is what the operator sees.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Cycle failures ───────────────────────────────────────────────
    /// Network-level failure: refused, DNS, timeout.
    #[error("{path}: backend unreachable: {reason}")]
    Unreachable { path: String, reason: String },

    /// Non-success HTTP status.
    #[error("{path} -> {status}")]
    HttpStatus { path: String, status: u16 },

    /// Body was not JSON of the expected shape.
    #[error("{path}: malformed response: {message}")]
    Decode { path: String, message: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Getter not found: {key}")]
    GetterNotFound { key: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Refresh interval {millis}ms is not one of {allowed:?}")]
    InvalidInterval { millis: u64, allowed: &'static [u64] },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Dashboard already started")]
    AlreadyStarted,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ghwatch_api::Error> for CoreError {
    fn from(err: ghwatch_api::Error) -> Self {
        match err {
            ghwatch_api::Error::Transport { path, source } => CoreError::Unreachable {
                path,
                reason: source.to_string(),
            },
            ghwatch_api::Error::HttpStatus { path, status } => {
                CoreError::HttpStatus { path, status }
            }
            ghwatch_api::Error::Decode { path, message, body: _ } => {
                CoreError::Decode { path, message }
            }
            ghwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ghwatch_api::Error::ClientSetup(message) => CoreError::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_keeps_path_and_code_in_message() {
        let err = CoreError::from(ghwatch_api::Error::HttpStatus {
            path: "/executors".into(),
            status: 500,
        });
        assert_eq!(err.to_string(), "/executors -> 500");
    }

    #[test]
    fn decode_drops_raw_body() {
        let err = CoreError::from(ghwatch_api::Error::Decode {
            path: "/getters".into(),
            message: "expected value".into(),
            body: "x".repeat(10_000),
        });
        assert_eq!(err.to_string(), "/getters: malformed response: expected value");
    }

    #[test]
    fn setup_errors_become_config_errors() {
        let err = CoreError::from(ghwatch_api::Error::ClientSetup("no TLS backend".into()));
        assert!(matches!(err, CoreError::Config { ref message } if message == "no TLS backend"));
    }
}
