use thiserror::Error;

/// Top-level error type for the `ghwatch-api` crate.
///
/// Every failed request names the resource path it was issued against, so a
/// dashboard can show the operator which of the parallel fetches broke.
/// `ghwatch-core` folds these into a single "cycle failed" outcome.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request never produced a response (connection refused, DNS
    /// failure, timeout, reset mid-body).
    #[error("{path}: transport error: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("{path} -> {status}")]
    HttpStatus { path: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// The body was not JSON of the expected shape, with the raw body for
    /// debugging.
    #[error("{path}: malformed response: {message}")]
    Decode {
        path: String,
        message: String,
        body: String,
    },

    // ── Setup ───────────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed (TLS backend, bad header).
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl Error {
    /// Returns `true` if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404, .. })
    }
}
