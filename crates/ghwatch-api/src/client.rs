// Status backend HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction, status checking,
// and typed JSON decoding. All requests are read-only GETs; caching is
// disabled through the transport's default headers.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ExecutorList, GetterDetail, GetterMap, StatusReport, TypeSchema};
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// The fixed set of resources one dashboard cycle reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Status,
    GetterSchema,
    ExecutorSchema,
    Getters,
    Executors,
}

impl Endpoint {
    pub const ALL: [Self; 5] = [
        Self::Status,
        Self::GetterSchema,
        Self::ExecutorSchema,
        Self::Getters,
        Self::Executors,
    ];

    /// Resource path relative to the backend root.
    pub fn path(self) -> &'static str {
        match self {
            Self::Status => "/status",
            Self::GetterSchema => "/schema/getters",
            Self::ExecutorSchema => "/schema/executors",
            Self::Getters => "/getters",
            Self::Executors => "/executors",
        }
    }
}

/// Read-only HTTP client for the status backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DataClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// The `base_url` is the backend root (e.g. `http://127.0.0.1:8080`);
    /// a path prefix is kept, so `http://host/gh` reads `http://host/gh/status`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url_for(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET one of the fixed endpoints and decode its JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, Error> {
        let path = endpoint.path();
        let url = self.url_for(path)?;
        self.get(path, url).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Transport {
                path: path.to_owned(),
                source,
            })?;

        decode(path, resp).await
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /status`. A `null` body reads as an empty report (not ok).
    pub async fn status(&self) -> Result<StatusReport, Error> {
        let report: Option<StatusReport> = self.fetch_json(Endpoint::Status).await?;
        Ok(report.unwrap_or_default())
    }

    /// `GET /schema/getters`.
    pub async fn getter_schema(&self) -> Result<TypeSchema, Error> {
        let schema: Option<TypeSchema> = self.fetch_json(Endpoint::GetterSchema).await?;
        Ok(schema.unwrap_or_default())
    }

    /// `GET /schema/executors`, keyed by executor name.
    pub async fn executor_schema(&self) -> Result<TypeSchema, Error> {
        let schema: Option<TypeSchema> = self.fetch_json(Endpoint::ExecutorSchema).await?;
        Ok(schema.unwrap_or_default())
    }

    /// `GET /getters`.
    pub async fn getters(&self) -> Result<GetterMap, Error> {
        let getters: Option<GetterMap> = self.fetch_json(Endpoint::Getters).await?;
        Ok(getters.unwrap_or_default())
    }

    /// `GET /executors`.
    pub async fn executors(&self) -> Result<ExecutorList, Error> {
        let executors: Option<ExecutorList> = self.fetch_json(Endpoint::Executors).await?;
        Ok(executors.unwrap_or_default())
    }

    /// `GET /getters/<key>`. The key is percent-encoded as a single path
    /// segment. An unknown key yields `Error::HttpStatus { status: 404, .. }`.
    pub async fn getter(&self, key: &str) -> Result<GetterDetail, Error> {
        let mut url = self.url_for(Endpoint::Getters.path())?;
        url.path_segments_mut()
            .map_err(|()| {
                Error::ClientSetup(format!("base URL cannot hold a path: {}", self.base_url))
            })?
            .push(key);
        let path = url.path().to_owned();
        self.get(&path, url).await
    }
}

/// Check the status code, then parse the body as JSON.
async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if !status.is_success() {
        trace!(path, %status, "non-success response");
        return Err(Error::HttpStatus {
            path: path.to_owned(),
            status: status.as_u16(),
        });
    }

    let body = resp.text().await.map_err(|source| Error::Transport {
        path: path.to_owned(),
        source,
    })?;

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            Err(Error::Decode {
                path: path.to_owned(),
                message: format!("{e} (body preview: {preview:?})"),
                body,
            })
        }
    }
}
