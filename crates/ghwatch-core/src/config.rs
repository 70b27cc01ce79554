// ── Runtime dashboard configuration ──
//
// These types describe *what* to poll and *how often*. They never touch
// disk: the TUI (or `ghwatch-config`) constructs a `DashboardConfig` and
// hands it in.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::CoreError;
use crate::language::Language;

// ── RefreshInterval ──────────────────────────────────────────────────

/// A refresh period drawn from a fixed allow-list. `0` means "off".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    /// Every period the selector may emit, in milliseconds, ascending.
    pub const ALLOWED_MILLIS: &'static [u64] = &[0, 1_000, 2_000, 5_000, 10_000, 30_000];

    pub const OFF: Self = Self(0);

    /// Validate a selector value against the allow-list.
    pub fn from_millis(millis: u64) -> Result<Self, CoreError> {
        if Self::ALLOWED_MILLIS.contains(&millis) {
            Ok(Self(millis))
        } else {
            Err(CoreError::InvalidInterval {
                millis,
                allowed: Self::ALLOWED_MILLIS,
            })
        }
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn is_off(self) -> bool {
        self.0 == 0
    }

    /// Timer period, or `None` when refreshing is disabled.
    pub fn period(self) -> Option<Duration> {
        (self.0 > 0).then(|| Duration::from_millis(self.0))
    }

    /// The next longer period in the allow-list (saturates at the longest).
    #[must_use]
    pub fn longer(self) -> Self {
        Self::ALLOWED_MILLIS
            .iter()
            .copied()
            .find(|&ms| ms > self.0)
            .map_or(self, Self)
    }

    /// The next shorter period in the allow-list (saturates at "off").
    #[must_use]
    pub fn shorter(self) -> Self {
        Self::ALLOWED_MILLIS
            .iter()
            .rev()
            .copied()
            .find(|&ms| ms < self.0)
            .map_or(self, Self)
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self(2_000)
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = CoreError;

    fn try_from(millis: u64) -> Result<Self, Self::Error> {
        Self::from_millis(millis)
    }
}

impl From<RefreshInterval> for u64 {
    fn from(interval: RefreshInterval) -> Self {
        interval.0
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "off"),
            ms if ms % 1_000 == 0 => write!(f, "{}s", ms / 1_000),
            ms => write!(f, "{ms}ms"),
        }
    }
}

// ── CycleOrdering ────────────────────────────────────────────────────

/// How the renderer treats cycles that complete out of dispatch order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CycleOrdering {
    /// Paint a cycle only if no later-dispatched cycle has been painted.
    #[default]
    LatestDispatched,
    /// Whatever completes last is shown, even if it was dispatched earlier.
    LastCompleted,
}

// ── TLS ──────────────────────────────────────────────────────────────

/// TLS verification strategy for HTTPS backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

// ── DashboardConfig ──────────────────────────────────────────────────

/// Configuration for polling a single backend.
///
/// Built by the TUI, passed to `Dashboard`; core never reads config files.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend root URL (e.g., `http://127.0.0.1:8080`).
    pub base_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Initial automatic refresh period.
    pub refresh_interval: RefreshInterval,
    /// Language of placeholder and error strings.
    pub language: Language,
    /// Out-of-order completion policy.
    pub cycle_ordering: CycleOrdering,
}

impl DashboardConfig {
    /// Defaults for everything but the backend URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            refresh_interval: RefreshInterval::default(),
            language: Language::default(),
            cycle_ordering: CycleOrdering::default(),
        }
    }
}
