//! Polling pipeline between `ghwatch-api` and the terminal UI.
//!
//! Each cycle fetches the five backend resources concurrently, correlates
//! them into display records, and publishes a fresh [`Surface`]:
//!
//! - **[`Dashboard`]**: facade owning the client, renderer and scheduler.
//!   [`start()`](Dashboard::start) runs the initial cycle and installs the
//!   refresh timer; [`run_cycle()`](Dashboard::run_cycle) runs one cycle
//!   inline (used by `ghwatch --snapshot`).
//!
//! - **[`view`]**: pure view model builder. Applies the [`SearchFilter`],
//!   sorts, counts and formats badges.
//!
//! - **[`render`]**: turns a view into a [`Surface`] and publishes it over a
//!   `watch` channel, discarding cycles superseded by a later dispatch.
//!   [`render::markup`] serializes a surface as escaped HTML.
//!
//! - **[`Scheduler`]**: the single periodic timer plus ad-hoc triggers.
//!
//! - **[`report`]**: the failure surface shown when any fetch fails.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod language;
pub mod render;
pub mod report;
pub mod scheduler;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CycleOrdering, DashboardConfig, RefreshInterval, TlsVerification};
pub use dashboard::{CycleReport, Dashboard};
pub use error::CoreError;
pub use filter::SearchFilter;
pub use language::Language;
pub use render::{Connectivity, Panel, Surface};
pub use scheduler::{CycleTrigger, Scheduler};
pub use view::{DashboardView, Freshness, ModeBadge, RecordKind, RecordView, Validity};

// ── API re-exports consumed by the TUI ──────────────────────────────
pub use ghwatch_api::GetterDetail;
