// ── Renderer ──
//
// Turns a `DashboardView` into a `Surface`: the complete, self-contained
// description of what the display shows. A surface is always replaced as
// a whole; nothing is patched in place.

pub mod markup;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::config::CycleOrdering;
use crate::error::CoreError;
use crate::language::Language;
use crate::report;
use crate::view::{DashboardView, RecordView};

// ── Surface ──────────────────────────────────────────────────────────

/// Health indicator shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Healthy,
    Unhealthy,
}

impl Connectivity {
    pub fn is_healthy(self) -> bool {
        self == Self::Healthy
    }
}

/// Content of one panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    /// At least one record passed the filter.
    Rows(Vec<RecordView>),
    /// The filtered list is empty.
    Empty,
    /// The most recent cycle failed; carries the full inline message.
    Error(String),
    /// No cycle has completed yet.
    Pending,
}

impl Panel {
    fn from_records(records: Vec<RecordView>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Rows(records)
        }
    }

    /// Visible rows (empty unless `Rows`).
    pub fn rows(&self) -> &[RecordView] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Everything on screen after one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub connectivity: Connectivity,
    /// Unfiltered totals; survive failed cycles unchanged.
    pub getter_count: usize,
    pub executor_count: usize,
    pub getters: Panel,
    pub executors: Panel,
    /// Dispatch number of the cycle that produced this surface; `0` before
    /// any cycle has completed.
    pub cycle: u64,
    pub rendered_at: Option<DateTime<Utc>>,
}

impl Surface {
    /// Shown before the first cycle lands.
    pub fn initial() -> Self {
        Self {
            connectivity: Connectivity::Unhealthy,
            getter_count: 0,
            executor_count: 0,
            getters: Panel::Pending,
            executors: Panel::Pending,
            cycle: 0,
            rendered_at: None,
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::initial()
    }
}

/// Project a successful cycle's view onto a fresh surface stamped `at`.
pub fn render(view: DashboardView, cycle: u64, at: DateTime<Utc>) -> Surface {
    Surface {
        connectivity: if view.healthy {
            Connectivity::Healthy
        } else {
            Connectivity::Unhealthy
        },
        getter_count: view.getter_count,
        executor_count: view.executor_count,
        getters: Panel::from_records(view.getters),
        executors: Panel::from_records(view.executors),
        cycle,
        rendered_at: Some(at),
    }
}

// ── Renderer ─────────────────────────────────────────────────────────

/// Publishes surfaces to every subscriber, enforcing the cycle ordering
/// policy.
///
/// The latest painted cycle is read from the published surface itself,
/// so the staleness check and the replacement happen under one lock.
pub struct Renderer {
    tx: watch::Sender<Arc<Surface>>,
    ordering: CycleOrdering,
    language: Language,
}

impl Renderer {
    pub fn new(ordering: CycleOrdering, language: Language) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Surface::initial()));
        Self {
            tx,
            ordering,
            language,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Surface>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Arc<Surface> {
        self.tx.borrow().clone()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Replace the surface with a successful cycle's view.
    ///
    /// Returns `false` if the cycle was superseded and nothing changed.
    pub fn paint(&self, view: DashboardView, cycle: u64) -> bool {
        let surface = render(view, cycle, Utc::now());
        self.publish(cycle, |_| surface)
    }

    /// Replace both panels with an inline error for a failed cycle.
    ///
    /// Counts from the previous surface are carried over.
    pub fn report_failure(&self, err: &CoreError, cycle: u64) -> bool {
        let language = self.language;
        let at = Utc::now();
        self.publish(cycle, |previous| {
            report::failure_surface(previous, err, language, cycle, at)
        })
    }

    fn publish(&self, cycle: u64, build: impl FnOnce(&Surface) -> Surface) -> bool {
        let ordering = self.ordering;
        let painted = self.tx.send_if_modified(|current| {
            if ordering == CycleOrdering::LatestDispatched && cycle < current.cycle {
                return false;
            }
            *current = Arc::new(build(current));
            true
        });
        if !painted {
            debug!(cycle, "discarding superseded cycle");
        }
        painted
    }
}
