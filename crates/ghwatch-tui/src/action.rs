//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use ghwatch_core::{GetterDetail, Surface};

/// Which panel holds the selection cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelFocus {
    #[default]
    Getters,
    Executors,
}

impl PanelFocus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Getters => Self::Executors,
            Self::Executors => Self::Getters,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,

    // ── Pipeline ──
    Reload,
    SurfaceUpdated(Arc<Surface>),
    InFlightChanged(usize),

    // ── Search ──
    OpenSearch,
    /// Query text after every keystroke.
    SearchChanged(String),
    /// Enter: close the search bar, keep the query.
    SubmitSearch,
    /// Esc: close the search bar and clear the query.
    ClearSearch,

    // ── Refresh interval ──
    IntervalLonger,
    IntervalShorter,

    // ── Navigation ──
    FocusPanel(PanelFocus),
    SelectNext,
    SelectPrev,

    // ── Getter detail ──
    OpenGetterDetail(String),
    GetterDetailLoaded(Box<GetterDetail>),
    GetterDetailFailed(String),
    CloseDetail,
}
