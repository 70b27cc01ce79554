// ── Dashboard facade ──
//
// Owns the data client, renderer and scheduler, and runs the dispatcher
// that turns every trigger into an independent fetch → build → render
// cycle. Cloning is cheap (`Arc` inner).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ghwatch_api::{DataClient, GetterDetail, TlsMode, TransportConfig};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{DashboardConfig, RefreshInterval, TlsVerification};
use crate::error::CoreError;
use crate::filter::SearchFilter;
use crate::render::{Renderer, Surface};
use crate::report;
use crate::scheduler::{CycleTrigger, Scheduler};
use crate::view::{self, Snapshot};

/// Outcome of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// All five fetches succeeded and the surface was replaced.
    Rendered { cycle: u64 },
    /// A fetch failed and both panels now show `message`.
    Failed { cycle: u64, message: String },
    /// A later-dispatched cycle had already been painted.
    Superseded { cycle: u64 },
}

impl CycleReport {
    pub fn cycle(&self) -> u64 {
        match self {
            Self::Rendered { cycle } | Self::Failed { cycle, .. } | Self::Superseded { cycle } => {
                *cycle
            }
        }
    }
}

/// The main facade for polling one backend.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: DataClient,
    renderer: Renderer,
    scheduler: Scheduler,
    filter: Mutex<SearchFilter>,
    /// Last dispatched cycle number; cycles are numbered from 1.
    next_cycle: AtomicU64,
    trigger_rx: Mutex<Option<mpsc::UnboundedReceiver<CycleTrigger>>>,
    /// Number of cycles currently fetching.
    in_flight: watch::Sender<usize>,
    started: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Build the HTTP client and wiring. Does not fetch anything; call
    /// [`start()`](Self::start) to run the first cycle and install the timer.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let client = DataClient::new(config.base_url.clone(), &transport)?;

        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let scheduler = Scheduler::new(trigger_tx, cancel.child_token());
        let renderer = Renderer::new(config.cycle_ordering, config.language);
        let (in_flight, _) = watch::channel(0);

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                renderer,
                scheduler,
                filter: Mutex::new(SearchFilter::default()),
                next_cycle: AtomicU64::new(0),
                trigger_rx: Mutex::new(Some(trigger_rx)),
                in_flight,
                started: AtomicBool::new(false),
                cancel,
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the dispatcher, request the initial cycle and install the
    /// configured refresh timer.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyStarted);
        }

        let Some(rx) = self.inner.trigger_rx.lock().await.take() else {
            return Err(CoreError::AlreadyStarted);
        };

        info!(base_url = %self.inner.config.base_url, "starting dashboard");
        let dash = self.clone();
        let cancel = self.inner.cancel.clone();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(dispatcher_task(dash, rx, cancel)));

        self.inner.scheduler.trigger(CycleTrigger::Initial);
        self.inner
            .scheduler
            .set_interval(self.inner.config.refresh_interval)
            .await;
        Ok(())
    }

    /// Stop the timer, abort in-flight cycles and join background tasks.
    pub async fn shutdown(&self) {
        self.inner.scheduler.stop().await;
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("dashboard shut down");
    }

    // ── Triggers ─────────────────────────────────────────────────────

    /// Request an immediate cycle.
    pub fn reload(&self) {
        self.inner.scheduler.trigger(CycleTrigger::Manual);
    }

    /// Replace the search query and request a cycle with it applied.
    pub async fn set_filter(&self, query: impl Into<String>) {
        *self.inner.filter.lock().await = SearchFilter::new(query);
        self.inner.scheduler.trigger(CycleTrigger::Filter);
    }

    /// Replace the refresh timer. Does not run a cycle by itself.
    pub async fn set_refresh_interval(&self, interval: RefreshInterval) {
        self.inner.scheduler.set_interval(interval).await;
    }

    pub async fn refresh_interval(&self) -> RefreshInterval {
        self.inner.scheduler.interval().await
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Subscribe to surface replacements.
    pub fn surface(&self) -> watch::Receiver<Arc<Surface>> {
        self.inner.renderer.subscribe()
    }

    pub fn current_surface(&self) -> Arc<Surface> {
        self.inner.renderer.current()
    }

    /// Subscribe to the number of cycles currently fetching.
    pub fn in_flight(&self) -> watch::Receiver<usize> {
        self.inner.in_flight.subscribe()
    }

    // ── Cycle ────────────────────────────────────────────────────────

    /// Run one complete cycle on the caller's task.
    ///
    /// Cycles are independent: several may be in flight at once. Under
    /// the default ordering policy, only the latest-dispatched cycle to
    /// complete is painted.
    pub async fn run_cycle(&self) -> CycleReport {
        let cycle = self.inner.next_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        let filter = self.inner.filter.lock().await.clone();
        let _guard = InFlight::enter(&self.inner.in_flight);
        debug!(cycle, "cycle started");

        match fetch_snapshot(&self.inner.client).await {
            Ok(snapshot) => {
                let view = view::build(&snapshot, &filter);
                if self.inner.renderer.paint(view, cycle) {
                    debug!(cycle, "cycle rendered");
                    CycleReport::Rendered { cycle }
                } else {
                    CycleReport::Superseded { cycle }
                }
            }
            Err(err) => {
                warn!(cycle, error = %err, "cycle failed");
                if self.inner.renderer.report_failure(&err, cycle) {
                    CycleReport::Failed {
                        cycle,
                        message: report::failure_message(&err, self.inner.renderer.language()),
                    }
                } else {
                    CycleReport::Superseded { cycle }
                }
            }
        }
    }

    /// Fetch one getter by key, outside the cycle pipeline.
    pub async fn getter_detail(&self, key: &str) -> Result<GetterDetail, CoreError> {
        match self.inner.client.getter(key).await {
            Ok(detail) => Ok(detail),
            Err(e) if e.is_not_found() => Err(CoreError::GetterNotFound {
                key: key.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Issue all five requests concurrently; the first failure fails the cycle.
async fn fetch_snapshot(client: &DataClient) -> Result<Snapshot, CoreError> {
    let (status, getter_schema, executor_schema, getters, executors) = tokio::try_join!(
        client.status(),
        client.getter_schema(),
        client.executor_schema(),
        client.getters(),
        client.executors(),
    )?;
    Ok(Snapshot {
        status,
        getter_schema,
        executor_schema,
        getters,
        executors,
    })
}

/// Counts a cycle as in flight until dropped, including on abort.
struct InFlight<'a>(&'a watch::Sender<usize>);

impl<'a> InFlight<'a> {
    fn enter(tx: &'a watch::Sender<usize>) -> Self {
        tx.send_modify(|n| *n += 1);
        Self(tx)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Spawns one cycle per trigger. Dropping the `JoinSet` on cancellation
/// aborts every cycle still in flight.
async fn dispatcher_task(
    dash: Dashboard,
    mut rx: mpsc::UnboundedReceiver<CycleTrigger>,
    cancel: CancellationToken,
) {
    let mut cycles = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(_) = cycles.join_next(), if !cycles.is_empty() => {}
            trigger = rx.recv() => {
                let Some(trigger) = trigger else { break };
                debug!(?trigger, "dispatching cycle");
                let dash = dash.clone();
                cycles.spawn(async move {
                    dash.run_cycle().await;
                });
            }
        }
    }
    debug!(in_flight = cycles.len(), "dispatcher stopped");
}
