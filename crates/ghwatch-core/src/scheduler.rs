// ── Refresh scheduler ──
//
// Owns the single periodic timer. Every trigger, timed or not, is sent
// down one channel to the dashboard's dispatcher, which starts a cycle
// per trigger. Reconfiguring tears the old timer down before a new one
// exists, so two timers never coexist.

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::RefreshInterval;

/// Why a cycle was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// The one cycle run at startup.
    Initial,
    /// The periodic timer fired.
    Timer,
    /// Operator asked for a reload.
    Manual,
    /// The search query changed.
    Filter,
}

struct Timer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Timer {
    fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

struct SchedulerState {
    interval: RefreshInterval,
    timer: Option<Timer>,
}

pub struct Scheduler {
    trigger_tx: mpsc::UnboundedSender<CycleTrigger>,
    /// Parent of every timer's token; cancelling it stops the scheduler.
    cancel: CancellationToken,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    /// Create a scheduler with no timer installed.
    pub fn new(trigger_tx: mpsc::UnboundedSender<CycleTrigger>, cancel: CancellationToken) -> Self {
        Self {
            trigger_tx,
            cancel,
            state: Mutex::new(SchedulerState {
                interval: RefreshInterval::OFF,
                timer: None,
            }),
        }
    }

    /// Replace the periodic timer. `OFF` leaves no timer running.
    ///
    /// Does not start a cycle by itself; the first timed trigger arrives
    /// one full period after this call.
    pub async fn set_interval(&self, interval: RefreshInterval) {
        let mut state = self.state.lock().await;
        if let Some(timer) = state.timer.take() {
            timer.stop();
        }
        state.interval = interval;

        let Some(period) = interval.period() else {
            info!("automatic refresh disabled");
            return;
        };

        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(timer_task(
            period,
            self.trigger_tx.clone(),
            cancel.clone(),
        ));
        state.timer = Some(Timer { cancel, handle });
        info!(%interval, "automatic refresh scheduled");
    }

    /// Ask the dispatcher for a cycle right now.
    pub fn trigger(&self, trigger: CycleTrigger) {
        if self.trigger_tx.send(trigger).is_err() {
            debug!(?trigger, "dispatcher gone, trigger dropped");
        }
    }

    pub async fn interval(&self) -> RefreshInterval {
        self.state.lock().await.interval
    }

    /// Remove the timer without changing the configured interval.
    pub async fn stop(&self) {
        if let Some(timer) = self.state.lock().await.timer.take() {
            timer.stop();
        }
    }
}

async fn timer_task(
    period: std::time::Duration,
    trigger_tx: mpsc::UnboundedSender<CycleTrigger>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if trigger_tx.send(CycleTrigger::Timer).is_err() {
                    break;
                }
            }
        }
    }
    debug!("refresh timer stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain(rx: &mut mpsc::UnboundedReceiver<CycleTrigger>) -> Vec<CycleTrigger> {
        let mut out = Vec::new();
        while let Ok(trigger) = rx.try_recv() {
            out.push(trigger);
        }
        out
    }

    fn ms(millis: u64) -> RefreshInterval {
        RefreshInterval::from_millis(millis).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn reconfigure_keeps_only_the_new_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx, CancellationToken::new());

        scheduler.set_interval(ms(5_000)).await;
        scheduler.set_interval(ms(2_000)).await;
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        let fired = drain(&mut rx);
        assert_eq!(fired.len(), 5);
        assert!(fired.iter().all(|t| *t == CycleTrigger::Timer));
        assert_eq!(scheduler.interval().await, ms(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn off_stops_all_timed_triggers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx, CancellationToken::new());

        scheduler.set_interval(ms(1_000)).await;
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(drain(&mut rx).len(), 3);

        scheduler.set_interval(RefreshInterval::OFF).await;
        assert!(scheduler.interval().await.is_off());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_trigger_before_first_full_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx, CancellationToken::new());

        scheduler.set_interval(ms(10_000)).await;
        tokio::time::sleep(Duration::from_millis(9_900)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_the_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let scheduler = Scheduler::new(tx, cancel.clone());

        scheduler.set_interval(ms(1_000)).await;
        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn manual_triggers_pass_through() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx, CancellationToken::new());

        scheduler.trigger(CycleTrigger::Manual);
        scheduler.trigger(CycleTrigger::Filter);
        assert_eq!(
            drain(&mut rx),
            vec![CycleTrigger::Manual, CycleTrigger::Filter]
        );
    }
}
