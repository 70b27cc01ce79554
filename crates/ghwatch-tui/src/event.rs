//! Terminal input plus an adjustable tick, merged into one channel.
//!
//! The tick drives two things: the fetch throbber, which needs a fast
//! tick while any cycle is in flight, and the "cycle #N (age ago)" header,
//! which only needs one per second. The app retunes the rate with
//! [`EventReader::set_tick_rate`] whenever the in-flight count changes.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Tick period while at least one cycle is fetching.
pub const BUSY_TICK: Duration = Duration::from_millis(125);
/// Tick period while idle.
pub const IDLE_TICK: Duration = Duration::from_secs(1);

/// Tick period for a given number of in-flight cycles.
pub fn tick_rate(in_flight: usize) -> Duration {
    if in_flight > 0 { BUSY_TICK } else { IDLE_TICK }
}

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal was resized; redraw immediately.
    Resize,
    Tick,
}

/// Reads terminal events in a background task and sends them over a channel.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    rate: watch::Sender<Duration>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(initial_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (rate, rate_rx) = watch::channel(initial_rate);
        let cancel = CancellationToken::new();

        tokio::spawn(reader_task(tx, rate_rx, cancel.clone()));

        Self { rx, rate, cancel }
    }

    /// Receive the next event. Returns `None` if the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Change the tick period. Setting the current period again is a no-op,
    /// so the running interval is not reset.
    pub fn set_tick_rate(&self, period: Duration) {
        self.rate.send_if_modified(|current| {
            if *current == period {
                return false;
            }
            *current = period;
            true
        });
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn reader_task(
    tx: mpsc::UnboundedSender<Event>,
    mut rate_rx: watch::Receiver<Duration>,
    cancel: CancellationToken,
) {
    let mut event_stream = EventStream::new();
    let mut tick = ticker(*rate_rx.borrow_and_update());

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,

            Ok(()) = rate_rx.changed() => {
                tick = ticker(*rate_rx.borrow_and_update());
                continue;
            }

            _ = tick.tick() => Event::Tick,

            Some(Ok(crossterm_event)) = event_stream.next() => match crossterm_event {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                CrosstermEvent::Resize(..) => Event::Resize,
                _ => continue,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_fast_only_while_fetching() {
        assert_eq!(tick_rate(0), IDLE_TICK);
        assert_eq!(tick_rate(1), BUSY_TICK);
        assert_eq!(tick_rate(3), BUSY_TICK);
    }

    /// A reader with no background task attached.
    fn detached(rate: Duration) -> (EventReader, watch::Receiver<Duration>) {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (rate, rate_rx) = watch::channel(rate);
        let reader = EventReader {
            rx,
            rate,
            cancel: CancellationToken::new(),
        };
        (reader, rate_rx)
    }

    #[test]
    fn retuning_to_the_same_rate_is_not_a_change() {
        let (reader, mut rx) = detached(IDLE_TICK);

        reader.set_tick_rate(IDLE_TICK);
        assert!(!rx.has_changed().is_ok_and(|changed| changed));

        reader.set_tick_rate(BUSY_TICK);
        assert!(rx.has_changed().is_ok_and(|changed| changed));
        assert_eq!(*rx.borrow_and_update(), BUSY_TICK);
    }
}
