use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::runtime::Builder;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::notify::{DueEvent, Notifier};
use crate::reminder::SharedStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

struct Worker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Background due-check loop over a live store handle.
///
/// The loop runs on its own thread with a single-threaded tokio runtime.
/// Mutations made through other `SharedStore` clones are seen on the next
/// wake, so the scheduler never needs restarting after an edit.
pub struct Scheduler {
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
    events: UnboundedSender<DueEvent>,
    interval: Duration,
    state: SchedulerState,
    worker: Option<Worker>,
}

impl Scheduler {
    pub fn new(
        store: SharedStore,
        notifier: Arc<dyn Notifier>,
        events: UnboundedSender<DueEvent>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            events,
            interval: interval.max(Duration::from_millis(1)),
            state: SchedulerState::Idle,
            worker: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Idle/Stopped -> Running. A no-op while already running.
    pub fn start(&mut self) -> io::Result<()> {
        if self.state == SchedulerState::Running {
            return Ok(());
        }

        let runtime = Builder::new_current_thread().enable_time().build()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let store = self.store.clone();
        let notifier = Arc::clone(&self.notifier);
        let events = self.events.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("reminder-scheduler".to_string())
            .spawn(move || {
                runtime.block_on(poll_loop(store, notifier, events, interval, shutdown_rx));
            })?;

        self.worker = Some(Worker {
            shutdown: shutdown_tx,
            handle,
        });
        self.state = SchedulerState::Running;
        info!(interval_ms = interval.as_millis() as u64, "scheduler started");
        Ok(())
    }

    /// Request the loop to exit and wait for its thread. Safe to call
    /// repeatedly; once this returns no further due-events are produced.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.state = SchedulerState::Stopping;
        let _ = worker.shutdown.send(());
        if worker.handle.join().is_err() {
            error!("scheduler thread panicked");
        }
        self.state = SchedulerState::Stopped;
        info!("scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
    events: UnboundedSender<DueEvent>,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                scan_once(&store, notifier.as_ref(), &events, Local::now());
            }
        }
    }
    debug!("poll loop exited");
}

/// One scheduler wake: claim everything due at `now`, then dispatch with the
/// store lock released. Returns the number of reminders that fired.
///
/// Reminders are marked notified before dispatch, so a failed notification
/// is not retried; it is reported with `delivered: false` instead. A
/// panicking notifier counts as a failed dispatch and the scan carries on.
pub fn scan_once(
    store: &SharedStore,
    notifier: &dyn Notifier,
    events: &UnboundedSender<DueEvent>,
    now: DateTime<Local>,
) -> usize {
    let due = store.lock().claim_due(now);

    for reminder in &due {
        let title = reminder.text.clone();
        let message = reminder.due_message();
        info!(id = %reminder.id, "reminder due");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| notifier.notify(&title, &message)));
        let delivered = match outcome {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(id = %reminder.id, %err, "desktop notification failed");
                false
            }
            Err(_) => {
                error!(id = %reminder.id, "notifier panicked");
                false
            }
        };

        let event = DueEvent {
            id: reminder.id,
            title,
            message,
            delivered,
        };
        if events.send(event).is_err() {
            warn!(id = %reminder.id, "no receiver for due event");
        }
    }

    due.len()
}
