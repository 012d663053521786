// Tick source - Coarse repeating timer that wakes the scheduler
//
// Runs on its own thread so it keeps firing whatever the UI thread is doing.
// Timing precision does not matter here: the scheduler reads the audio clock.

use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

/// Interval between two scheduler wake-ups
pub const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// Work run on every tick
pub type TickTask = Box<dyn FnMut() + Send + 'static>;

/// A repeating task with start/stop
pub trait RepeatingTask: Send {
    /// (Re)start firing `task` every `interval`, replacing any running one
    fn start(&mut self, interval: Duration, task: TickTask) -> io::Result<()>;

    /// Cancel the repeating task. No tick runs after this returns.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

struct TickWorker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Repeating task on a dedicated thread
#[derive(Default)]
pub struct ThreadTicker {
    worker: Option<TickWorker>,
}

impl ThreadTicker {
    pub fn new() -> Self {
        Self { worker: None }
    }
}

impl RepeatingTask for ThreadTicker {
    fn start(&mut self, interval: Duration, mut task: TickTask) -> io::Result<()> {
        self.stop();

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let handle = thread::Builder::new()
            .name("gridclick-tick".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => task(),
                    }
                }
                log::debug!("Tick thread exiting");
            })?;

        log::debug!("Tick thread started ({} ms)", interval.as_millis());
        self.worker = Some(TickWorker { stop_tx, handle });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // A dropped receiver is fine: the thread is already gone
        let _ = worker.stop_tx.send(());

        if worker.handle.thread().id() == thread::current().id() {
            // Stopped from inside a tick, the loop exits on its next select
            return;
        }
        if worker.handle.join().is_err() {
            log::error!("Tick thread panicked");
        }
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Default)]
struct ManualState {
    task: Option<TickTask>,
    interval: Option<Duration>,
    start_count: usize,
}

/// Repeating task fired by hand, for tests and headless drivers
///
/// Clones share the same task, so one clone can be handed to the controller
/// while another one fires ticks.
#[derive(Clone, Default)]
pub struct ManualTicker {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the task once. Returns false when stopped.
    pub fn fire(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.task.as_mut() {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Interval passed to the last `start`
    pub fn interval(&self) -> Option<Duration> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).interval
    }

    /// Number of times the task was (re)started
    pub fn start_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .start_count
    }
}

impl RepeatingTask for ManualTicker {
    fn start(&mut self, interval: Duration, task: TickTask) -> io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.task = Some(task);
        state.interval = Some(interval);
        state.start_count += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.task = None;
        state.interval = None;
    }

    fn is_running(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .task
            .is_some()
    }
}
