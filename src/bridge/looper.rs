use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

type Task = Box<dyn FnOnce() + Send>;

/// The foreground (UI) context.
///
/// Work posted through a [`UiHandle`] runs only when the owner of the looper
/// pumps it, so completions always land on the thread that owns the looper.
pub struct Looper {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

/// Cloneable handle for posting work onto a [`Looper`] from any thread.
#[derive(Clone)]
pub struct UiHandle {
    tx: Sender<Task>,
}

impl UiHandle {
    /// Queue `task` on the looper. Returns `false` if the looper is gone.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }
}

impl Looper {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Task>();
        Self { tx, rx }
    }

    pub fn handle(&self) -> UiHandle {
        UiHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run everything already queued without blocking. Returns how many tasks ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Block for at most `timeout` waiting for one task, then run it.
    pub fn run_one(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Pump tasks until `done` returns true or `timeout` elapses.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.run_one(deadline - now);
        }
    }
}

impl Default for Looper {
    fn default() -> Self {
        Self::new()
    }
}
