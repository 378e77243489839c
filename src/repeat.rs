use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

// Shared between the scheduler and one spawned sequence. Invocations happen while
// holding the lock, so flipping `live` under the lock is a hard stop.
struct Guard {
  live: Mutex<bool>,
}

impl Guard {
  fn lock(&self) -> MutexGuard<'_, bool> {
    match self.live.lock() {
      Ok(live) => live,
      Err(poisoned) => poisoned.into_inner(),
    }
  }
}

struct RepeatTask {
  guard: Arc<Guard>,
  handle: JoinHandle<()>,
}

/// Repeats an action while a direction is held: once right away, again after
/// `initial_delay`, then every `interval` until cancelled.
///
/// At most one sequence exists. Starting a new one stops the old one first, and
/// once [`RepeatScheduler::cancel`] returns the old action can no longer run.
pub struct RepeatScheduler {
  initial_delay: Duration,
  interval: Duration,
  current: Option<RepeatTask>,
}

impl RepeatScheduler {
  pub fn new(initial_delay: Duration, interval: Duration) -> RepeatScheduler {
    RepeatScheduler {
      initial_delay,
      interval,
      current: None,
    }
  }

  pub fn is_active(&self) -> bool {
    self.current.is_some()
  }

  /// Must be called from within a tokio runtime.
  pub fn start<F>(&mut self, mut action: F)
  where
    F: FnMut() + Send + 'static,
  {
    self.cancel();

    let guard = Arc::new(Guard {
      live: Mutex::new(true),
    });
    action();

    let initial_delay = self.initial_delay;
    let interval = self.interval;
    let task_guard = guard.clone();
    let handle = tokio::spawn(async move {
      tokio::time::sleep(initial_delay).await;
      loop {
        {
          let live = task_guard.lock();
          if !*live {
            return;
          }
          action();
        }
        tokio::time::sleep(interval).await;
      }
    });

    log::debug!("repeat started");
    self.current = Some(RepeatTask { guard, handle });
  }

  pub fn cancel(&mut self) {
    if let Some(task) = self.current.take() {
      *task.guard.lock() = false;
      task.handle.abort();
      log::debug!("repeat cancelled");
    }
  }
}

impl Drop for RepeatScheduler {
  fn drop(&mut self) {
    self.cancel();
  }
}
