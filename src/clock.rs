use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source. Readings are offsets from an arbitrary origin.
pub trait Clock: Send + Sync {
  fn now(&self) -> Duration;
}

pub struct MonotonicClock {
  origin: Instant,
}

impl MonotonicClock {
  pub fn new() -> MonotonicClock {
    MonotonicClock {
      origin: Instant::now(),
    }
  }
}

impl Default for MonotonicClock {
  fn default() -> Self {
    MonotonicClock::new()
  }
}

impl Clock for MonotonicClock {
  fn now(&self) -> Duration {
    self.origin.elapsed()
  }
}

// Hand-driven clock. Clones share the same reading.
#[derive(Clone, Default)]
pub struct ManualClock {
  millis: Arc<AtomicU64>,
}

impl ManualClock {
  pub fn new() -> ManualClock {
    ManualClock::default()
  }

  pub fn set(&self, now: Duration) {
    self.millis.store(now.as_millis() as u64, Ordering::SeqCst);
  }

  pub fn advance(&self, by: Duration) {
    self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Duration {
    Duration::from_millis(self.millis.load(Ordering::SeqCst))
  }
}
