use std::collections::VecDeque;
use std::time::Duration;

use crate::event::Position;

mod button;
mod flick;
mod session;

pub use button::ButtonTracker;
pub use flick::FlickRecognizer;
pub use session::TouchSessionTracker;

// Only the tail of a swipe says anything about how it was released.
const VELOCITY_HORIZON: Duration = Duration::from_millis(100);

// Tracks the velocity of a swipe.
#[derive(Default)]
pub struct SwipeTracking {
  samples: VecDeque<(Duration, Position)>,
}

impl SwipeTracking {
  pub fn new() -> SwipeTracking {
    SwipeTracking {
      samples: VecDeque::new(),
    }
  }

  pub fn measure_event(&mut self, t: Duration, position: Position) {
    while let Some(&(tfirst, _)) = self.samples.front() {
      if t.saturating_sub(tfirst) > VELOCITY_HORIZON {
        self.samples.pop_front();
      } else {
        break;
      }
    }
    self.samples.push_back((t, position));
  }

  /// Returns the velocity in px/s over the tracked window and resets the tracker.
  pub fn flush(&mut self) -> Option<(f32, f32)> {
    let first = self.samples.front().copied();
    let last = self.samples.back().copied();
    self.samples.clear();

    let ((tstart, start), (tend, end)) = (first?, last?);
    let tdelta = tend.saturating_sub(tstart).as_secs_f32();
    if tdelta <= 0.0 {
      return None;
    }

    let (dx, dy) = end.delta_from(start);
    Some((dx / tdelta, dy / tdelta))
  }

  pub fn reset(&mut self) {
    self.samples.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
  }

  #[test]
  fn velocity_uses_recent_samples_only() {
    let mut tracking = SwipeTracking::new();
    tracking.measure_event(ms(0), Position::new(0.0, 0.0));
    tracking.measure_event(ms(500), Position::new(0.0, 0.0));
    tracking.measure_event(ms(550), Position::new(50.0, -25.0));

    let (vx, vy) = tracking.flush().unwrap();
    assert!((vx - 1000.0).abs() < 0.5);
    assert!((vy + 500.0).abs() < 0.5);
  }

  #[test]
  fn single_sample_has_no_velocity() {
    let mut tracking = SwipeTracking::new();
    tracking.measure_event(ms(10), Position::new(3.0, 4.0));
    assert_eq!(tracking.flush(), None);
    assert_eq!(tracking.flush(), None);
  }
}
