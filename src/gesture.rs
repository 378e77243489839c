use std::fmt;
use tokio::sync::broadcast;

/// Default number of gestures a slow subscriber may fall behind before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Discrete gestures produced by the engine. Each one is a momentary event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
  JoyUp,
  JoyDown,
  JoyLeft,
  JoyRight,
  JoyNeutral,
  Tap,
  DoubleTap,
  SwipeUp,
  SwipeDown,
  SwipeLeft,
  SwipeRight,
  HardwareButton,
  HardwareButtonHeld,
}

impl fmt::Display for Gesture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

// Publishes gestures as independent notifications. There is no "current" gesture:
// subscribers only ever see pulses sent after they subscribed.
pub struct GesturePublisher {
  sender: broadcast::Sender<Gesture>,
}

impl GesturePublisher {
  pub fn new(capacity: usize) -> GesturePublisher {
    let (sender, _) = broadcast::channel(capacity.max(1));
    GesturePublisher { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Gesture> {
    self.sender.subscribe()
  }

  pub fn publish(&self, gesture: Gesture) {
    log::debug!("gesture: {}", gesture);
    // Nobody listening is not an error; the pulse is simply dropped.
    let _ = self.sender.send(gesture);
  }
}

impl Default for GesturePublisher {
  fn default() -> Self {
    GesturePublisher::new(DEFAULT_CHANNEL_CAPACITY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn late_subscriber_sees_only_later_pulses() {
    let publisher = GesturePublisher::default();
    let mut early = publisher.subscribe();
    publisher.publish(Gesture::Tap);

    let mut late = publisher.subscribe();
    publisher.publish(Gesture::SwipeDown);

    assert_eq!(early.try_recv().unwrap(), Gesture::Tap);
    assert_eq!(early.try_recv().unwrap(), Gesture::SwipeDown);
    assert_eq!(late.try_recv().unwrap(), Gesture::SwipeDown);
    assert!(late.try_recv().is_err());
  }

  #[test]
  fn repeated_pulses_are_not_conflated() {
    let publisher = GesturePublisher::default();
    let mut rx = publisher.subscribe();
    publisher.publish(Gesture::JoyNeutral);
    publisher.publish(Gesture::JoyNeutral);

    assert_eq!(rx.try_recv().unwrap(), Gesture::JoyNeutral);
    assert_eq!(rx.try_recv().unwrap(), Gesture::JoyNeutral);
  }
}
