use std::time::Duration;

use crate::event::{KeyAction, KeyEvent};
use crate::gesture::Gesture;

/// Tells a held hardware button apart from a short press.
pub struct ButtonTracker {
  hold_time: Option<Duration>,
  pressed_at: Option<Duration>,
  held_signalled: bool,
}

impl ButtonTracker {
  pub fn new(hold_time: Option<Duration>) -> ButtonTracker {
    ButtonTracker {
      hold_time,
      pressed_at: None,
      held_signalled: false,
    }
  }

  pub fn is_pressed(&self) -> bool {
    self.pressed_at.is_some()
  }

  pub fn next_deadline(&self) -> Option<Duration> {
    match (self.pressed_at, self.hold_time) {
      (Some(pressed_at), Some(hold_time)) if !self.held_signalled => Some(pressed_at + hold_time),
      _ => None,
    }
  }

  pub fn poll(&mut self, now: Duration) -> Option<Gesture> {
    match self.next_deadline() {
      Some(deadline) if deadline <= now => self.signal_held(),
      _ => None,
    }
  }

  pub fn handle(&mut self, event: &KeyEvent) -> Option<Gesture> {
    match event.action {
      KeyAction::Down => {
        if self.pressed_at.is_none() {
          self.pressed_at = Some(event.timestamp);
          self.held_signalled = false;
        }
        None
      }
      KeyAction::LongPress => {
        if self.pressed_at.is_none() {
          log::trace!("long press without a press");
          return None;
        }
        self.signal_held()
      }
      KeyAction::Up => {
        if self.pressed_at.take().is_none() {
          log::trace!("release without a press");
          return None;
        }
        let held = std::mem::replace(&mut self.held_signalled, false);
        if held {
          None
        } else {
          Some(Gesture::HardwareButton)
        }
      }
    }
  }

  fn signal_held(&mut self) -> Option<Gesture> {
    if self.held_signalled {
      return None;
    }
    self.held_signalled = true;
    Some(Gesture::HardwareButtonHeld)
  }
}
