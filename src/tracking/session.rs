use std::time::Duration;

use crate::event::{PointerAction, PointerEvent, Position};
use crate::gesture::Gesture;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Session {
  Idle,
  Pressed { started: Duration, center: Position },
  // Moved past the dead zone before the dead time ran out. Flicks own this contact.
  Cancelled,
}

/// Decides whether the primary contact is acting as a joystick.
///
/// Promotion is never stored: a pressed session is promoted whenever more than
/// `dead_time` has passed since the press, checked at each event.
pub struct TouchSessionTracker {
  dead_zone: f32,
  dead_time: Duration,
  session: Session,
}

impl TouchSessionTracker {
  pub fn new(dead_zone: f32, dead_time: Duration) -> TouchSessionTracker {
    TouchSessionTracker {
      dead_zone,
      dead_time,
      session: Session::Idle,
    }
  }

  pub fn is_promoted(&self, now: Duration) -> bool {
    match self.session {
      Session::Pressed { started, .. } => now.saturating_sub(started) > self.dead_time,
      _ => false,
    }
  }

  pub fn is_cancelled(&self) -> bool {
    self.session == Session::Cancelled
  }

  pub fn handle(&mut self, event: &PointerEvent) -> Option<Gesture> {
    let now = event.timestamp;

    if !event.is_primary() {
      if event.action == PointerAction::SecondaryDown && self.is_promoted(now) {
        return Some(Gesture::Tap);
      }
      log::trace!("ignoring {:?} for pointer {}", event.action, event.pointer_index);
      return None;
    }

    match event.action {
      PointerAction::Down => {
        self.session = Session::Pressed {
          started: now,
          center: event.position,
        };
        None
      }
      PointerAction::Up | PointerAction::Cancel => {
        let promoted = self.is_promoted(now);
        self.session = Session::Idle;
        if promoted {
          Some(Gesture::JoyNeutral)
        } else {
          None
        }
      }
      PointerAction::Move => {
        let center = match self.session {
          Session::Pressed { center, .. } => center,
          _ => return None,
        };
        let (dx, dy) = event.position.delta_from(center);

        if self.is_promoted(now) {
          Some(self.classify(dx, dy))
        } else {
          if dx.abs() > self.dead_zone || dy.abs() > self.dead_zone {
            log::trace!("joystick cancelled by early movement ({}, {})", dx, dy);
            self.session = Session::Cancelled;
          }
          None
        }
      }
      PointerAction::SecondaryDown => None,
    }
  }

  fn classify(&self, dx: f32, dy: f32) -> Gesture {
    if dx.abs() >= dy.abs() {
      if dx.abs() > self.dead_zone {
        return if dx > 0.0 { Gesture::JoyRight } else { Gesture::JoyLeft };
      }
    } else if dy.abs() > self.dead_zone {
      return if dy > 0.0 { Gesture::JoyDown } else { Gesture::JoyUp };
    }
    Gesture::JoyNeutral
  }
}
