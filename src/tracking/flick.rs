use std::time::Duration;

use super::SwipeTracking;
use crate::config::FlickConfig;
use crate::event::{PointerAction, PointerEvent, Position};
use crate::gesture::Gesture;

// tan(45°). Anything at least this steep is a vertical fling.
const ANGLE_THRESHOLD: f64 = 1.0;

#[derive(Clone, Copy, Debug)]
struct Contact {
  down_at: Duration,
  down: Position,
  in_tap_region: bool,
  in_bigger_tap_region: bool,
  in_long_press: bool,
  double_tapping: bool,
}

#[derive(Clone, Copy, Debug)]
struct PreviousTap {
  down: Position,
  up_at: Duration,
  in_bigger_tap_region: bool,
}

/// Recognizes taps, double taps and four-way flings from the raw pointer stream.
///
/// Timed outcomes (single-tap confirmation, long-press suppression) are driven by
/// [`FlickRecognizer::poll`], which must be called at [`FlickRecognizer::next_deadline`]
/// before any later event is handled.
pub struct FlickRecognizer {
  touch_slop_sq: f32,
  double_tap_slop_sq: f32,
  double_tap_timeout: Duration,
  double_tap_min_time: Duration,
  long_press_timeout: Duration,
  min_fling_velocity: f32,

  contact: Option<Contact>,
  previous: Option<PreviousTap>,
  tap_deadline: Option<Duration>,
  long_press_deadline: Option<Duration>,
  defer_confirm: bool,
  velocity: SwipeTracking,
}

impl FlickRecognizer {
  pub fn new(config: &FlickConfig, density: f32) -> FlickRecognizer {
    let touch_slop = config.touch_slop * density;
    let double_tap_slop = config.double_tap_slop * density;
    FlickRecognizer {
      touch_slop_sq: touch_slop * touch_slop,
      double_tap_slop_sq: double_tap_slop * double_tap_slop,
      double_tap_timeout: config.double_tap_timeout,
      double_tap_min_time: config.double_tap_min_time,
      long_press_timeout: config.long_press_timeout,
      min_fling_velocity: config.min_fling_velocity * density,
      contact: None,
      previous: None,
      tap_deadline: None,
      long_press_deadline: None,
      defer_confirm: false,
      velocity: SwipeTracking::new(),
    }
  }

  pub fn next_deadline(&self) -> Option<Duration> {
    match (self.tap_deadline, self.long_press_deadline) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    }
  }

  /// Fires every deadline that has passed by `now`.
  pub fn poll(&mut self, now: Duration) -> Option<Gesture> {
    let mut gesture = None;

    if let Some(deadline) = self.tap_deadline {
      if deadline <= now {
        self.tap_deadline = None;
        if self.contact.is_some() {
          // Still down: confirm on release instead.
          self.defer_confirm = true;
        } else {
          gesture = Some(Gesture::Tap);
        }
      }
    }

    if let Some(deadline) = self.long_press_deadline {
      if deadline <= now {
        self.long_press_deadline = None;
        self.tap_deadline = None;
        self.defer_confirm = false;
        if let Some(contact) = self.contact.as_mut() {
          log::trace!("long press after {:?}", now.saturating_sub(contact.down_at));
          contact.in_long_press = true;
        }
      }
    }

    gesture
  }

  pub fn handle(&mut self, event: &PointerEvent) -> Option<Gesture> {
    let now = event.timestamp;
    match event.action {
      PointerAction::SecondaryDown => {
        self.cancel_taps();
        None
      }
      _ if !event.is_primary() => None,
      PointerAction::Down => self.on_down(now, event.position),
      PointerAction::Move => {
        self.on_move(now, event.position);
        None
      }
      PointerAction::Up => self.on_up(now, event.position),
      PointerAction::Cancel => {
        self.cancel();
        None
      }
    }
  }

  fn on_down(&mut self, now: Duration, position: Position) -> Option<Gesture> {
    let had_tap_pending = matches!(self.tap_deadline.take(), Some(deadline) if deadline > now);

    let double_tapping = had_tap_pending
      && self
        .previous
        .map_or(false, |previous| self.is_considered_double_tap(&previous, now, position));
    if !double_tapping {
      self.tap_deadline = Some(now + self.double_tap_timeout);
    }

    self.contact = Some(Contact {
      down_at: now,
      down: position,
      in_tap_region: true,
      in_bigger_tap_region: true,
      in_long_press: false,
      double_tapping,
    });
    self.defer_confirm = false;
    self.long_press_deadline = Some(now + self.long_press_timeout);
    self.velocity.reset();
    self.velocity.measure_event(now, position);

    if double_tapping {
      Some(Gesture::DoubleTap)
    } else {
      None
    }
  }

  fn on_move(&mut self, now: Duration, position: Position) {
    let contact = match self.contact.as_mut() {
      Some(contact) if !contact.in_long_press => contact,
      _ => return,
    };
    self.velocity.measure_event(now, position);

    if contact.double_tapping || !contact.in_tap_region {
      return;
    }
    let distance_sq = position.distance_squared(contact.down);
    if distance_sq > self.touch_slop_sq {
      contact.in_tap_region = false;
      self.tap_deadline = None;
      self.long_press_deadline = None;
    }
    if distance_sq > self.double_tap_slop_sq {
      contact.in_bigger_tap_region = false;
    }
  }

  fn on_up(&mut self, now: Duration, position: Position) -> Option<Gesture> {
    let contact = self.contact.take()?;
    self.velocity.measure_event(now, position);
    let velocity = self.velocity.flush();

    let gesture = if contact.double_tapping {
      None
    } else if contact.in_long_press {
      self.tap_deadline = None;
      None
    } else if contact.in_tap_region {
      if self.defer_confirm {
        Some(Gesture::Tap)
      } else {
        None
      }
    } else {
      match velocity {
        Some((vx, vy)) if vx.abs() > self.min_fling_velocity || vy.abs() > self.min_fling_velocity => {
          let (dx, dy) = position.delta_from(contact.down);
          Some(classify_fling(dx, dy))
        }
        _ => None,
      }
    };

    self.previous = Some(PreviousTap {
      down: contact.down,
      up_at: now,
      in_bigger_tap_region: contact.in_bigger_tap_region,
    });
    self.defer_confirm = false;
    self.long_press_deadline = None;
    gesture
  }

  fn is_considered_double_tap(&self, previous: &PreviousTap, now: Duration, position: Position) -> bool {
    if !previous.in_bigger_tap_region {
      return false;
    }
    let delta = now.saturating_sub(previous.up_at);
    if delta > self.double_tap_timeout || delta < self.double_tap_min_time {
      return false;
    }
    position.distance_squared(previous.down) < self.double_tap_slop_sq
  }

  fn cancel_taps(&mut self) {
    self.tap_deadline = None;
    self.long_press_deadline = None;
    self.defer_confirm = false;
    if let Some(contact) = self.contact.as_mut() {
      contact.in_tap_region = false;
      contact.in_bigger_tap_region = false;
      contact.in_long_press = false;
      contact.double_tapping = false;
    }
  }

  fn cancel(&mut self) {
    self.tap_deadline = None;
    self.long_press_deadline = None;
    self.defer_confirm = false;
    self.contact = None;
    self.velocity.reset();
  }
}

/// Classifies a fling by the angle of its displacement. A 45° fling counts as
/// vertical; `dx == 0` is as vertical as it gets.
pub fn classify_fling(dx: f32, dy: f32) -> Gesture {
  let tan = if dx != 0.0 {
    (dy as f64 / dx as f64).abs()
  } else {
    f64::MAX
  };

  if tan >= ANGLE_THRESHOLD {
    if dy > 0.0 {
      Gesture::SwipeDown
    } else {
      Gesture::SwipeUp
    }
  } else if dx > 0.0 {
    Gesture::SwipeRight
  } else {
    Gesture::SwipeLeft
  }
}
