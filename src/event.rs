use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Position on the touch surface in pixels. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
  pub x: f32,
  pub y: f32,
}

impl Position {
  pub fn new(x: f32, y: f32) -> Position {
    Position { x, y }
  }

  /// Displacement from `origin` to `self`.
  pub fn delta_from(&self, origin: Position) -> (f32, f32) {
    (self.x - origin.x, self.y - origin.y)
  }

  pub fn distance_squared(&self, other: Position) -> f32 {
    let (dx, dy) = self.delta_from(other);
    dx * dx + dy * dy
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerAction {
  Down,
  Move,
  Up,
  Cancel,
  SecondaryDown,
}

/// A raw pointer event. `timestamp` is measured on the monotonic clock that
/// stamped the stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
  pub action: PointerAction,
  pub position: Position,
  pub pointer_index: usize,
  pub timestamp: Duration,
}

impl PointerEvent {
  pub fn new(action: PointerAction, x: f32, y: f32, timestamp: Duration) -> PointerEvent {
    PointerEvent {
      action,
      position: Position::new(x, y),
      pointer_index: 0,
      timestamp,
    }
  }

  pub fn with_index(mut self, pointer_index: usize) -> PointerEvent {
    self.pointer_index = pointer_index;
    self
  }

  pub fn is_primary(&self) -> bool {
    self.pointer_index == 0
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyAction {
  Down,
  LongPress,
  Up,
}

/// A raw event for the single hardware button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
  pub action: KeyAction,
  pub timestamp: Duration,
}

impl KeyEvent {
  pub fn new(action: KeyAction, timestamp: Duration) -> KeyEvent {
    KeyEvent { action, timestamp }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawEvent {
  Pointer(PointerEvent),
  Key(KeyEvent),
}

impl RawEvent {
  pub fn timestamp(&self) -> Duration {
    match self {
      RawEvent::Pointer(e) => e.timestamp,
      RawEvent::Key(e) => e.timestamp,
    }
  }
}

impl From<PointerEvent> for RawEvent {
  fn from(event: PointerEvent) -> Self {
    RawEvent::Pointer(event)
  }
}

impl From<KeyEvent> for RawEvent {
  fn from(event: KeyEvent) -> Self {
    RawEvent::Key(event)
  }
}
