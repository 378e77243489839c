use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::event::{KeyEvent, PointerEvent, RawEvent};
use crate::gesture::{Gesture, GesturePublisher};
use crate::tracking::{ButtonTracker, FlickRecognizer, TouchSessionTracker};

/// Classifies raw input into gestures.
///
/// Every pointer event is fanned out to both the joystick session tracker and the
/// flick recognizer; each keeps its own state. Gestures are published in the order
/// the originating events arrived.
pub struct GestureEngine {
  session: TouchSessionTracker,
  flick: FlickRecognizer,
  button: ButtonTracker,
  publisher: GesturePublisher,
}

impl GestureEngine {
  pub fn new(config: &Config) -> GestureEngine {
    GestureEngine {
      session: TouchSessionTracker::new(config.dead_zone_px(), config.dead_time),
      flick: FlickRecognizer::new(&config.flick, config.density),
      button: ButtonTracker::new(config.button_hold_time),
      publisher: GesturePublisher::default(),
    }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Gesture> {
    self.publisher.subscribe()
  }

  /// Earliest instant at which [`GestureEngine::poll`] has something to do.
  pub fn next_deadline(&self) -> Option<Duration> {
    match (self.flick.next_deadline(), self.button.next_deadline()) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    }
  }

  /// Fires all timed outcomes due by `now`, each at its own deadline.
  pub fn poll(&mut self, now: Duration) -> Vec<Gesture> {
    let mut emitted = Vec::new();
    while let Some(deadline) = self.next_deadline() {
      if deadline > now {
        break;
      }
      let gestures = [self.flick.poll(deadline), self.button.poll(deadline)];
      for gesture in gestures.into_iter().flatten() {
        self.emit(gesture, &mut emitted);
      }
    }
    emitted
  }

  pub fn handle(&mut self, event: &RawEvent) -> Vec<Gesture> {
    let mut emitted = self.poll(event.timestamp());
    match event {
      RawEvent::Pointer(pointer) => self.handle_pointer(pointer, &mut emitted),
      RawEvent::Key(key) => self.handle_key(key, &mut emitted),
    }
    emitted
  }

  fn handle_pointer(&mut self, event: &PointerEvent, emitted: &mut Vec<Gesture>) {
    if let Some(gesture) = self.session.handle(event) {
      self.emit(gesture, emitted);
    }
    if let Some(gesture) = self.flick.handle(event) {
      self.emit(gesture, emitted);
    }
  }

  fn handle_key(&mut self, event: &KeyEvent, emitted: &mut Vec<Gesture>) {
    if let Some(gesture) = self.button.handle(event) {
      self.emit(gesture, emitted);
    }
  }

  fn emit(&self, gesture: Gesture, emitted: &mut Vec<Gesture>) {
    self.publisher.publish(gesture);
    emitted.push(gesture);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::{KeyAction, PointerAction};

  fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
  }

  fn pointer(action: PointerAction, x: f32, y: f32, t: u64) -> RawEvent {
    PointerEvent::new(action, x, y, ms(t)).into()
  }

  fn key(action: KeyAction, t: u64) -> RawEvent {
    KeyEvent::new(action, ms(t)).into()
  }

  fn run(engine: &mut GestureEngine, events: &[RawEvent], settle: u64) -> Vec<Gesture> {
    let mut out = Vec::new();
    for event in events {
      out.extend(engine.handle(event));
    }
    out.extend(engine.poll(ms(settle)));
    out
  }

  #[test]
  fn scenario_promoted_move_emits_joy_down() {
    let mut engine = GestureEngine::new(&Config::default());
    let out = engine.handle(&pointer(PointerAction::Down, 100.0, 100.0, 0));
    assert!(out.is_empty());
    let out = engine.handle(&pointer(PointerAction::Move, 100.0, 120.0, 310));
    assert_eq!(out, vec![Gesture::JoyDown]);
  }

  #[test]
  fn scenario_early_swipe_goes_to_flick() {
    let mut engine = GestureEngine::new(&Config::default());
    let out = run(
      &mut engine,
      &[
        pointer(PointerAction::Down, 100.0, 100.0, 0),
        pointer(PointerAction::Move, 150.0, 100.0, 100),
        pointer(PointerAction::Move, 150.0, 140.0, 400),
        pointer(PointerAction::Move, 170.0, 140.0, 420),
        pointer(PointerAction::Up, 180.0, 140.0, 440),
      ],
      2000,
    );
    assert_eq!(out, vec![Gesture::SwipeRight]);
  }

  #[test]
  fn still_hold_emits_one_neutral_on_release() {
    let mut engine = GestureEngine::new(&Config::default());
    let out = run(
      &mut engine,
      &[
        pointer(PointerAction::Down, 40.0, 40.0, 0),
        pointer(PointerAction::Up, 40.0, 40.0, 1500),
      ],
      3000,
    );
    assert_eq!(out, vec![Gesture::JoyNeutral]);
  }

  #[test]
  fn quick_tap_is_only_a_tap() {
    let mut engine = GestureEngine::new(&Config::default());
    let out = run(
      &mut engine,
      &[
        pointer(PointerAction::Down, 40.0, 40.0, 0),
        pointer(PointerAction::Move, 42.0, 41.0, 30),
        pointer(PointerAction::Up, 42.0, 41.0, 90),
      ],
      1000,
    );
    assert_eq!(out, vec![Gesture::Tap]);
  }

  #[test]
  fn joystick_hold_with_confirm_finger() {
    let mut engine = GestureEngine::new(&Config::default());
    let out = run(
      &mut engine,
      &[
        pointer(PointerAction::Down, 100.0, 100.0, 0),
        pointer(PointerAction::Move, 100.0, 70.0, 350),
        PointerEvent::new(PointerAction::SecondaryDown, 200.0, 100.0, ms(600))
          .with_index(1)
          .into(),
        pointer(PointerAction::Move, 100.0, 100.0, 700),
        pointer(PointerAction::Up, 100.0, 100.0, 800),
      ],
      2000,
    );
    assert_eq!(
      out,
      vec![Gesture::JoyUp, Gesture::Tap, Gesture::JoyNeutral, Gesture::JoyNeutral]
    );
  }

  #[test]
  fn hardware_button_outcomes() {
    let mut engine = GestureEngine::new(&Config::default());
    let out = run(
      &mut engine,
      &[
        key(KeyAction::Down, 0),
        key(KeyAction::Up, 100),
        key(KeyAction::Down, 1000),
        key(KeyAction::LongPress, 1500),
        key(KeyAction::Up, 2500),
      ],
      3000,
    );
    assert_eq!(out, vec![Gesture::HardwareButton, Gesture::HardwareButtonHeld]);
  }

  #[test]
  fn configured_hold_time_fires_before_later_events() {
    let config = Config {
      button_hold_time: Some(ms(700)),
      ..Config::default()
    };
    let mut engine = GestureEngine::new(&config);
    let out = run(
      &mut engine,
      &[
        key(KeyAction::Down, 0),
        pointer(PointerAction::Down, 10.0, 10.0, 650),
        pointer(PointerAction::Move, 10.0, 40.0, 1000),
        key(KeyAction::Up, 1100),
      ],
      1100,
    );
    assert_eq!(out, vec![Gesture::HardwareButtonHeld, Gesture::JoyDown]);
  }

  #[tokio::test]
  async fn subscribers_receive_published_gestures_in_order() {
    let mut engine = GestureEngine::new(&Config::default());
    let mut rx = engine.subscribe();
    run(
      &mut engine,
      &[key(KeyAction::Down, 0), key(KeyAction::Up, 50)],
      100,
    );
    engine.handle(&pointer(PointerAction::Down, 0.0, 0.0, 200));
    engine.handle(&pointer(PointerAction::Up, 0.0, 0.0, 900));

    assert_eq!(rx.recv().await.unwrap(), Gesture::HardwareButton);
    assert_eq!(rx.recv().await.unwrap(), Gesture::JoyNeutral);
  }
}
