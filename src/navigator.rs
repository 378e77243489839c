use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

use crate::clock::Clock;
use crate::config::Config;
use crate::gesture::Gesture;
use crate::list::{ItemList, ItemStore};
use crate::repeat::RepeatScheduler;

/// The outside world the navigator drives: rendering, text capture and the app
/// lifecycle.
pub trait NavigatorHost: Send + Sync + 'static {
  fn scroll_to(&self, position: usize);
  fn request_text_capture(&self);
  fn exit_armed(&self);
  fn exit(&self);
  fn prompt_dismissed(&self) {}
}

pub type PendingAction = Box<dyn FnOnce() + Send>;

pub enum NavigatorCommand {
  /// An item arriving from text capture or a paired sender.
  Append(String),
  /// Shows a confirm prompt; a tap runs the action.
  Prompt(PendingAction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Exit,
}

/// Two triggers within `window` confirm an exit.
pub struct ExitDebounce {
  window: Duration,
  last_trigger: Option<Duration>,
}

impl ExitDebounce {
  pub fn new(window: Duration) -> ExitDebounce {
    ExitDebounce {
      window,
      last_trigger: None,
    }
  }

  /// Returns true when this trigger confirms the exit.
  pub fn trigger(&mut self, now: Duration) -> bool {
    match self.last_trigger {
      Some(last) if now.saturating_sub(last) < self.window => true,
      _ => {
        self.last_trigger = Some(now);
        false
      }
    }
  }
}

fn lock(list: &Mutex<ItemList>) -> MutexGuard<'_, ItemList> {
  match list.lock() {
    Ok(list) => list,
    Err(poisoned) => poisoned.into_inner(),
  }
}

/// Applies gestures to an item list.
pub struct ListNavigator<H: NavigatorHost, C: Clock> {
  list: Arc<Mutex<ItemList>>,
  store: Option<ItemStore>,
  host: Arc<H>,
  clock: C,
  repeat: RepeatScheduler,
  exit: ExitDebounce,
  pending: Option<PendingAction>,
  held: Option<Gesture>,
}

impl<H: NavigatorHost, C: Clock> ListNavigator<H, C> {
  pub fn new(list: ItemList, store: Option<ItemStore>, host: Arc<H>, clock: C, config: &Config) -> Self {
    ListNavigator {
      list: Arc::new(Mutex::new(list)),
      store,
      host,
      clock,
      repeat: RepeatScheduler::new(config.repeat_initial_delay, config.repeat_interval),
      exit: ExitDebounce::new(config.exit_timeout),
      pending: None,
      held: None,
    }
  }

  pub fn list(&self) -> Arc<Mutex<ItemList>> {
    self.list.clone()
  }

  pub fn has_prompt(&self) -> bool {
    self.pending.is_some()
  }

  /// Must be called from within a tokio runtime; joystick gestures spawn repeats.
  pub fn handle(&mut self, gesture: Gesture) -> Flow {
    match gesture {
      Gesture::JoyUp | Gesture::JoyDown => self.hold(gesture),
      Gesture::JoyNeutral | Gesture::JoyLeft | Gesture::JoyRight => {
        self.held = None;
        self.repeat.cancel();
      }
      Gesture::SwipeLeft | Gesture::SwipeRight => {
        let removed = lock(&self.list).remove_selected();
        if let Some(item) = removed {
          log::info!("Removed {:?}", item);
          self.persist();
        }
      }
      Gesture::SwipeDown => return self.back(),
      Gesture::Tap => {
        if let Some(action) = self.pending.take() {
          action();
          self.host.prompt_dismissed();
        }
      }
      Gesture::HardwareButton => self.host.request_text_capture(),
      other => log::trace!("ignoring {}", other),
    }
    Flow::Continue
  }

  pub fn command(&mut self, command: NavigatorCommand) {
    match command {
      NavigatorCommand::Append(text) => {
        if text.trim().is_empty() {
          return;
        }
        lock(&self.list).add(text);
        self.persist();
      }
      NavigatorCommand::Prompt(action) => self.pending = Some(action),
    }
  }

  pub fn teardown(&mut self) {
    self.held = None;
    self.repeat.cancel();
  }

  /// Consumes gestures and commands until the gesture stream closes or the user
  /// exits, then tears down and returns the final list.
  pub async fn run(
    mut self,
    mut gestures: broadcast::Receiver<Gesture>,
    mut commands: mpsc::Receiver<NavigatorCommand>,
  ) -> ItemList {
    loop {
      tokio::select! {
        gesture = gestures.recv() => match gesture {
          Ok(gesture) => {
            if self.handle(gesture) == Flow::Exit {
              break;
            }
          }
          Err(RecvError::Lagged(skipped)) => log::warn!("Navigator lagged, skipped {} gestures", skipped),
          Err(RecvError::Closed) => break,
        },
        Some(command) = commands.recv() => self.command(command),
      }
    }

    self.teardown();
    let list = lock(&self.list).clone();
    list
  }

  // A repeat of the direction already held keeps the running sequence.
  fn hold(&mut self, gesture: Gesture) {
    if self.held == Some(gesture) && self.repeat.is_active() {
      return;
    }
    self.held = Some(gesture);

    let list = self.list.clone();
    let host = self.host.clone();
    let up = gesture == Gesture::JoyUp;
    self.repeat.start(move || {
      let position = {
        let mut list = lock(&list);
        if up {
          list.selection_up()
        } else {
          list.selection_down()
        }
      };
      host.scroll_to(position);
    });
  }

  fn back(&mut self) -> Flow {
    if self.pending.take().is_some() {
      self.host.prompt_dismissed();
      return Flow::Continue;
    }

    if self.exit.trigger(self.clock.now()) {
      self.teardown();
      self.host.exit();
      Flow::Exit
    } else {
      self.host.exit_armed();
      Flow::Continue
    }
  }

  fn persist(&self) {
    if let Some(store) = &self.store {
      if let Err(e) = store.save(&lock(&self.list)) {
        log::warn!("Unable to save items to {:?}: {}", store.path(), e);
      }
    }
  }
}
