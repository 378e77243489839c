pub mod clock;
pub mod config;
#[cfg(feature = "std")]
pub mod context;
pub mod engine;
pub mod event;
pub mod gesture;
pub mod list;
pub mod navigator;
pub mod repeat;
pub mod tracking;

pub use config::Config;
pub use engine::GestureEngine;
pub use event::{KeyAction, KeyEvent, PointerAction, PointerEvent, Position, RawEvent};
pub use gesture::Gesture;
