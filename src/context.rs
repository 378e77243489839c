use serde::Deserialize;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::event::{KeyAction, KeyEvent, PointerAction, PointerEvent, Position, RawEvent};

#[derive(Debug, Error)]
pub enum ContextError {
  #[error("Could not read input: {0}")]
  Io(#[from] io::Error),
  #[error("Unable to decode line {line}: {source}")]
  Decode {
    line: usize,
    #[source]
    source: serde_json::Error,
  },
  #[error("Malformed line {line}: {reason}")]
  Malformed { line: usize, reason: &'static str },
}

/// One item of replayed input.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplayItem {
  Event(RawEvent),
  /// An inbound list item, stamped like the events around it.
  Text { at: Duration, text: String },
}

impl ReplayItem {
  pub fn timestamp(&self) -> Duration {
    match self {
      ReplayItem::Event(event) => event.timestamp(),
      ReplayItem::Text { at, .. } => *at,
    }
  }
}

#[derive(Deserialize)]
struct ReplayLine {
  t: u64,
  pointer: Option<ReplayPointer>,
  key: Option<KeyAction>,
  text: Option<String>,
}

#[derive(Deserialize)]
struct ReplayPointer {
  action: PointerAction,
  x: f32,
  y: f32,
  #[serde(default)]
  index: usize,
}

// Wrapper for a JSON-lines input stream that handles the asynchronous aspect.
pub struct ReplayContext<R> {
  lines: Lines<R>,
  line: usize,
}

impl<R> ReplayContext<R>
where
  R: AsyncBufRead + Unpin,
{
  pub fn new(reader: R) -> ReplayContext<R> {
    ReplayContext {
      lines: reader.lines(),
      line: 0,
    }
  }

  /// Returns the next item, or `None` once the input is exhausted. Blank lines
  /// and `#` comments are skipped.
  pub async fn next(&mut self) -> Result<Option<ReplayItem>, ContextError> {
    loop {
      let content = match self.lines.next_line().await? {
        Some(content) => content,
        None => return Ok(None),
      };
      self.line += 1;

      let trimmed = content.trim();
      if trimmed.is_empty() || trimmed.starts_with('#') {
        continue;
      }
      return self.decode(trimmed).map(Some);
    }
  }

  fn decode(&self, content: &str) -> Result<ReplayItem, ContextError> {
    let line = self.line;
    let parsed: ReplayLine =
      serde_json::from_str(content).map_err(|source| ContextError::Decode { line, source })?;
    let at = Duration::from_millis(parsed.t);

    match (parsed.pointer, parsed.key, parsed.text) {
      (Some(pointer), None, None) => Ok(ReplayItem::Event(RawEvent::Pointer(PointerEvent {
        action: pointer.action,
        position: Position::new(pointer.x, pointer.y),
        pointer_index: pointer.index,
        timestamp: at,
      }))),
      (None, Some(action), None) => Ok(ReplayItem::Event(RawEvent::Key(KeyEvent::new(action, at)))),
      (None, None, Some(text)) => Ok(ReplayItem::Text { at, text }),
      (None, None, None) => Err(ContextError::Malformed {
        line,
        reason: "expected one of `pointer`, `key` or `text`",
      }),
      _ => Err(ContextError::Malformed {
        line,
        reason: "only one of `pointer`, `key` or `text` is allowed",
      }),
    }
  }
}
