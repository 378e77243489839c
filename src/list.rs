use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xdg::BaseDirectories;

use crate::config::XDG_PREFIX;

pub const ITEMS_FILE: &str = "items.txt";

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Could not access item store: {0}")]
  Io(#[from] io::Error),
  #[error("Unable to locate data directory: {0}")]
  Xdg(#[from] xdg::BaseDirectoriesError),
}

/// Ordered items with a selection cursor. Display position 0 is the header row,
/// so item `i` is shown at position `i + 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemList {
  items: Vec<String>,
  selected: usize,
}

impl ItemList {
  pub fn new(items: Vec<String>) -> ItemList {
    ItemList { items, selected: 0 }
  }

  pub fn items(&self) -> &[String] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn selected(&self) -> Option<usize> {
    if self.selected < self.items.len() {
      Some(self.selected)
    } else {
      None
    }
  }

  pub fn selected_item(&self) -> Option<&str> {
    self.items.get(self.selected).map(String::as_str)
  }

  pub fn add(&mut self, item: String) {
    self.items.push(item);
  }

  pub fn remove_selected(&mut self) -> Option<String> {
    if self.selected >= self.items.len() {
      return None;
    }
    let removed = self.items.remove(self.selected);
    if self.selected >= self.items.len() {
      self.selected = self.items.len().saturating_sub(1);
    }
    Some(removed)
  }

  /// Moves the cursor up and returns the display position to scroll to.
  pub fn selection_up(&mut self) -> usize {
    if self.selected > 0 {
      self.selected -= 1;
    }
    self.selected + 1
  }

  /// Moves the cursor down and returns the display position to scroll to.
  pub fn selection_down(&mut self) -> usize {
    if self.selected + 1 < self.items.len() {
      self.selected += 1;
    }
    self.selected + 1
  }
}

// Items are kept newline-joined in a single file.
pub struct ItemStore {
  path: PathBuf,
}

impl ItemStore {
  pub fn new<P: Into<PathBuf>>(path: P) -> ItemStore {
    ItemStore { path: path.into() }
  }

  pub fn open_default() -> Result<ItemStore, StoreError> {
    let xdg_dirs = BaseDirectories::with_prefix(XDG_PREFIX)?;
    let path = xdg_dirs.place_data_file(ITEMS_FILE)?;
    Ok(ItemStore { path })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn load(&self) -> Result<ItemList, StoreError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ItemList::default()),
      Err(e) => return Err(e.into()),
    };

    let items = content
      .split('\n')
      .filter(|line| !line.trim().is_empty())
      .map(str::to_string)
      .collect();
    Ok(ItemList::new(items))
  }

  pub fn save(&self, list: &ItemList) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, list.items().join("\n"))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn list(items: &[&str]) -> ItemList {
    ItemList::new(items.iter().map(|s| s.to_string()).collect())
  }

  #[test]
  fn selection_moves_within_bounds() {
    let mut list = list(&["a", "b", "c"]);
    assert_eq!(list.selection_up(), 1);
    assert_eq!(list.selection_down(), 2);
    assert_eq!(list.selection_down(), 3);
    assert_eq!(list.selection_down(), 3);
    assert_eq!(list.selected_item(), Some("c"));
  }

  #[test]
  fn removing_last_item_clamps_cursor() {
    let mut list = list(&["a", "b"]);
    list.selection_down();
    assert_eq!(list.remove_selected().as_deref(), Some("b"));
    assert_eq!(list.selected_item(), Some("a"));
    assert_eq!(list.remove_selected().as_deref(), Some("a"));
    assert_eq!(list.selected(), None);
    assert_eq!(list.remove_selected(), None);

    list.add("c".to_string());
    assert_eq!(list.selected_item(), Some("c"));
  }

  #[test]
  fn empty_list_selection_is_stable() {
    let mut list = ItemList::default();
    assert_eq!(list.selection_down(), 1);
    assert_eq!(list.selection_up(), 1);
  }

  #[test]
  fn store_round_trip_skips_blank_lines() {
    let dir = std::env::temp_dir().join(format!("glassjoy-store-{}", std::process::id()));
    let store = ItemStore::new(dir.join("items.txt"));
    assert!(store.load().unwrap().is_empty());

    fs::create_dir_all(&dir).unwrap();
    fs::write(store.path(), "milk\n\n  \neggs\n").unwrap();
    let mut loaded = store.load().unwrap();
    assert_eq!(loaded.items(), ["milk".to_string(), "eggs".to_string()]);

    loaded.add("bread".to_string());
    store.save(&loaded).unwrap();
    assert_eq!(store.load().unwrap().len(), 3);

    fs::remove_dir_all(&dir).unwrap();
  }
}
