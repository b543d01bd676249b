//! Lazily-opened, process-wide store handle.

use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::{HabitStore, Result};

/// Where a [`ConnectionManager`] opens its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  File(PathBuf),
  InMemory,
}

impl StoreLocation {
  async fn open(&self) -> Result<HabitStore> {
    match self {
      Self::File(path) => HabitStore::open(path).await,
      Self::InMemory => HabitStore::open_in_memory().await,
    }
  }
}

/// Opens the store on first use and hands the same handle to every caller
/// after that.
///
/// Concurrent first calls to [`connection`](Self::connection) are
/// serialized: exactly one open runs and the others wait for its result. A
/// failed open is not cached, so the next call tries again.
#[derive(Debug)]
pub struct ConnectionManager {
  location: StoreLocation,
  store:    OnceCell<HabitStore>,
}

impl ConnectionManager {
  pub fn new(location: StoreLocation) -> Self {
    Self { location, store: OnceCell::new() }
  }

  pub fn location(&self) -> &StoreLocation { &self.location }

  pub async fn connection(&self) -> Result<&HabitStore> {
    self
      .store
      .get_or_try_init(|| async {
        tracing::debug!(location = ?self.location, "opening store");
        self.location.open().await
      })
      .await
  }

  pub fn is_open(&self) -> bool { self.store.initialized() }

  /// Close the store if it was ever opened.
  pub async fn close(self) -> Result<()> {
    match self.store.into_inner() {
      Some(store) => store.close().await,
      None => Ok(()),
    }
  }
}
