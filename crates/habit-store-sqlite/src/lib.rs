//! SQLite backend for the habit tracker.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`HabitStore`] owns one SQLite
//! handle; clone it to share.

mod crud;
mod encode;
mod manager;
mod migrate;
mod queries;
mod schema;
mod store;
mod transaction;

pub mod error;

pub use error::{ConstraintKind, Error, Result};
pub use manager::{ConnectionManager, StoreLocation};
pub use migrate::{DEFAULT_HISTORY_LIMIT, Migration};
pub use queries::{DEFAULT_ENTRIES_LIMIT, DEFAULT_RECENT_LIMIT};
pub use store::HabitStore;
pub use transaction::Transaction;
