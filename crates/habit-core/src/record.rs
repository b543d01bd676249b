//! Per-entity typed access on top of the generic CRUD helpers.
//!
//! Each stored type names its [`Entity`] statically, so typed reads and writes
//! can never target the wrong table.

use crate::{Entity, Fields, Result, Row};

/// A typed view of one stored row.
pub trait Record: Sized + Send + 'static {
  const ENTITY: Entity;

  fn from_row(row: Row) -> Result<Self>;
}

/// A typed insert payload.
///
/// Timestamps are left out; the CRUD layer stamps them.
pub trait NewRecord: Send + 'static {
  const ENTITY: Entity;

  fn into_fields(self) -> Result<Fields>;
}
