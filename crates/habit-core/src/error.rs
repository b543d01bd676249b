//! Error types for `habit-core`.

use thiserror::Error;

use crate::Entity;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown trackable type: {0:?}")]
  UnknownTrackableType(String),

  #[error("unknown migration status: {0:?}")]
  UnknownMigrationStatus(String),

  #[error("{entity} row has no {column:?} column")]
  MissingColumn { entity: Entity, column: &'static str },

  #[error("{entity}.{column} is not {expected}")]
  ColumnType {
    entity:   Entity,
    column:   &'static str,
    expected: &'static str,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
