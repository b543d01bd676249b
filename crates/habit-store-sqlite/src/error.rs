//! Error type for `habit-store-sqlite`.
//!
//! SQLite constraint failures are lifted into [`Error::ConstraintViolation`]
//! by extended result code, so callers can tell a duplicate date from a
//! dangling foreign key without parsing messages.

use habit_core::Entity;
use rusqlite::ffi;
use thiserror::Error;

/// Which kind of store-level constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConstraintKind {
  Unique,
  PrimaryKey,
  ForeignKey,
  Check,
  NotNull,
  /// Anything else, including `RAISE(ABORT, ..)` from a trigger.
  Other,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] habit_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("{kind} constraint violated: {message}")]
  ConstraintViolation { kind: ConstraintKind, message: String },

  /// Creating or dropping tables failed.
  #[error("schema error: {0}")]
  Schema(#[source] rusqlite::Error),

  #[error("{entity} has no writable column {column:?}")]
  UnknownColumn { entity: Entity, column: String },

  #[error("{entity}.{column} is managed by the store and cannot be updated")]
  ReadOnlyColumn { entity: Entity, column: &'static str },

  #[error("updated_at ({updated_at}) precedes created_at ({created_at})")]
  TimestampOrder { created_at: i64, updated_at: i64 },

  #[error("migration {version} is not above the current version {current}")]
  MigrationOrder { version: i64, current: i64 },

  #[error("migration version {0} is listed more than once")]
  DuplicateMigration(i64),

  /// An `up` step failed. `source` is the original failure; `compensation`
  /// is set when the `down` step failed too.
  #[error("migration {version} failed: {source}")]
  Migration {
    version:      i64,
    #[source]
    source:       Box<Error>,
    compensation: Option<Box<Error>>,
  },

  /// A unit of work signalled failure on its own account.
  #[error("unit of work aborted: {0}")]
  Aborted(String),
}

impl Error {
  pub fn is_constraint_violation(&self) -> bool {
    matches!(self, Self::ConstraintViolation { .. })
  }

  pub fn constraint_kind(&self) -> Option<ConstraintKind> {
    match self {
      Self::ConstraintViolation { kind, .. } => Some(*kind),
      Self::Migration { source, .. } => source.constraint_kind(),
      _ => None,
    }
  }
}

fn constraint_violation(err: &rusqlite::Error) -> Option<Error> {
  let rusqlite::Error::SqliteFailure(sqlite_err, message) = err else {
    return None;
  };
  if sqlite_err.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }

  let kind = match sqlite_err.extended_code {
    ffi::SQLITE_CONSTRAINT_UNIQUE => ConstraintKind::Unique,
    ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::PrimaryKey,
    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
    ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
    ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
    _ => ConstraintKind::Other,
  };

  Some(Error::ConstraintViolation {
    kind,
    message: message.clone().unwrap_or_else(|| err.to_string()),
  })
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    constraint_violation(&err)
      .unwrap_or_else(|| Error::Database(tokio_rusqlite::Error::Rusqlite(err)))
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(inner) => inner.into(),
      other => Error::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
