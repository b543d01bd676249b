//! Versioned migrations with an append-only audit log.
//!
//! The database records a single integer version in `db_version`. A
//! [`Migration`] moves it forward by running its `up` step in a transaction
//! together with the version bump. If `up` fails, the optional `down` step
//! runs straight away in that same transaction, which is then rolled back
//! whatever `down` returns. The outcome decides whether the log ends at
//! `rolled_back` or stays at `failed`.

use std::{fmt, sync::Arc};

use habit_core::migration::{MigrationLogEntry, MigrationStatus};
use rusqlite::Connection;

use crate::{Error, HabitStore, Result, Transaction, encode::now_millis, transaction};

/// How many log entries [`HabitStore::get_migration_history`] callers
/// usually ask for.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

type MigrationStep = Arc<dyn Fn(&mut Transaction<'_>) -> Result<()> + Send + Sync>;

/// One schema change, identified by the version it brings the database to.
#[derive(Clone)]
pub struct Migration {
  pub version: i64,
  up:          MigrationStep,
  down:        Option<MigrationStep>,
}

impl Migration {
  pub fn new<F>(version: i64, up: F) -> Self
  where
    F: Fn(&mut Transaction<'_>) -> Result<()> + Send + Sync + 'static,
  {
    Self { version, up: Arc::new(up), down: None }
  }

  /// A migration whose `up` step is a fixed SQL script.
  pub fn sql(version: i64, script: &'static str) -> Self {
    Self::new(version, move |tx| tx.execute_batch(script))
  }

  /// Attach a compensating step, run only if `up` fails.
  pub fn with_down<F>(mut self, down: F) -> Self
  where
    F: Fn(&mut Transaction<'_>) -> Result<()> + Send + Sync + 'static,
  {
    self.down = Some(Arc::new(down));
    self
  }

  pub fn with_down_sql(self, script: &'static str) -> Self {
    self.with_down(move |tx| tx.execute_batch(script))
  }

  pub fn has_down(&self) -> bool { self.down.is_some() }
}

impl fmt::Debug for Migration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Migration")
      .field("version", &self.version)
      .field("has_down", &self.has_down())
      .finish_non_exhaustive()
  }
}

// ─── Bookkeeping ─────────────────────────────────────────────────────────────

fn current_version(conn: &Connection) -> Result<i64> {
  // A store opened with `connect` may not have the bookkeeping tables yet.
  let has_table: bool = conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'db_version')",
    [],
    |row| row.get(0),
  )?;
  if !has_table {
    return Ok(0);
  }

  let version = conn.query_row("SELECT version FROM db_version WHERE id = 1", [], |row| {
    row.get::<_, i64>(0)
  });
  match version {
    Ok(v) => Ok(v),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
    Err(e) => Err(e.into()),
  }
}

fn set_version(conn: &Connection, version: i64) -> Result<()> {
  conn.execute(
    "INSERT INTO db_version (id, version, last_migration_date) VALUES (1, ?1, ?2)
     ON CONFLICT (id) DO UPDATE
       SET version = excluded.version,
           last_migration_date = excluded.last_migration_date",
    rusqlite::params![version, now_millis()],
  )?;
  Ok(())
}

/// Appends one log row per status change of a single migration run.
struct RunLog<'a> {
  conn:    &'a Connection,
  version: i64,
  status:  MigrationStatus,
}

impl<'a> RunLog<'a> {
  fn start(conn: &'a Connection, version: i64) -> Result<Self> {
    let mut log = Self { conn, version, status: MigrationStatus::Pending };
    log.advance(MigrationStatus::InProgress, None)?;
    Ok(log)
  }

  fn advance(&mut self, next: MigrationStatus, error: Option<&str>) -> Result<()> {
    debug_assert!(
      self.status.can_transition_to(next),
      "illegal migration transition {} -> {next}",
      self.status
    );
    self.conn.execute(
      "INSERT INTO migration_logs (version, status, error, timestamp) VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![self.version, next.as_str(), error, now_millis()],
    )?;
    self.status = next;
    Ok(())
  }
}

/// Run one migration to completion on `conn`, logging every transition.
fn apply(conn: &mut Connection, migration: &Migration) -> Result<()> {
  let version = migration.version;
  let current = current_version(conn)?;
  if version <= current {
    return Err(Error::MigrationOrder { version, current });
  }

  RunLog::start(&*conn, version)?;
  tracing::info!(version, current, "running migration");

  // Set only when `up` failed and a `down` step ran: `Ok` if it compensated.
  let mut compensation: Option<Result<()>> = None;
  let outcome = transaction::run(conn, |tx| {
    let up = (migration.up)(tx).and_then(|()| set_version(tx.connection(), version));
    if let Err(err) = &up
      && let Some(down) = &migration.down
    {
      tracing::warn!(version, error = %err, "migration failed, running compensating step");
      compensation = Some(down(tx));
    }
    up
  });

  let mut log = RunLog { conn: &*conn, version, status: MigrationStatus::InProgress };
  let source = match outcome {
    Ok(()) => {
      log.advance(MigrationStatus::Completed, None)?;
      tracing::info!(version, "migration completed");
      return Ok(());
    }
    Err(source) => source,
  };
  tracing::error!(version, error = %source, "migration failed");

  let compensation = match compensation {
    Some(Ok(())) => {
      log.advance(MigrationStatus::Failed, Some(&source.to_string()))?;
      log.advance(MigrationStatus::RolledBack, None)?;
      tracing::warn!(version, "migration rolled back");
      None
    }
    Some(Err(down_err)) => {
      tracing::error!(version, error = %down_err, "compensating step failed");
      let message = format!("{source}; compensation failed: {down_err}");
      log.advance(MigrationStatus::Failed, Some(&message))?;
      Some(Box::new(down_err))
    }
    None => {
      log.advance(MigrationStatus::Failed, Some(&source.to_string()))?;
      None
    }
  };

  Err(Error::Migration { version, source: Box::new(source), compensation })
}

fn read_log_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, i64, String, Option<String>, i64)> {
  Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

impl HabitStore {
  /// The database's schema version; `0` if no migration has ever run.
  pub async fn get_current_version(&self) -> Result<i64> {
    self.with_conn(|conn| current_version(conn)).await
  }

  /// Apply one migration.
  ///
  /// Its version must be above the current one. On failure the database is
  /// left at its previous version and the returned [`Error::Migration`]
  /// carries the `up` error and, if it also failed, the `down` error.
  pub async fn run_migration(&self, migration: &Migration) -> Result<()> {
    let migration = migration.clone();
    self.with_conn(move |conn| apply(conn, &migration)).await
  }

  /// Apply every migration above the current version, lowest first.
  ///
  /// Stops at the first failure. Returns the versions that were applied.
  pub async fn run_pending_migrations(&self, migrations: &[Migration]) -> Result<Vec<i64>> {
    let mut pending = migrations.to_vec();
    pending.sort_by_key(|m| m.version);
    if let Some(pair) = pending.windows(2).find(|w| w[0].version == w[1].version) {
      return Err(Error::DuplicateMigration(pair[0].version));
    }

    self
      .with_conn(move |conn| {
        let current = current_version(conn)?;
        let mut applied = Vec::new();
        for migration in pending.iter().filter(|m| m.version > current) {
          apply(conn, migration)?;
          applied.push(migration.version);
        }
        if applied.is_empty() {
          tracing::debug!(current, "no pending migrations");
        }
        Ok(applied)
      })
      .await
  }

  /// The newest `limit` migration-log entries, newest first.
  pub async fn get_migration_history(&self, limit: u32) -> Result<Vec<MigrationLogEntry>> {
    let raw = self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, version, status, error, timestamp
           FROM migration_logs
           ORDER BY timestamp DESC, id DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map([limit], read_log_entry)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw
      .into_iter()
      .map(|(id, version, status, error, timestamp)| -> Result<MigrationLogEntry> {
        Ok(MigrationLogEntry {
          id,
          version,
          status: MigrationStatus::parse(&status)?,
          error,
          timestamp,
        })
      })
      .collect()
  }
}
