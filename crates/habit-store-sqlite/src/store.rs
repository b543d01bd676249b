//! [`HabitStore`], the process-scoped handle to the habit database.

use std::path::Path;

use habit_core::{Entity, Fields, NewRecord, Record, Row};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result, crud,
  schema::{CONNECTION_PRAGMAS, CREATE_INDEXES, CREATE_MIGRATION_TABLES, CREATE_TABLES},
  transaction::{self, Transaction},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The habit database, backed by a single SQLite connection.
///
/// Cloning is cheap. The inner connection is reference-counted, and every
/// clone talks to the same SQLite handle on the same background thread.
#[derive(Clone)]
pub struct HabitStore {
  conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for HabitStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HabitStore").finish_non_exhaustive()
  }
}

impl HabitStore {
  /// Open (or create) a store at `path`, configure the connection and make
  /// sure the schema exists.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::connect(path).await?;
    store.initialize().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self::configure(conn).await?;
    store.initialize().await?;
    Ok(store)
  }

  /// Open and configure a connection without touching the schema.
  pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::configure(conn).await
  }

  async fn configure(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  async fn initialize(&self) -> Result<()> {
    self.initialize_schema().await?;
    self.initialize_migration_tables().await
  }

  /// Shut the background connection down. Other clones stop working too.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::debug!("store closed");
    Ok(())
  }

  /// Run `f` on the connection thread and hand its result back.
  pub(crate) async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  // ── Schema ────────────────────────────────────────────────────────────────

  /// Create the six data tables and their indexes if they are missing.
  pub async fn initialize_schema(&self) -> Result<()> {
    self
      .with_conn(|conn| {
        conn
          .execute_batch(CREATE_TABLES)
          .and_then(|()| conn.execute_batch(CREATE_INDEXES))
          .map_err(Error::Schema)
      })
      .await?;
    tracing::info!("schema initialized");
    Ok(())
  }

  /// Create the version and migration-log tables if they are missing.
  pub async fn initialize_migration_tables(&self) -> Result<()> {
    let now = crate::encode::now_millis();
    self
      .with_conn(move |conn| {
        conn
          .execute_batch(CREATE_MIGRATION_TABLES)
          .map_err(Error::Schema)?;
        conn.execute(
          "INSERT OR IGNORE INTO db_version (id, version, last_migration_date)
           VALUES (1, 0, ?1)",
          [now],
        )?;
        Ok(())
      })
      .await
  }

  /// Drop every data table and recreate the schema. Development only.
  ///
  /// Migration bookkeeping is left alone.
  pub async fn reset_schema_for_development(&self) -> Result<()> {
    tracing::warn!("dropping all data tables");
    let drops: String = Entity::DROP_ORDER
      .iter()
      .map(|e| format!("DROP TABLE IF EXISTS {};\n", e.table_name()))
      .collect();

    self
      .with_conn(move |conn| conn.execute_batch(&drops).map_err(Error::Schema))
      .await?;
    self.initialize_schema().await
  }

  /// Whether each entity's table exists, in creation order.
  pub async fn verify_schema(&self) -> Result<Vec<(Entity, bool)>> {
    self
      .with_conn(|conn| {
        let mut stmt =
          conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        let mut status = Vec::with_capacity(Entity::ALL.len());
        for entity in Entity::ALL {
          let exists = stmt
            .query_row([entity.table_name()], |_| Ok(()))
            .optional()?
            .is_some();
          status.push((entity, exists));
        }
        Ok(status)
      })
      .await
  }

  /// Delete every row from every data table, keeping the schema.
  pub async fn clean_database(&self) -> Result<()> {
    self
      .run_transaction(|tx| {
        for entity in Entity::DROP_ORDER {
          tx.execute_batch(&format!("DELETE FROM {};", entity.table_name()))?;
        }
        Ok(())
      })
      .await?;
    tracing::info!("all data tables emptied");
    Ok(())
  }

  // ── Generic CRUD ──────────────────────────────────────────────────────────

  /// Insert a row, stamping `created_at`/`updated_at` unless supplied.
  /// Returns the new row's id.
  pub async fn create(&self, entity: Entity, fields: Fields) -> Result<i64> {
    self
      .with_conn(move |conn| crud::insert(conn, entity, fields))
      .await
  }

  /// Fetch one row by id. `None` if it does not exist.
  pub async fn get_by_id(&self, entity: Entity, id: i64) -> Result<Option<Row>> {
    self
      .with_conn(move |conn| crud::get_by_id(conn, entity, id))
      .await
  }

  /// Set `fields` on a row and refresh `updated_at`. Returns `false` if no
  /// row has that id.
  pub async fn update(&self, entity: Entity, id: i64, fields: Fields) -> Result<bool> {
    self
      .with_conn(move |conn| crud::update(conn, entity, id, fields))
      .await
  }

  /// Delete a row. Dependants go with it through `ON DELETE CASCADE`.
  pub async fn remove(&self, entity: Entity, id: i64) -> Result<bool> {
    self
      .with_conn(move |conn| crud::remove(conn, entity, id))
      .await
  }

  // ── Typed access ──────────────────────────────────────────────────────────

  pub async fn insert<N: NewRecord>(&self, record: N) -> Result<i64> {
    let fields = record.into_fields()?;
    self.create(N::ENTITY, fields).await
  }

  pub async fn get<R: Record>(&self, id: i64) -> Result<Option<R>> {
    let row = self.get_by_id(R::ENTITY, id).await?;
    Ok(row.map(R::from_row).transpose()?)
  }

  pub async fn delete<R: Record>(&self, id: i64) -> Result<bool> {
    self.remove(R::ENTITY, id).await
  }

  pub async fn list<R: Record>(&self) -> Result<Vec<R>> {
    let rows = self
      .with_conn(|conn| crud::list(conn, R::ENTITY))
      .await?;
    Ok(
      rows
        .into_iter()
        .map(R::from_row)
        .collect::<habit_core::Result<_>>()?,
    )
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  /// Run `unit_of_work` atomically.
  ///
  /// The closure runs on the connection thread inside one immediate
  /// transaction. Returning `Ok` commits every write it made; returning
  /// `Err` (including a constraint violation from any write) rolls them all
  /// back and the error is returned unchanged.
  pub async fn run_transaction<T, F>(&self, unit_of_work: F) -> Result<T>
  where
    F: FnOnce(&mut Transaction<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .with_conn(move |conn| transaction::run(conn, unit_of_work))
      .await
  }
}
