//! [`Transaction`], the handle a unit of work runs against.

use habit_core::{Entity, Fields, NewRecord, Record, Row};
use rusqlite::{Connection, TransactionBehavior};

use crate::{Result, crud};

/// An open SQLite transaction on the store's connection.
///
/// Obtained through [`HabitStore::run_transaction`](crate::HabitStore::run_transaction).
/// Every write made through it commits together or not at all.
pub struct Transaction<'conn> {
  inner: rusqlite::Transaction<'conn>,
}

impl Transaction<'_> {
  pub fn create(&self, entity: Entity, fields: Fields) -> Result<i64> {
    crud::insert(&self.inner, entity, fields)
  }

  pub fn get_by_id(&self, entity: Entity, id: i64) -> Result<Option<Row>> {
    crud::get_by_id(&self.inner, entity, id)
  }

  pub fn update(&self, entity: Entity, id: i64, fields: Fields) -> Result<bool> {
    crud::update(&self.inner, entity, id, fields)
  }

  pub fn remove(&self, entity: Entity, id: i64) -> Result<bool> {
    crud::remove(&self.inner, entity, id)
  }

  pub fn insert<N: NewRecord>(&self, record: N) -> Result<i64> {
    self.create(N::ENTITY, record.into_fields()?)
  }

  pub fn get<R: Record>(&self, id: i64) -> Result<Option<R>> {
    Ok(self.get_by_id(R::ENTITY, id)?.map(R::from_row).transpose()?)
  }

  pub fn list<R: Record>(&self) -> Result<Vec<R>> {
    Ok(
      crud::list(&self.inner, R::ENTITY)?
        .into_iter()
        .map(R::from_row)
        .collect::<habit_core::Result<_>>()?,
    )
  }

  /// Run raw SQL, typically DDL from a migration step.
  pub fn execute_batch(&self, sql: &str) -> Result<()> {
    self.inner.execute_batch(sql)?;
    Ok(())
  }

  /// Run `unit_of_work` inside this transaction's scope.
  ///
  /// There is no separate nested scope: an error returned here and
  /// propagated aborts the outermost transaction.
  pub fn run_transaction<T>(
    &mut self,
    unit_of_work: impl FnOnce(&mut Self) -> Result<T>,
  ) -> Result<T> {
    unit_of_work(self)
  }

  pub(crate) fn connection(&self) -> &Connection { &self.inner }
}

/// Run `unit_of_work` in a new immediate transaction on `conn`.
///
/// Commits on `Ok`, rolls back on `Err` and hands the error back unchanged.
pub(crate) fn run<T>(
  conn:         &mut Connection,
  unit_of_work: impl FnOnce(&mut Transaction<'_>) -> Result<T>,
) -> Result<T> {
  let mut tx = Transaction {
    inner: conn.transaction_with_behavior(TransactionBehavior::Immediate)?,
  };

  match unit_of_work(&mut tx) {
    Ok(value) => {
      tx.inner.commit()?;
      Ok(value)
    }
    Err(err) => {
      if let Err(rollback_err) = tx.inner.rollback() {
        tracing::error!(error = %rollback_err, "rollback failed");
      }
      tracing::debug!(error = %err, "transaction rolled back");
      Err(err)
    }
  }
}
