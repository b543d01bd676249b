//! Table-agnostic insert/read/update/delete over a [`rusqlite::Connection`].
//!
//! These are synchronous so the same code serves both the async
//! [`HabitStore`](crate::HabitStore) methods and a [`Transaction`](crate::Transaction).
//! Only names from [`Entity`] ever reach statement text.

use habit_core::{
  Entity, FieldValue, Fields, Row,
  entity::{CREATED_AT, ID_COLUMN, UPDATED_AT},
};
use rusqlite::{Connection, OptionalExtension as _, params_from_iter, types::Value};

use crate::{
  Error, Result,
  encode::{now_millis, read_row, to_sql},
};

/// Resolve every field name against the entity's column list.
fn resolve(entity: Entity, fields: Fields) -> Result<Vec<(&'static str, FieldValue)>> {
  fields
    .into_iter()
    .map(|(name, value)| match entity.column(&name) {
      Some(column) => Ok((column, value)),
      None => Err(Error::UnknownColumn { entity, column: name }),
    })
    .collect()
}

/// The caller-supplied value of a timestamp column, if present.
fn supplied(
  entity:  Entity,
  columns: &[(&'static str, FieldValue)],
  column:  &'static str,
) -> Result<Option<i64>> {
  columns
    .iter()
    .find(|(c, _)| *c == column)
    .map(|(_, v)| {
      v.as_i64().ok_or_else(|| {
        habit_core::Error::ColumnType { entity, column, expected: "an integer" }.into()
      })
    })
    .transpose()
}

/// Fill in whichever of `created_at` / `updated_at` the caller left out.
fn stamp(entity: Entity, columns: &mut Vec<(&'static str, FieldValue)>) -> Result<()> {
  let created = supplied(entity, columns, CREATED_AT)?;
  let updated = supplied(entity, columns, UPDATED_AT)?;

  let now = now_millis();
  let (created_at, updated_at) = match (created, updated) {
    (None, None) => (now, now),
    (Some(c), None) => (c, now.max(c)),
    (None, Some(u)) => (now.min(u), u),
    (Some(c), Some(u)) if u < c => {
      return Err(Error::TimestampOrder { created_at: c, updated_at: u });
    }
    (Some(c), Some(u)) => (c, u),
  };

  if created.is_none() {
    columns.push((CREATED_AT, created_at.into()));
  }
  if updated.is_none() {
    columns.push((UPDATED_AT, updated_at.into()));
  }
  Ok(())
}

/// Insert a row and return its id.
pub fn insert(conn: &Connection, entity: Entity, fields: Fields) -> Result<i64> {
  let mut columns = resolve(entity, fields)?;
  stamp(entity, &mut columns)?;

  let names = columns.iter().map(|(c, _)| *c).collect::<Vec<_>>().join(", ");
  let placeholders = vec!["?"; columns.len()].join(", ");
  let sql = format!(
    "INSERT INTO {} ({names}) VALUES ({placeholders})",
    entity.table_name()
  );

  conn.execute(&sql, params_from_iter(columns.into_iter().map(|(_, v)| to_sql(v))))?;
  let id = conn.last_insert_rowid();
  tracing::debug!(%entity, id, "row created");
  Ok(id)
}

pub fn get_by_id(conn: &Connection, entity: Entity, id: i64) -> Result<Option<Row>> {
  let sql = format!("SELECT * FROM {} WHERE id = ?1", entity.table_name());
  let mut stmt = conn.prepare(&sql)?;
  let names = column_names(&stmt);
  Ok(
    stmt
      .query_row([id], |row| read_row(entity, &names, row))
      .optional()?,
  )
}

/// Set `fields` on row `id` and refresh `updated_at`.
///
/// `updated_at` never drops below `created_at`, even when the clock has
/// moved backwards.
pub fn update(conn: &Connection, entity: Entity, id: i64, fields: Fields) -> Result<bool> {
  if fields.contains(ID_COLUMN) {
    return Err(Error::ReadOnlyColumn { entity, column: ID_COLUMN });
  }
  let columns = resolve(entity, fields)?;
  if let Some((column, _)) = columns
    .iter()
    .find(|(c, _)| *c == CREATED_AT || *c == UPDATED_AT)
  {
    return Err(Error::ReadOnlyColumn { entity, column });
  }

  let mut assignments: Vec<String> = columns.iter().map(|(c, _)| format!("{c} = ?")).collect();
  assignments.push(format!("{UPDATED_AT} = MAX({CREATED_AT}, ?)"));
  let sql = format!(
    "UPDATE {} SET {} WHERE id = ?",
    entity.table_name(),
    assignments.join(", ")
  );

  let mut values: Vec<Value> = columns.into_iter().map(|(_, v)| to_sql(v)).collect();
  values.push(Value::Integer(now_millis()));
  values.push(Value::Integer(id));

  let changed = conn.execute(&sql, params_from_iter(values))?;
  tracing::debug!(%entity, id, changed, "row updated");
  Ok(changed > 0)
}

pub fn remove(conn: &Connection, entity: Entity, id: i64) -> Result<bool> {
  let sql = format!("DELETE FROM {} WHERE id = ?1", entity.table_name());
  let changed = conn.execute(&sql, [id])?;
  tracing::debug!(%entity, id, changed, "row removed");
  Ok(changed > 0)
}

/// Every row of `entity`, oldest id first.
pub fn list(conn: &Connection, entity: Entity) -> Result<Vec<Row>> {
  let sql = format!("SELECT * FROM {} ORDER BY id", entity.table_name());
  query_rows(conn, entity, &sql, [])
}

/// Run a read and collect every column of every row.
pub fn query_rows<P: rusqlite::Params>(
  conn:   &Connection,
  entity: Entity,
  sql:    &str,
  params: P,
) -> Result<Vec<Row>> {
  let mut stmt = conn.prepare(sql)?;
  let names = column_names(&stmt);
  let rows = stmt
    .query_map(params, |row| read_row(entity, &names, row))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
  stmt.column_names().into_iter().map(str::to_owned).collect()
}
