//! Conversions between `habit-core` values and SQLite column values.
//!
//! Timestamps are epoch milliseconds stored as `INTEGER`. Text that is not
//! valid UTF-8 is read lossily rather than failing the whole row.

use chrono::Utc;
use habit_core::{Entity, FieldValue, Row};
use rusqlite::types::{Value, ValueRef};

// ─── Time ─────────────────────────────────────────────────────────────────────

pub fn now_millis() -> i64 { Utc::now().timestamp_millis() }

// ─── FieldValue <-> SQLite ───────────────────────────────────────────────────

pub fn to_sql(value: FieldValue) -> Value {
  match value {
    FieldValue::Null => Value::Null,
    FieldValue::Integer(i) => Value::Integer(i),
    FieldValue::Real(f) => Value::Real(f),
    FieldValue::Text(s) => Value::Text(s),
    FieldValue::Blob(b) => Value::Blob(b),
  }
}

pub fn from_sql(value: ValueRef<'_>) -> FieldValue {
  match value {
    ValueRef::Null => FieldValue::Null,
    ValueRef::Integer(i) => FieldValue::Integer(i),
    ValueRef::Real(f) => FieldValue::Real(f),
    ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => FieldValue::Blob(b.to_vec()),
  }
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

/// Read every column of `row` into a [`Row`], keyed by `names`.
///
/// `names` must be the statement's column names, in order.
pub fn read_row(
  entity: Entity,
  names:  &[String],
  row:    &rusqlite::Row<'_>,
) -> rusqlite::Result<Row> {
  let mut out = Row::new(entity);
  for (idx, name) in names.iter().enumerate() {
    out.values.insert(name.clone(), from_sql(row.get_ref(idx)?));
  }
  Ok(out)
}

/// Escape `term` for use inside a `LIKE ... ESCAPE '\'` pattern and wrap it
/// in wildcards.
pub fn like_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}
