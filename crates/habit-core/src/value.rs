//! Untyped column values, field maps and rows.
//!
//! These are the currency of the generic CRUD helpers. Typed records convert
//! to and from them through [`crate::Record`] and [`crate::NewRecord`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Entity, Error, Result, entity::ID_COLUMN};

// ─── FieldValue ──────────────────────────────────────────────────────────────

/// A single SQLite column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl FieldValue {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Integer(i) => Some(*i as f64),
      Self::Real(f) => Some(*f),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }
}

impl From<i64> for FieldValue {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<i32> for FieldValue {
  fn from(v: i32) -> Self { Self::Integer(v.into()) }
}

impl From<bool> for FieldValue {
  fn from(v: bool) -> Self { Self::Integer(v.into()) }
}

impl From<f64> for FieldValue {
  fn from(v: f64) -> Self { Self::Real(v) }
}

impl From<String> for FieldValue {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for FieldValue {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<Vec<u8>> for FieldValue {
  fn from(v: Vec<u8>) -> Self { Self::Blob(v) }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A column-name to value mapping used for inserts and updates.
///
/// Keys are kept sorted so generated statements are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
  pub fn new() -> Self { Self::default() }

  /// Builder-style [`Fields::set`].
  pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
    self.set(column, value);
    self
  }

  pub fn set(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
    self.0.insert(column.into(), value.into());
  }

  pub fn get(&self, column: &str) -> Option<&FieldValue> { self.0.get(column) }

  pub fn contains(&self, column: &str) -> bool { self.0.contains_key(column) }

  pub fn remove(&mut self, column: &str) -> Option<FieldValue> { self.0.remove(column) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl IntoIterator for Fields {
  type Item = (String, FieldValue);
  type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// Every column of one stored row, as returned by a generic read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
  pub entity: Entity,
  pub values: BTreeMap<String, FieldValue>,
}

impl Row {
  pub fn new(entity: Entity) -> Self { Self { entity, values: BTreeMap::new() } }

  pub fn get(&self, column: &str) -> Option<&FieldValue> { self.values.get(column) }

  pub fn id(&self) -> Result<i64> { self.integer(ID_COLUMN) }

  pub fn integer(&self, column: &'static str) -> Result<i64> {
    self
      .required(column)?
      .as_i64()
      .ok_or_else(|| self.type_error(column, "an integer"))
  }

  pub fn text(&self, column: &'static str) -> Result<String> {
    self
      .required(column)?
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| self.type_error(column, "text"))
  }

  /// Like [`Row::text`], but a SQL `NULL` reads as `None`.
  pub fn opt_text(&self, column: &'static str) -> Result<Option<String>> {
    match self.required(column)? {
      FieldValue::Null => Ok(None),
      FieldValue::Text(s) => Ok(Some(s.clone())),
      _ => Err(self.type_error(column, "text or null")),
    }
  }

  fn required(&self, column: &'static str) -> Result<&FieldValue> {
    self
      .values
      .get(column)
      .ok_or(Error::MissingColumn { entity: self.entity, column })
  }

  fn type_error(&self, column: &'static str, expected: &'static str) -> Error {
    Error::ColumnType { entity: self.entity, column, expected }
  }
}
