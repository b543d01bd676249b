//! Trackables: the things a user records a value for every day.

use serde::{Deserialize, Serialize};

use crate::{Entity, Error, Fields, NewRecord, Record, Result, Row};

/// The input widget a trackable is recorded with.
///
/// Mirrors the `CHECK` constraint on `Trackables.type`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrackableType {
  Boolean,
  Numeric,
  Selection,
  Text,
}

impl TrackableType {
  pub const ALL: [TrackableType; 4] = [
    TrackableType::Boolean,
    TrackableType::Numeric,
    TrackableType::Selection,
    TrackableType::Text,
  ];

  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse()
      .map_err(|_| Error::UnknownTrackableType(s.to_owned()))
  }
}

/// Presentation hints stored as JSON in `Trackables.options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackableOptions {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min:     Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max:     Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub step:    Option<f64>,
  /// Choices for a [`TrackableType::Selection`] trackable.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trackable {
  pub id:         i64,
  pub name:       String,
  #[serde(rename = "type")]
  pub kind:       TrackableType,
  pub options:    Option<TrackableOptions>,
  pub created_at: i64,
  pub updated_at: i64,
}

impl Record for Trackable {
  const ENTITY: Entity = Entity::Trackable;

  fn from_row(row: Row) -> Result<Self> {
    let options = row
      .opt_text("options")?
      .map(|json| serde_json::from_str(&json))
      .transpose()?;

    Ok(Self {
      id: row.id()?,
      name: row.text("name")?,
      kind: TrackableType::parse(&row.text("type")?)?,
      options,
      created_at: row.integer("created_at")?,
      updated_at: row.integer("updated_at")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrackable {
  pub name:    String,
  #[serde(rename = "type")]
  pub kind:    TrackableType,
  pub options: Option<TrackableOptions>,
}

impl NewTrackable {
  pub fn new(name: impl Into<String>, kind: TrackableType) -> Self {
    Self { name: name.into(), kind, options: None }
  }

  pub fn with_options(mut self, options: TrackableOptions) -> Self {
    self.options = Some(options);
    self
  }
}

impl NewRecord for NewTrackable {
  const ENTITY: Entity = Entity::Trackable;

  fn into_fields(self) -> Result<Fields> {
    let options = self
      .options
      .as_ref()
      .map(serde_json::to_string)
      .transpose()?;

    Ok(
      Fields::new()
        .with("name", self.name)
        .with("type", self.kind.as_str())
        .with("options", options),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::FieldValue;

  #[test]
  fn trackable_type_parses_lowercase_only() {
    assert_eq!(TrackableType::parse("numeric").unwrap(), TrackableType::Numeric);
    assert_eq!(TrackableType::Selection.to_string(), "selection");
    assert!(matches!(
      TrackableType::parse("Numeric"),
      Err(Error::UnknownTrackableType(_))
    ));
  }

  #[test]
  fn options_json_round_trips_through_fields() {
    let new = NewTrackable::new("Sleep", TrackableType::Numeric).with_options(
      TrackableOptions { min: Some(0.0), max: Some(12.0), ..Default::default() },
    );
    let fields = new.into_fields().unwrap();
    assert_eq!(fields.get("options"), Some(&FieldValue::Text(r#"{"min":0.0,"max":12.0}"#.into())));

    let mut row = Row::new(Entity::Trackable);
    row.values.extend(fields);
    row.values.insert("id".into(), FieldValue::Integer(1));
    row.values.insert("created_at".into(), FieldValue::Integer(10));
    row.values.insert("updated_at".into(), FieldValue::Integer(10));

    let t = Trackable::from_row(row).unwrap();
    assert_eq!(t.kind, TrackableType::Numeric);
    assert_eq!(t.options.unwrap().max, Some(12.0));
  }

  #[test]
  fn empty_options_object_decodes() {
    let mut row = Row::new(Entity::Trackable);
    for (k, v) in [
      ("id", FieldValue::Integer(1)),
      ("name", "Mood".into()),
      ("type", "text".into()),
      ("options", "{}".into()),
      ("created_at", FieldValue::Integer(1)),
      ("updated_at", FieldValue::Integer(1)),
    ] {
      row.values.insert(k.into(), v);
    }
    let t = Trackable::from_row(row).unwrap();
    assert_eq!(t.options, Some(TrackableOptions::default()));
  }
}
