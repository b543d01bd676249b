//! Daily reports and their per-trackable entries.

use serde::{Deserialize, Serialize};

use crate::{Entity, Fields, NewRecord, Record, Result, Row, trackable::TrackableType};

// ─── DailyReport ─────────────────────────────────────────────────────────────

/// One report per calendar day; `date` is a unique `YYYY-MM-DD` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
  pub id:         i64,
  pub date:       String,
  pub notes:      Option<String>,
  pub created_at: i64,
  pub updated_at: i64,
}

impl Record for DailyReport {
  const ENTITY: Entity = Entity::DailyReport;

  fn from_row(row: Row) -> Result<Self> {
    Ok(Self {
      id:         row.id()?,
      date:       row.text("date")?,
      notes:      row.opt_text("notes")?,
      created_at: row.integer("created_at")?,
      updated_at: row.integer("updated_at")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDailyReport {
  pub date:  String,
  pub notes: Option<String>,
}

impl NewDailyReport {
  pub fn new(date: impl Into<String>) -> Self { Self { date: date.into(), notes: None } }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }
}

impl NewRecord for NewDailyReport {
  const ENTITY: Entity = Entity::DailyReport;

  fn into_fields(self) -> Result<Fields> {
    Ok(Fields::new().with("date", self.date).with("notes", self.notes))
  }
}

// ─── DailyReportEntry ────────────────────────────────────────────────────────

/// The value recorded for one trackable on one report, always stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportEntry {
  pub id:              i64,
  pub daily_report_id: i64,
  pub trackable_id:    i64,
  pub value:           String,
  pub created_at:      i64,
  pub updated_at:      i64,
}

impl Record for DailyReportEntry {
  const ENTITY: Entity = Entity::DailyReportEntry;

  fn from_row(row: Row) -> Result<Self> {
    Ok(Self {
      id:              row.id()?,
      daily_report_id: row.integer("daily_report_id")?,
      trackable_id:    row.integer("trackable_id")?,
      value:           row.text("value")?,
      created_at:      row.integer("created_at")?,
      updated_at:      row.integer("updated_at")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDailyReportEntry {
  pub daily_report_id: i64,
  pub trackable_id:    i64,
  pub value:           String,
}

impl NewDailyReportEntry {
  pub fn new(daily_report_id: i64, trackable_id: i64, value: impl Into<String>) -> Self {
    Self { daily_report_id, trackable_id, value: value.into() }
  }
}

impl NewRecord for NewDailyReportEntry {
  const ENTITY: Entity = Entity::DailyReportEntry;

  fn into_fields(self) -> Result<Fields> {
    Ok(
      Fields::new()
        .with("daily_report_id", self.daily_report_id)
        .with("trackable_id", self.trackable_id)
        .with("value", self.value),
    )
  }
}

// ─── Joined read models ──────────────────────────────────────────────────────

/// An entry together with the trackable it records.
///
/// The trackable columns come from a `LEFT JOIN`, so they are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryWithTrackable {
  #[serde(flatten)]
  pub entry:          DailyReportEntry,
  pub trackable_name: Option<String>,
  pub trackable_type: Option<TrackableType>,
}

/// An entry together with the date of the report it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryWithDate {
  #[serde(flatten)]
  pub entry: DailyReportEntry,
  pub date:  String,
}
