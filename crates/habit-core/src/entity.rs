//! The closed set of persisted entities.
//!
//! Table and column names are part of the on-disk contract. Storage code only
//! ever interpolates names returned from this module, never caller strings.

use serde::{Deserialize, Serialize};

/// Column holding the surrogate integer key.
pub const ID_COLUMN: &str = "id";
/// Epoch-millisecond creation stamp, set by the CRUD layer.
pub const CREATED_AT: &str = "created_at";
/// Epoch-millisecond modification stamp, refreshed on every update.
pub const UPDATED_AT: &str = "updated_at";

/// One of the six tables managed by the data layer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
  Trackable,
  DailyReport,
  DailyReportEntry,
  Insight,
  SubPage,
  SubPageEntry,
}

impl Entity {
  /// Creation order: every parent precedes its children.
  pub const ALL: [Entity; 6] = [
    Entity::DailyReport,
    Entity::Trackable,
    Entity::DailyReportEntry,
    Entity::Insight,
    Entity::SubPage,
    Entity::SubPageEntry,
  ];

  /// Drop order: every child precedes its parents.
  pub const DROP_ORDER: [Entity; 6] = [
    Entity::DailyReportEntry,
    Entity::SubPageEntry,
    Entity::Insight,
    Entity::DailyReport,
    Entity::SubPage,
    Entity::Trackable,
  ];

  pub fn table_name(self) -> &'static str {
    match self {
      Entity::Trackable => "Trackables",
      Entity::DailyReport => "DailyReports",
      Entity::DailyReportEntry => "DailyReportEntries",
      Entity::Insight => "Insights",
      Entity::SubPage => "SubPages",
      Entity::SubPageEntry => "SubPageEntries",
    }
  }

  /// Data columns a caller may write, excluding the id and timestamps.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Entity::Trackable => &["name", "type", "options"],
      Entity::DailyReport => &["date", "notes"],
      Entity::DailyReportEntry => &["daily_report_id", "trackable_id", "value"],
      Entity::Insight => &["title", "description", "query_data"],
      Entity::SubPage => &["name", "description"],
      Entity::SubPageEntry => &["sub_page_id", "content"],
    }
  }

  /// Resolve a caller-supplied column name to its `'static` spelling.
  ///
  /// Returns `None` for anything that is neither a data column nor one of the
  /// two timestamp columns.
  pub fn column(self, name: &str) -> Option<&'static str> {
    self
      .columns()
      .iter()
      .chain([CREATED_AT, UPDATED_AT].iter())
      .find(|c| **c == name)
      .copied()
  }

  /// Look an entity up by its table name.
  pub fn from_table_name(name: &str) -> Option<Entity> {
    Entity::ALL.into_iter().find(|e| e.table_name() == name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn column_accepts_data_and_timestamp_columns() {
    assert_eq!(Entity::Trackable.column("type"), Some("type"));
    assert_eq!(Entity::DailyReport.column("created_at"), Some(CREATED_AT));
    assert_eq!(Entity::DailyReport.column("updated_at"), Some(UPDATED_AT));
  }

  #[test]
  fn column_rejects_foreign_and_id_columns() {
    assert_eq!(Entity::DailyReport.column("id"), None);
    assert_eq!(Entity::DailyReport.column("name"), None);
    assert_eq!(Entity::Insight.column("date; DROP TABLE Insights"), None);
  }

  #[test]
  fn drop_order_is_reverse_dependency_order() {
    let pos = |e: Entity| Entity::DROP_ORDER.iter().position(|x| *x == e).unwrap();
    assert!(pos(Entity::DailyReportEntry) < pos(Entity::DailyReport));
    assert!(pos(Entity::DailyReportEntry) < pos(Entity::Trackable));
    assert!(pos(Entity::SubPageEntry) < pos(Entity::SubPage));
  }

  #[test]
  fn table_names_round_trip() {
    for e in Entity::ALL {
      assert_eq!(Entity::from_table_name(e.table_name()), Some(e));
    }
    assert_eq!(Entity::from_table_name("sqlite_master"), None);
  }
}
