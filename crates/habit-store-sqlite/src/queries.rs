//! Domain reads: reports, entry joins, statistics and trends.
//!
//! Every helper re-runs its query on each call and returns an owned `Vec`.

use chrono::{NaiveDate, Utc};
use habit_core::{
  Entity, Record,
  insight::Insight,
  report::{DailyReport, DailyReportEntry, EntryWithDate, EntryWithTrackable},
  stats::{DateRange, TREND_WINDOW, TrackableStats, TrendPoint, rolling_trend},
  trackable::{Trackable, TrackableType},
};

use crate::{HabitStore, Result, crud::query_rows, encode::like_pattern};

/// How many reports [`HabitStore::get_recent_daily_reports`] callers
/// usually ask for: one week.
pub const DEFAULT_RECENT_LIMIT: u32 = 7;

/// Default cap for [`HabitStore::get_trackable_entries`].
pub const DEFAULT_ENTRIES_LIMIT: u32 = 30;

fn decode_all<R: Record>(rows: Vec<habit_core::Row>) -> Result<Vec<R>> {
  Ok(
    rows
      .into_iter()
      .map(R::from_row)
      .collect::<habit_core::Result<_>>()?,
  )
}

impl HabitStore {
  /// The `limit` most recent reports, newest date first.
  pub async fn get_recent_daily_reports(&self, limit: u32) -> Result<Vec<DailyReport>> {
    let rows = self
      .with_conn(move |conn| {
        query_rows(
          conn,
          Entity::DailyReport,
          "SELECT * FROM DailyReports ORDER BY date DESC LIMIT ?1",
          [limit],
        )
      })
      .await?;
    decode_all(rows)
  }

  /// Aggregate one trackable's entries over reports dated within `range`.
  ///
  /// Values that do not parse as numbers count towards `total_entries` only.
  pub async fn get_trackable_stats(
    &self,
    trackable_id: i64,
    range:        &DateRange,
  ) -> Result<TrackableStats> {
    let DateRange { start, end } = range.clone();
    let values: Vec<String> = self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT dre.value
           FROM DailyReportEntries dre
           JOIN DailyReports dr ON dr.id = dre.daily_report_id
           WHERE dre.trackable_id = ?1
             AND dr.date BETWEEN ?2 AND ?3",
        )?;
        let values = stmt
          .query_map(rusqlite::params![trackable_id, start, end], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
      })
      .await?;

    Ok(TrackableStats::from_values(trackable_id, values))
  }

  /// Reports whose notes contain `term`, case-insensitively, newest first.
  ///
  /// `%` and `_` in `term` match literally.
  pub async fn search_daily_reports_by_note(&self, term: &str) -> Result<Vec<DailyReport>> {
    let pattern = like_pattern(term);
    let rows = self
      .with_conn(move |conn| {
        query_rows(
          conn,
          Entity::DailyReport,
          "SELECT * FROM DailyReports
           WHERE notes LIKE ?1 ESCAPE '\\'
           ORDER BY date DESC",
          [pattern],
        )
      })
      .await?;
    decode_all(rows)
  }

  pub async fn get_trackables_by_type(&self, kind: TrackableType) -> Result<Vec<Trackable>> {
    let rows = self
      .with_conn(move |conn| {
        query_rows(
          conn,
          Entity::Trackable,
          "SELECT * FROM Trackables WHERE type = ?1 ORDER BY name, id",
          [kind.as_str()],
        )
      })
      .await?;
    decode_all(rows)
  }

  /// Insights created within `[start, end]` (epoch ms, inclusive), newest
  /// first. An inverted range yields nothing.
  pub async fn get_insights_by_date_range(&self, start: i64, end: i64) -> Result<Vec<Insight>> {
    let rows = self
      .with_conn(move |conn| {
        query_rows(
          conn,
          Entity::Insight,
          "SELECT * FROM Insights
           WHERE created_at BETWEEN ?1 AND ?2
           ORDER BY created_at DESC, id DESC",
          [start, end],
        )
      })
      .await?;
    decode_all(rows)
  }

  /// Entries of one report with their trackable's name and type, in the
  /// order they were recorded.
  pub async fn get_daily_report_entries(&self, report_id: i64) -> Result<Vec<EntryWithTrackable>> {
    let rows = self
      .with_conn(move |conn| {
        query_rows(
          conn,
          Entity::DailyReportEntry,
          "SELECT dre.*, t.name AS trackable_name, t.type AS trackable_type
           FROM DailyReportEntries dre
           LEFT JOIN Trackables t ON t.id = dre.trackable_id
           WHERE dre.daily_report_id = ?1
           ORDER BY dre.created_at ASC, dre.id ASC",
          [report_id],
        )
      })
      .await?;

    rows
      .into_iter()
      .map(|row| -> Result<EntryWithTrackable> {
        let trackable_name = row.opt_text("trackable_name")?;
        let trackable_type = row
          .opt_text("trackable_type")?
          .map(|t| TrackableType::parse(&t))
          .transpose()?;
        Ok(EntryWithTrackable {
          entry: DailyReportEntry::from_row(row)?,
          trackable_name,
          trackable_type,
        })
      })
      .collect()
  }

  /// The `limit` most recent entries of one trackable with their report
  /// date, newest date first.
  pub async fn get_trackable_entries(
    &self,
    trackable_id: i64,
    limit:        u32,
  ) -> Result<Vec<EntryWithDate>> {
    let rows = self
      .with_conn(move |conn| {
        query_rows(
          conn,
          Entity::DailyReportEntry,
          "SELECT dre.*, dr.date AS date
           FROM DailyReportEntries dre
           JOIN DailyReports dr ON dr.id = dre.daily_report_id
           WHERE dre.trackable_id = ?1
           ORDER BY dr.date DESC, dre.id DESC
           LIMIT ?2",
          rusqlite::params![trackable_id, limit],
        )
      })
      .await?;

    rows
      .into_iter()
      .map(|row| -> Result<EntryWithDate> {
        let date = row.text("date")?;
        Ok(EntryWithDate { entry: DailyReportEntry::from_row(row)?, date })
      })
      .collect()
  }

  /// Numeric values of one trackable from `days` days before `as_of`
  /// (default: today, UTC) through `as_of`, oldest first, each with a rolling
  /// average over itself and up to six earlier points.
  pub async fn get_trackable_trend(
    &self,
    trackable_id: i64,
    days:         u32,
    as_of:        Option<NaiveDate>,
  ) -> Result<Vec<TrendPoint>> {
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let DateRange { start, end } = DateRange::last_days(as_of, days);

    let points: Vec<(String, String)> = self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT dr.date, dre.value
           FROM DailyReportEntries dre
           JOIN DailyReports dr ON dr.id = dre.daily_report_id
           WHERE dre.trackable_id = ?1
             AND dr.date BETWEEN ?2 AND ?3
           ORDER BY dr.date ASC, dre.id ASC",
        )?;
        let points = stmt
          .query_map(rusqlite::params![trackable_id, start, end], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(points)
      })
      .await?;

    Ok(rolling_trend(points, TREND_WINDOW))
  }
}
