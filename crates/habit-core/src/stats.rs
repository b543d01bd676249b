//! Aggregates over recorded entry values.
//!
//! Entry values are stored as free text, so everything here first decides
//! which values are numeric. Non-numeric values are counted but never fed
//! into an average, minimum or maximum.

use std::collections::VecDeque;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format used for `DailyReports.date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Points covered by a trend's rolling average: the current one plus the six
/// before it.
pub const TREND_WINDOW: usize = 7;

pub fn format_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

/// Parse an entry value as a number, rejecting anything non-finite.
pub fn parse_numeric(value: &str) -> Option<f64> {
  value
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
}

// ─── DateRange ───────────────────────────────────────────────────────────────

/// An inclusive window over report dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: String,
  pub end:   String,
}

impl DateRange {
  pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
    Self { start: start.into(), end: end.into() }
  }

  pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
    Self::new(format_date(start), format_date(end))
  }

  /// From `days` days before `as_of` through `as_of`, both ends included.
  pub fn last_days(as_of: NaiveDate, days: u32) -> Self {
    let start = as_of
      .checked_sub_days(Days::new(u64::from(days)))
      .unwrap_or(NaiveDate::MIN);
    Self::from_dates(start, as_of)
  }
}

// ─── TrackableStats ──────────────────────────────────────────────────────────

/// Summary of one trackable's entries over a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackableStats {
  pub trackable_id:    i64,
  /// Every entry in the window, numeric or not.
  pub total_entries:   u64,
  /// Entries whose value parsed as a number.
  pub numeric_entries: u64,
  pub average:         Option<f64>,
  pub min:             Option<f64>,
  pub max:             Option<f64>,
}

impl TrackableStats {
  pub fn from_values<I, S>(trackable_id: i64, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut stats = Self {
      trackable_id,
      total_entries: 0,
      numeric_entries: 0,
      average: None,
      min: None,
      max: None,
    };
    let mut sum = 0.0;

    for value in values {
      stats.total_entries += 1;
      let Some(n) = parse_numeric(value.as_ref()) else { continue };
      stats.numeric_entries += 1;
      sum += n;
      stats.min = Some(stats.min.map_or(n, |m| m.min(n)));
      stats.max = Some(stats.max.map_or(n, |m| m.max(n)));
    }

    if stats.numeric_entries > 0 {
      stats.average = Some(sum / stats.numeric_entries as f64);
    }
    stats
  }
}

// ─── Trend ───────────────────────────────────────────────────────────────────

/// One numeric observation and the rolling average ending at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
  pub date:            String,
  pub value:           f64,
  pub rolling_average: f64,
}

/// Build a trend from `(date, value)` pairs already sorted by date.
///
/// Non-numeric values are skipped and do not occupy a window slot.
pub fn rolling_trend<I, D, V>(points: I, window: usize) -> Vec<TrendPoint>
where
  I: IntoIterator<Item = (D, V)>,
  D: Into<String>,
  V: AsRef<str>,
{
  let window = window.max(1);
  let mut recent: VecDeque<f64> = VecDeque::with_capacity(window);
  let mut sum = 0.0;
  let mut out = Vec::new();

  for (date, value) in points {
    let Some(n) = parse_numeric(value.as_ref()) else { continue };
    if recent.len() == window
      && let Some(oldest) = recent.pop_front()
    {
      sum -= oldest;
    }
    recent.push_back(n);
    sum += n;
    out.push(TrendPoint {
      date:            date.into(),
      value:           n,
      rolling_average: sum / recent.len() as f64,
    });
  }
  out
}
