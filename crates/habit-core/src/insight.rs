//! Insights: saved observations over a window of reports.
//!
//! Insights carry no foreign key; they are placed in time by `created_at`.

use serde::{Deserialize, Serialize};

use crate::{Entity, Fields, NewRecord, Record, Result, Row};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
  pub id:          i64,
  pub title:       String,
  pub description: Option<String>,
  /// The parameters the insight was computed from, as stored JSON.
  pub query_data:  Option<serde_json::Value>,
  pub created_at:  i64,
  pub updated_at:  i64,
}

impl Record for Insight {
  const ENTITY: Entity = Entity::Insight;

  fn from_row(row: Row) -> Result<Self> {
    let query_data = row
      .opt_text("query_data")?
      .map(|json| serde_json::from_str(&json))
      .transpose()?;

    Ok(Self {
      id: row.id()?,
      title: row.text("title")?,
      description: row.opt_text("description")?,
      query_data,
      created_at: row.integer("created_at")?,
      updated_at: row.integer("updated_at")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInsight {
  pub title:       String,
  pub description: Option<String>,
  pub query_data:  Option<serde_json::Value>,
}

impl NewInsight {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), description: None, query_data: None }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_query_data(mut self, query_data: serde_json::Value) -> Self {
    self.query_data = Some(query_data);
    self
  }
}

impl NewRecord for NewInsight {
  const ENTITY: Entity = Entity::Insight;

  fn into_fields(self) -> Result<Fields> {
    let query_data = self
      .query_data
      .as_ref()
      .map(serde_json::to_string)
      .transpose()?;

    Ok(
      Fields::new()
        .with("title", self.title)
        .with("description", self.description)
        .with("query_data", query_data),
    )
  }
}
