//! Sub-pages: free-form journals with their own list of entries.

use serde::{Deserialize, Serialize};

use crate::{Entity, Fields, NewRecord, Record, Result, Row};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPage {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  i64,
  pub updated_at:  i64,
}

impl Record for SubPage {
  const ENTITY: Entity = Entity::SubPage;

  fn from_row(row: Row) -> Result<Self> {
    Ok(Self {
      id:          row.id()?,
      name:        row.text("name")?,
      description: row.opt_text("description")?,
      created_at:  row.integer("created_at")?,
      updated_at:  row.integer("updated_at")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubPage {
  pub name:        String,
  pub description: Option<String>,
}

impl NewSubPage {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), description: None } }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}

impl NewRecord for NewSubPage {
  const ENTITY: Entity = Entity::SubPage;

  fn into_fields(self) -> Result<Fields> {
    Ok(
      Fields::new()
        .with("name", self.name)
        .with("description", self.description),
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPageEntry {
  pub id:          i64,
  pub sub_page_id: i64,
  pub content:     String,
  pub created_at:  i64,
  pub updated_at:  i64,
}

impl Record for SubPageEntry {
  const ENTITY: Entity = Entity::SubPageEntry;

  fn from_row(row: Row) -> Result<Self> {
    Ok(Self {
      id:          row.id()?,
      sub_page_id: row.integer("sub_page_id")?,
      content:     row.text("content")?,
      created_at:  row.integer("created_at")?,
      updated_at:  row.integer("updated_at")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubPageEntry {
  pub sub_page_id: i64,
  pub content:     String,
}

impl NewSubPageEntry {
  pub fn new(sub_page_id: i64, content: impl Into<String>) -> Self {
    Self { sub_page_id, content: content.into() }
  }
}

impl NewRecord for NewSubPageEntry {
  const ENTITY: Entity = Entity::SubPageEntry;

  fn into_fields(self) -> Result<Fields> {
    Ok(
      Fields::new()
        .with("sub_page_id", self.sub_page_id)
        .with("content", self.content),
    )
  }
}
