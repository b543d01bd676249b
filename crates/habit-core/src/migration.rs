//! Migration lifecycle states and audit-log entries.
//!
//! A migration moves `pending -> in_progress -> completed | failed`; a failed
//! migration whose compensating step succeeds ends in `rolled_back`. Every
//! transition is appended to the log and never edited afterwards.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MigrationStatus {
  Pending,
  InProgress,
  Completed,
  Failed,
  RolledBack,
}

impl MigrationStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse()
      .map_err(|_| Error::UnknownMigrationStatus(s.to_owned()))
  }

  /// Whether `self -> next` is a legal transition.
  pub fn can_transition_to(self, next: MigrationStatus) -> bool {
    matches!(
      (self, next),
      (Self::Pending, Self::InProgress)
        | (Self::InProgress, Self::Completed)
        | (Self::InProgress, Self::Failed)
        | (Self::Failed, Self::RolledBack)
    )
  }
}

/// One row of the append-only migration log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationLogEntry {
  pub id:        i64,
  pub version:   i64,
  pub status:    MigrationStatus,
  pub error:     Option<String>,
  /// Epoch milliseconds.
  pub timestamp: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_strings_are_snake_case() {
    assert_eq!(MigrationStatus::InProgress.as_str(), "in_progress");
    assert_eq!(MigrationStatus::parse("rolled_back").unwrap(), MigrationStatus::RolledBack);
    assert!(MigrationStatus::parse("done").is_err());
  }

  #[test]
  fn only_failed_can_be_rolled_back() {
    assert!(!MigrationStatus::Completed.can_transition_to(MigrationStatus::RolledBack));
    assert!(MigrationStatus::Failed.can_transition_to(MigrationStatus::RolledBack));
    assert!(!MigrationStatus::InProgress.can_transition_to(MigrationStatus::RolledBack));
    assert!(!MigrationStatus::Pending.can_transition_to(MigrationStatus::Completed));
  }
}
