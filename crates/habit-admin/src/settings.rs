//! Runtime configuration for `habit-admin`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Deserialised from the optional TOML file and `HABIT_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct HabitConfig {
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf { PathBuf::from("habits.db") }

impl HabitConfig {
  /// Layer `file` (if it exists) under the environment. Later sources win.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("HABIT"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise HabitConfig")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
