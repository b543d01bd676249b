//! habit-admin: maintenance commands for a habit-tracker database.
//!
//! Reads `habit.toml` (or the path given with `--config`) and `HABIT_*`
//! environment variables, opens the SQLite database and runs one command.
//!
//! ```
//! habit-admin --database ~/habits.db check
//! habit-admin history --limit 20
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use habit_store_sqlite::{DEFAULT_HISTORY_LIMIT, DEFAULT_RECENT_LIMIT, HabitStore};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{HabitConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Habit tracker database maintenance")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "habit.toml")]
  config: PathBuf,

  /// Database file; overrides `database_path` from the configuration.
  #[arg(short, long, env = "HABIT_DATABASE")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create any missing tables, indexes and migration bookkeeping.
  Init,
  /// Drop and recreate every data table. Deletes all data.
  Reset {
    /// Required; there is no undo.
    #[arg(long)]
    force: bool,
  },
  /// Report which tables exist.
  Check,
  /// Print the current schema version.
  Version,
  /// Print the migration log, newest first.
  History {
    #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    limit: u32,
  },
  /// Print the most recent daily reports.
  Recent {
    #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
    limit: u32,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = HabitConfig::load(&cli.config)?;
  let database = expand_tilde(cli.database.as_deref().unwrap_or(cfg.database_path.as_path()));

  let store = match cli.command {
    // Check only looks; never create tables it is meant to report on.
    Command::Check => HabitStore::connect(&database).await,
    _ => HabitStore::open(&database).await,
  }
  .with_context(|| format!("failed to open database at {database:?}"))?;

  run(&store, cli.command).await?;

  store.close().await.context("failed to close database")?;
  Ok(())
}

async fn run(store: &HabitStore, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Init => {
      store.initialize_schema().await?;
      store.initialize_migration_tables().await?;
      println!("schema ready (version {})", store.get_current_version().await?);
    }
    Command::Reset { force } => {
      if !force {
        anyhow::bail!("reset deletes every row; pass --force to continue");
      }
      store
        .reset_schema_for_development()
        .await
        .context("reset failed")?;
      println!("schema reset");
    }
    Command::Check => {
      let mut missing = 0;
      for (entity, exists) in store.verify_schema().await? {
        let mark = if exists { "ok" } else { "missing" };
        println!("{:<20} {mark}", entity.table_name());
        missing += usize::from(!exists);
      }
      if missing > 0 {
        anyhow::bail!("{missing} table(s) missing; run `habit-admin init`");
      }
    }
    Command::Version => {
      println!("{}", store.get_current_version().await?);
    }
    Command::History { limit } => {
      let history = store.get_migration_history(limit).await?;
      println!("{}", serde_json::to_string_pretty(&history)?);
    }
    Command::Recent { limit } => {
      let reports = store.get_recent_daily_reports(limit).await?;
      println!("{}", serde_json::to_string_pretty(&reports)?);
    }
  }
  Ok(())
}
