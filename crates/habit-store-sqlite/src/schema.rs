//! SQL schema for the habit store.
//!
//! Table and column names are the on-disk contract shared with the mobile
//! app; do not rename them. Every statement is idempotent.

/// Applied to every connection as soon as it is opened.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Data tables, parents before children so foreign keys resolve.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS DailyReports (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT    NOT NULL UNIQUE,   -- YYYY-MM-DD
    notes       TEXT,
    created_at  INTEGER NOT NULL,          -- epoch ms
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS Trackables (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    type        TEXT    NOT NULL CHECK (type IN ('boolean', 'numeric', 'selection', 'text')),
    options     TEXT,                      -- JSON
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS DailyReportEntries (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    daily_report_id INTEGER NOT NULL REFERENCES DailyReports (id) ON DELETE CASCADE,
    trackable_id    INTEGER NOT NULL REFERENCES Trackables (id) ON DELETE CASCADE,
    value           TEXT    NOT NULL,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);

-- No foreign key: insights are placed in time by created_at only.
CREATE TABLE IF NOT EXISTS Insights (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    description TEXT,
    query_data  TEXT,                      -- JSON
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS SubPages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    description TEXT,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS SubPageEntries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sub_page_id INTEGER NOT NULL REFERENCES SubPages (id) ON DELETE CASCADE,
    content     TEXT    NOT NULL,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);
";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_daily_reports_date                ON DailyReports (date);
CREATE INDEX IF NOT EXISTS idx_trackables_name                   ON Trackables (name);
CREATE INDEX IF NOT EXISTS idx_daily_report_entries_report_id    ON DailyReportEntries (daily_report_id);
CREATE INDEX IF NOT EXISTS idx_daily_report_entries_trackable_id ON DailyReportEntries (trackable_id);
";

pub const INDEX_NAMES: [&str; 4] = [
  "idx_daily_reports_date",
  "idx_trackables_name",
  "idx_daily_report_entries_report_id",
  "idx_daily_report_entries_trackable_id",
];

/// Version bookkeeping and the migration audit log.
///
/// `migration_logs` is append-only; the triggers turn any UPDATE or DELETE
/// into a constraint failure.
pub const CREATE_MIGRATION_TABLES: &str = "
CREATE TABLE IF NOT EXISTS db_version (
    id                  INTEGER PRIMARY KEY CHECK (id = 1),
    version             INTEGER NOT NULL CHECK (version >= 0),
    last_migration_date INTEGER
);

CREATE TABLE IF NOT EXISTS migration_logs (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    version   INTEGER NOT NULL,
    status    TEXT    NOT NULL
              CHECK (status IN ('pending', 'in_progress', 'completed', 'failed', 'rolled_back')),
    error     TEXT,
    timestamp INTEGER NOT NULL
);

CREATE TRIGGER IF NOT EXISTS migration_logs_no_update
BEFORE UPDATE ON migration_logs
BEGIN
    SELECT RAISE(ABORT, 'migration_logs is append-only');
END;

CREATE TRIGGER IF NOT EXISTS migration_logs_no_delete
BEFORE DELETE ON migration_logs
BEGIN
    SELECT RAISE(ABORT, 'migration_logs is append-only');
END;
";
