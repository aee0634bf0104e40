use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::util::now_utc_string;

pub(crate) const DB_SCHEMA_VERSION: &str = "0.1.0";

pub(crate) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

/// Creates the warehouse relations. The data tables intentionally carry no
/// uniqueness constraints: re-loading a directory appends duplicate rows,
/// and re-run hygiene is an operator concern (truncate, then reload).
pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS map_transaction_hover (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          name TEXT NOT NULL,
          metric_type TEXT NOT NULL,
          count INTEGER NOT NULL,
          amount REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS map_user_hover (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          name TEXT NOT NULL,
          registered_users INTEGER NOT NULL,
          app_opens INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS map_insurance_hover (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          name TEXT NOT NULL,
          metric_type TEXT NOT NULL,
          count INTEGER NOT NULL,
          amount REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS aggregated_transaction (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          from_ts INTEGER,
          to_ts INTEGER,
          category TEXT NOT NULL,
          instrument_type TEXT NOT NULL,
          count INTEGER NOT NULL,
          amount REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS aggregated_user (
          id INTEGER PRIMARY KEY,
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          registered_users INTEGER NOT NULL,
          app_opens INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS aggregated_user_device (
          user_id INTEGER NOT NULL,
          brand TEXT NOT NULL,
          count INTEGER NOT NULL,
          percentage REAL NOT NULL,
          FOREIGN KEY(user_id) REFERENCES aggregated_user(id)
        );

        CREATE TABLE IF NOT EXISTS aggregated_insurance (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          from_ts INTEGER,
          to_ts INTEGER,
          category TEXT NOT NULL,
          instrument_type TEXT NOT NULL,
          count INTEGER NOT NULL,
          amount REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS top_transaction (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          entity_level TEXT NOT NULL,
          entity_name TEXT NOT NULL,
          metric_type TEXT NOT NULL,
          count INTEGER NOT NULL,
          amount REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS top_insurance (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          entity_level TEXT NOT NULL,
          entity_name TEXT NOT NULL,
          metric_type TEXT NOT NULL,
          count INTEGER NOT NULL,
          amount REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS top_user (
          year INTEGER NOT NULL,
          quarter INTEGER NOT NULL,
          entity_level TEXT NOT NULL,
          entity_name TEXT NOT NULL,
          registered_users INTEGER NOT NULL
        );
        ",
    )?;

    connection.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_map_transaction_hover_period ON map_transaction_hover(year, quarter);
        CREATE INDEX IF NOT EXISTS idx_map_user_hover_period ON map_user_hover(year, quarter);
        CREATE INDEX IF NOT EXISTS idx_map_insurance_hover_period ON map_insurance_hover(year, quarter);
        CREATE INDEX IF NOT EXISTS idx_aggregated_transaction_period ON aggregated_transaction(year, quarter);
        CREATE INDEX IF NOT EXISTS idx_aggregated_user_period ON aggregated_user(year, quarter);
        CREATE INDEX IF NOT EXISTS idx_aggregated_user_device_user ON aggregated_user_device(user_id);
        CREATE INDEX IF NOT EXISTS idx_aggregated_insurance_period ON aggregated_insurance(year, quarter);
        CREATE INDEX IF NOT EXISTS idx_top_transaction_level ON top_transaction(entity_level);
        CREATE INDEX IF NOT EXISTS idx_top_insurance_level ON top_insurance(entity_level);
        CREATE INDEX IF NOT EXISTS idx_top_user_period ON top_user(year, quarter);
        ",
    )?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}
