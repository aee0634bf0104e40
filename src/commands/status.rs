use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{Category, IngestRunManifest};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_path = args.cache_root.join("manifests").join("ingest_latest.json");
    let db_path = args
        .db_path
        .unwrap_or_else(|| args.cache_root.join("fintel_warehouse.sqlite"));

    info!(cache_root = %args.cache_root.display(), "status requested");

    if manifest_path.exists() {
        let raw = fs::read(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: IngestRunManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        info!(
            run_id = %manifest.run_id,
            status = %manifest.status,
            started_at = %manifest.started_at,
            updated_at = %manifest.updated_at,
            on_error = %manifest.on_error,
            rows_inserted = manifest.rows_inserted_total,
            files_skipped = manifest.files_skipped_total,
            warnings = manifest.warnings.len(),
            "loaded latest ingest manifest"
        );

        for summary in &manifest.categories {
            info!(
                category = %summary.category,
                files_seen = summary.files_seen,
                files_loaded = summary.files_loaded,
                files_skipped = summary.files_skipped,
                rows_inserted = summary.rows_inserted,
                "last run category summary"
            );
        }
    } else {
        warn!(path = %manifest_path.display(), "no ingest manifest found");
    }

    if db_path.exists() {
        let connection = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;

        for category in Category::ALL {
            let rows = table_count(&connection, category.table()).unwrap_or(0);
            info!(table = category.table(), rows, "relation status");
        }
        let device_rows = table_count(&connection, "aggregated_user_device").unwrap_or(0);
        info!(table = "aggregated_user_device", rows = device_rows, "relation status");
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

fn table_count(connection: &Connection, table: &str) -> Result<i64> {
    let count = connection.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}
