use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use rusqlite::{Connection, Transaction};
use tracing::{info, warn};

use crate::cli::{ErrorPolicy, IngestArgs};
use crate::error::LoadError;
use crate::model::{Category, CategoryLoadSummary, IngestPaths, IngestRunManifest};
use crate::util::{ensure_directory, now_utc_string, run_id, write_json_pretty};

use super::db_setup::{DB_SCHEMA_VERSION, configure_connection, ensure_schema};
use super::walker::{discover_documents, extract_period, year_pattern};
use super::{aggregated, map, top, writer};

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = run_id(started_ts);

    let manifest_dir = args.cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("fintel_warehouse.sqlite"));
    let ingest_manifest_path = args
        .ingest_manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(format!("{run_id}.json")));

    info!(
        data_root = %args.data_root.display(),
        db_path = %db_path.display(),
        run_id = %run_id,
        on_error = args.on_error.as_str(),
        "starting ingest"
    );

    let mut connection = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    let categories = selected_categories(&args.categories);

    let mut summaries = Vec::new();
    let mut warnings = Vec::new();
    for category in categories {
        let root = args.data_root.join(category.relative_root());
        if !root.is_dir() {
            warn!(
                category = category.label(),
                path = %root.display(),
                "category root missing; nothing to load"
            );
            warnings.push(format!("category root missing: {}", root.display()));
            continue;
        }

        let outcome = load_category(&mut connection, category, &root, args.on_error)
            .with_context(|| format!("failed to load category {}", category.label()))?;

        info!(
            category = category.label(),
            files_seen = outcome.summary.files_seen,
            files_loaded = outcome.summary.files_loaded,
            files_skipped = outcome.summary.files_skipped,
            rows_inserted = outcome.summary.rows_inserted,
            "category committed"
        );

        warnings.extend(outcome.warnings);
        summaries.push(outcome.summary);
    }

    let rows_inserted_total = summaries.iter().map(|s| s.rows_inserted).sum();
    let files_skipped_total = summaries.iter().map(|s| s.files_skipped).sum();
    let updated_at = now_utc_string();

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at,
        on_error: args.on_error.as_str().to_string(),
        paths: IngestPaths {
            data_root: args.data_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            db_path: db_path.display().to_string(),
        },
        categories: summaries,
        rows_inserted_total,
        files_skipped_total,
        warnings,
        notes: vec![
            "Loads are append-only and not idempotent; truncate affected tables before re-running a category.".to_string(),
        ],
    };

    write_json_pretty(&ingest_manifest_path, &manifest)?;
    write_json_pretty(&manifest_dir.join("ingest_latest.json"), &manifest)?;

    info!(path = %ingest_manifest_path.display(), "wrote ingest run manifest");
    info!(
        rows_inserted = rows_inserted_total,
        files_skipped = files_skipped_total,
        "ingest completed"
    );

    Ok(())
}

fn selected_categories(requested: &[Category]) -> Vec<Category> {
    if requested.is_empty() {
        return Category::ALL.to_vec();
    }

    let mut selected = Vec::new();
    for category in requested {
        if !selected.contains(category) {
            selected.push(*category);
        }
    }
    selected
}

pub(crate) struct CategoryOutcome {
    pub(crate) summary: CategoryLoadSummary,
    pub(crate) warnings: Vec<String>,
}

/// Loads every document under one category root inside a single transaction.
/// The transaction commits only after the full walk succeeds; returning an
/// error drops it and rolls back everything written for the category.
pub(crate) fn load_category(
    connection: &mut Connection,
    category: Category,
    root: &Path,
    on_error: ErrorPolicy,
) -> Result<CategoryOutcome> {
    let year_pattern = year_pattern()?;
    let documents = discover_documents(root)?;

    let tx = connection
        .transaction()
        .with_context(|| format!("failed to begin transaction for {}", category.label()))?;

    let mut summary = CategoryLoadSummary {
        category: category.label().to_string(),
        files_seen: documents.len(),
        files_loaded: 0,
        files_skipped: 0,
        rows_inserted: 0,
    };
    let mut warnings = Vec::new();

    for path in &documents {
        match load_document(&tx, category, path, &year_pattern) {
            Ok(rows) => {
                summary.files_loaded += 1;
                summary.rows_inserted += rows;
            }
            Err(err) => {
                let recoverable = err.downcast_ref::<LoadError>().is_some();
                if recoverable && on_error == ErrorPolicy::Skip {
                    warn!(
                        category = category.label(),
                        path = %path.display(),
                        error = %err,
                        "skipping document"
                    );
                    warnings.push(err.to_string());
                    summary.files_skipped += 1;
                } else {
                    return Err(err);
                }
            }
        }
    }

    tx.commit()
        .with_context(|| format!("failed to commit category {}", category.label()))?;

    Ok(CategoryOutcome { summary, warnings })
}

fn load_document(
    tx: &Transaction,
    category: Category,
    path: &Path,
    year_pattern: &Regex,
) -> Result<usize> {
    let period = extract_period(category, path, year_pattern)?;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let rows = match category {
        Category::MapTransactionHover => {
            let records = map::parse_transaction_hover(path, &raw)?;
            writer::insert_hover_records(tx, category, period, &records)?
        }
        Category::MapUserHover => {
            let records = map::parse_user_hover(path, &raw)?;
            writer::insert_user_hover_records(tx, period, &records)?
        }
        Category::MapInsuranceHover => {
            let records = map::parse_insurance_hover(path, &raw)?;
            writer::insert_hover_records(tx, category, period, &records)?
        }
        Category::AggregatedTransaction => {
            let records = aggregated::parse_transaction(path, &raw)?;
            writer::insert_instrument_records(tx, category, period, &records)?
        }
        Category::AggregatedUser => {
            let record = aggregated::parse_user(path, &raw)?;
            writer::insert_user_summary(tx, period, &record)?
        }
        Category::AggregatedInsurance => {
            let records = aggregated::parse_insurance(path, &raw)?;
            writer::insert_instrument_records(tx, category, period, &records)?
        }
        Category::TopTransaction => {
            let records = top::parse_transaction(path, &raw)?;
            writer::insert_top_entries(tx, category, period, &records)?
        }
        Category::TopInsurance => {
            let records = top::parse_insurance(path, &raw)?;
            writer::insert_top_entries(tx, category, period, &records)?
        }
        Category::TopUser => {
            let records = top::parse_user(path, &raw)?;
            writer::insert_top_user_records(tx, period, &records)?
        }
    };

    Ok(rows)
}
