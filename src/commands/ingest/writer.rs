use anyhow::{Context, Result};
use rusqlite::{Transaction, params};

use crate::model::{
    Category, HoverMetricRecord, InstrumentRecord, Period, TopEntryRecord, TopUserRecord,
    UserHoverRecord, UserSummaryRecord,
};

pub(crate) fn insert_hover_records(
    tx: &Transaction,
    category: Category,
    period: Period,
    records: &[HoverMetricRecord],
) -> Result<usize> {
    let sql = format!(
        "INSERT INTO {} (year, quarter, name, metric_type, count, amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        category.table()
    );
    let mut statement = tx
        .prepare(&sql)
        .with_context(|| format!("failed to prepare insert for {}", category.table()))?;

    for record in records {
        statement.execute(params![
            i64::from(period.year),
            i64::from(period.quarter),
            record.name,
            record.metric_type,
            record.count,
            record.amount,
        ])?;
    }

    Ok(records.len())
}

pub(crate) fn insert_user_hover_records(
    tx: &Transaction,
    period: Period,
    records: &[UserHoverRecord],
) -> Result<usize> {
    let mut statement = tx
        .prepare(
            "INSERT INTO map_user_hover (year, quarter, name, registered_users, app_opens)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare insert for map_user_hover")?;

    for record in records {
        statement.execute(params![
            i64::from(period.year),
            i64::from(period.quarter),
            record.name,
            record.registered_users,
            record.app_opens,
        ])?;
    }

    Ok(records.len())
}

pub(crate) fn insert_instrument_records(
    tx: &Transaction,
    category: Category,
    period: Period,
    records: &[InstrumentRecord],
) -> Result<usize> {
    let sql = format!(
        "INSERT INTO {} (year, quarter, from_ts, to_ts, category, instrument_type, count, amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        category.table()
    );
    let mut statement = tx
        .prepare(&sql)
        .with_context(|| format!("failed to prepare insert for {}", category.table()))?;

    for record in records {
        statement.execute(params![
            i64::from(period.year),
            i64::from(period.quarter),
            record.from_ts,
            record.to_ts,
            record.category,
            record.instrument_type,
            record.count,
            record.amount,
        ])?;
    }

    Ok(records.len())
}

/// Inserts the per-period user summary, then its device child rows keyed by
/// the parent's generated rowid. Children never outlive a failed parent:
/// any error here aborts the category transaction upstream.
pub(crate) fn insert_user_summary(
    tx: &Transaction,
    period: Period,
    record: &UserSummaryRecord,
) -> Result<usize> {
    tx.execute(
        "INSERT INTO aggregated_user (year, quarter, registered_users, app_opens)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            i64::from(period.year),
            i64::from(period.quarter),
            record.registered_users,
            record.app_opens,
        ],
    )
    .context("failed to insert aggregated_user row")?;

    let user_id = tx.last_insert_rowid();

    let mut statement = tx
        .prepare(
            "INSERT INTO aggregated_user_device (user_id, brand, count, percentage)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .context("failed to prepare insert for aggregated_user_device")?;

    for device in &record.devices {
        statement.execute(params![user_id, device.brand, device.count, device.percentage])?;
    }

    Ok(1 + record.devices.len())
}

pub(crate) fn insert_top_entries(
    tx: &Transaction,
    category: Category,
    period: Period,
    records: &[TopEntryRecord],
) -> Result<usize> {
    let sql = format!(
        "INSERT INTO {} (year, quarter, entity_level, entity_name, metric_type, count, amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        category.table()
    );
    let mut statement = tx
        .prepare(&sql)
        .with_context(|| format!("failed to prepare insert for {}", category.table()))?;

    for record in records {
        statement.execute(params![
            i64::from(period.year),
            i64::from(period.quarter),
            record.entity_level.as_str(),
            record.entity_name,
            record.metric_type,
            record.count,
            record.amount,
        ])?;
    }

    Ok(records.len())
}

pub(crate) fn insert_top_user_records(
    tx: &Transaction,
    period: Period,
    records: &[TopUserRecord],
) -> Result<usize> {
    let mut statement = tx
        .prepare(
            "INSERT INTO top_user (year, quarter, entity_level, entity_name, registered_users)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare insert for top_user")?;

    for record in records {
        statement.execute(params![
            i64::from(period.year),
            i64::from(period.quarter),
            record.entity_level.as_str(),
            record.entity_name,
            record.registered_users,
        ])?;
    }

    Ok(records.len())
}
