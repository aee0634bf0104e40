use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{Category, EntityLevel, TopEntryRecord, TopUserRecord};

#[derive(Deserialize)]
struct TopMetricDocument {
    data: Option<TopMetricData>,
}

#[derive(Deserialize)]
struct TopMetricData {
    states: Option<Vec<TopMetricItem>>,
    districts: Option<Vec<TopMetricItem>>,
    pincodes: Option<Vec<TopMetricItem>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopMetricItem {
    entity_name: String,
    metric: TopMetricBody,
}

#[derive(Deserialize)]
struct TopMetricBody {
    #[serde(rename = "type")]
    metric_type: String,
    count: i64,
    amount: f64,
}

#[derive(Deserialize)]
struct TopUserDocument {
    data: Option<TopUserData>,
}

#[derive(Deserialize)]
struct TopUserData {
    states: Option<Vec<TopUserItem>>,
    districts: Option<Vec<TopUserItem>>,
    pincodes: Option<Vec<TopUserItem>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopUserItem {
    name: String,
    registered_users: i64,
}

pub(crate) fn parse_transaction(path: &Path, raw: &str) -> Result<Vec<TopEntryRecord>, LoadError> {
    parse_metric_entries(Category::TopTransaction, path, raw)
}

pub(crate) fn parse_insurance(path: &Path, raw: &str) -> Result<Vec<TopEntryRecord>, LoadError> {
    parse_metric_entries(Category::TopInsurance, path, raw)
}

/// One record per entry of each present plural level section; the level name
/// is singularized into the record's entity level. Absent or null sections
/// are legitimately empty.
fn parse_metric_entries(
    category: Category,
    path: &Path,
    raw: &str,
) -> Result<Vec<TopEntryRecord>, LoadError> {
    let document: TopMetricDocument = serde_json::from_str(raw)
        .map_err(|err| LoadError::malformed(category.label(), path, err.to_string()))?;

    let data = document
        .data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing data section"))?;

    let sections = [
        ("states", data.states),
        ("districts", data.districts),
        ("pincodes", data.pincodes),
    ];

    let mut records = Vec::new();
    for (plural, items) in sections {
        let Some(entity_level) = EntityLevel::from_plural(plural) else {
            continue;
        };
        for item in items.unwrap_or_default() {
            records.push(TopEntryRecord {
                entity_level,
                entity_name: item.entity_name,
                metric_type: item.metric.metric_type,
                count: item.metric.count,
                amount: item.metric.amount,
            });
        }
    }

    Ok(records)
}

pub(crate) fn parse_user(path: &Path, raw: &str) -> Result<Vec<TopUserRecord>, LoadError> {
    let category = Category::TopUser;
    let document: TopUserDocument = serde_json::from_str(raw)
        .map_err(|err| LoadError::malformed(category.label(), path, err.to_string()))?;

    let data = document
        .data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing data section"))?;

    let sections = [
        ("states", data.states),
        ("districts", data.districts),
        ("pincodes", data.pincodes),
    ];

    let mut records = Vec::new();
    for (plural, items) in sections {
        let Some(entity_level) = EntityLevel::from_plural(plural) else {
            continue;
        };
        for item in items.unwrap_or_default() {
            records.push(TopUserRecord {
                entity_level,
                entity_name: item.name,
                registered_users: item.registered_users,
            });
        }
    }

    Ok(records)
}
