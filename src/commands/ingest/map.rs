use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{Category, HoverMetricRecord, UserHoverRecord};

#[derive(Deserialize)]
struct HoverDocument {
    data: Option<HoverData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoverData {
    hover_data_list: Option<Vec<HoverItem>>,
}

#[derive(Deserialize)]
struct HoverItem {
    name: String,
    metric: Vec<MetricBody>,
}

#[derive(Deserialize)]
struct MetricBody {
    #[serde(rename = "type")]
    metric_type: String,
    count: i64,
    amount: f64,
}

#[derive(Deserialize)]
struct UserHoverDocument {
    data: Option<UserHoverData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserHoverData {
    hover_data: Option<BTreeMap<String, UserHoverBody>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserHoverBody {
    registered_users: i64,
    app_opens: i64,
}

pub(crate) fn parse_transaction_hover(
    path: &Path,
    raw: &str,
) -> Result<Vec<HoverMetricRecord>, LoadError> {
    parse_hover_list(Category::MapTransactionHover, path, raw)
}

pub(crate) fn parse_insurance_hover(
    path: &Path,
    raw: &str,
) -> Result<Vec<HoverMetricRecord>, LoadError> {
    parse_hover_list(Category::MapInsuranceHover, path, raw)
}

/// One record per (region name, metric entry) pair in `data.hoverDataList`.
fn parse_hover_list(
    category: Category,
    path: &Path,
    raw: &str,
) -> Result<Vec<HoverMetricRecord>, LoadError> {
    let document: HoverDocument = serde_json::from_str(raw)
        .map_err(|err| LoadError::malformed(category.label(), path, err.to_string()))?;

    let data = document
        .data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing data section"))?;
    let items = data.hover_data_list.ok_or_else(|| {
        LoadError::malformed(category.label(), path, "missing hoverDataList section")
    })?;

    let mut records = Vec::new();
    for item in items {
        for metric in item.metric {
            records.push(HoverMetricRecord {
                name: item.name.clone(),
                metric_type: metric.metric_type,
                count: metric.count,
                amount: metric.amount,
            });
        }
    }

    Ok(records)
}

/// One record per region name in the `data.hoverData` mapping.
pub(crate) fn parse_user_hover(path: &Path, raw: &str) -> Result<Vec<UserHoverRecord>, LoadError> {
    let category = Category::MapUserHover;
    let document: UserHoverDocument = serde_json::from_str(raw)
        .map_err(|err| LoadError::malformed(category.label(), path, err.to_string()))?;

    let data = document
        .data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing data section"))?;
    let entries = data
        .hover_data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing hoverData section"))?;

    let records = entries
        .into_iter()
        .map(|(name, body)| UserHoverRecord {
            name,
            registered_users: body.registered_users,
            app_opens: body.app_opens,
        })
        .collect();

    Ok(records)
}
