use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{Category, DeviceRecord, InstrumentRecord, UserSummaryRecord};

#[derive(Deserialize)]
struct InstrumentDocument {
    data: Option<InstrumentData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentData {
    from: Option<i64>,
    to: Option<i64>,
    transaction_data: Option<Vec<InstrumentItem>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentItem {
    name: String,
    payment_instruments: Vec<InstrumentBody>,
}

#[derive(Deserialize)]
struct InstrumentBody {
    #[serde(rename = "type")]
    instrument_type: String,
    count: i64,
    amount: f64,
}

#[derive(Deserialize)]
struct UserDocument {
    data: Option<UserData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserData {
    aggregated: Option<UserAggregate>,
    users_by_device: Option<Vec<DeviceBody>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserAggregate {
    registered_users: i64,
    app_opens: i64,
}

#[derive(Deserialize)]
struct DeviceBody {
    brand: String,
    count: i64,
    percentage: f64,
}

pub(crate) fn parse_transaction(
    path: &Path,
    raw: &str,
) -> Result<Vec<InstrumentRecord>, LoadError> {
    parse_instrument_list(Category::AggregatedTransaction, path, raw)
}

pub(crate) fn parse_insurance(path: &Path, raw: &str) -> Result<Vec<InstrumentRecord>, LoadError> {
    parse_instrument_list(Category::AggregatedInsurance, path, raw)
}

/// One record per (category name, payment instrument) pair. The document's
/// `from`/`to` window is optional and carried on every record.
fn parse_instrument_list(
    category: Category,
    path: &Path,
    raw: &str,
) -> Result<Vec<InstrumentRecord>, LoadError> {
    let document: InstrumentDocument = serde_json::from_str(raw)
        .map_err(|err| LoadError::malformed(category.label(), path, err.to_string()))?;

    let data = document
        .data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing data section"))?;
    let items = data.transaction_data.ok_or_else(|| {
        LoadError::malformed(category.label(), path, "missing transactionData section")
    })?;

    let mut records = Vec::new();
    for item in items {
        for instrument in item.payment_instruments {
            records.push(InstrumentRecord {
                from_ts: data.from,
                to_ts: data.to,
                category: item.name.clone(),
                instrument_type: instrument.instrument_type,
                count: instrument.count,
                amount: instrument.amount,
            });
        }
    }

    Ok(records)
}

/// Exactly one summary record per document; the device breakdown is optional
/// and its absence yields an empty `devices` list, not an error.
pub(crate) fn parse_user(path: &Path, raw: &str) -> Result<UserSummaryRecord, LoadError> {
    let category = Category::AggregatedUser;
    let document: UserDocument = serde_json::from_str(raw)
        .map_err(|err| LoadError::malformed(category.label(), path, err.to_string()))?;

    let data = document
        .data
        .ok_or_else(|| LoadError::malformed(category.label(), path, "missing data section"))?;
    let aggregated = data.aggregated.ok_or_else(|| {
        LoadError::malformed(category.label(), path, "missing aggregated section")
    })?;

    let devices = data
        .users_by_device
        .unwrap_or_default()
        .into_iter()
        .map(|body| DeviceRecord {
            brand: body.brand,
            count: body.count,
            percentage: body.percentage,
        })
        .collect();

    Ok(UserSummaryRecord {
        registered_users: aggregated.registered_users,
        app_opens: aggregated.app_opens,
        devices,
    })
}
