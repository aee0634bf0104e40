use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::cli::ErrorPolicy;
use crate::error::LoadError;
use crate::model::{Category, EntityLevel};

use super::db_setup::ensure_schema;
use super::run::load_category;
use super::walker::{discover_documents, extract_period, year_pattern};
use super::{aggregated, map, top};

fn memory_db() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    ensure_schema(&connection).unwrap();
    connection
}

fn row_count(connection: &Connection, table: &str) -> i64 {
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
}

fn write_doc(root: &Path, year: &str, quarter: &str, body: &str) {
    let dir = root.join(year);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{quarter}.json")), body).unwrap();
}

const HOVER_DOC: &str = r#"{
  "success": true,
  "data": {
    "hoverDataList": [
      {"name": "alpha", "metric": [
        {"type": "TOTAL", "count": 100, "amount": 5000.5},
        {"type": "P2P", "count": 40, "amount": 1200.0}
      ]},
      {"name": "beta", "metric": [
        {"type": "TOTAL", "count": 7, "amount": 310.25},
        {"type": "P2P", "count": 3, "amount": 90.0}
      ]},
      {"name": "gamma", "metric": [
        {"type": "TOTAL", "count": 1, "amount": 12.0},
        {"type": "P2P", "count": 1, "amount": 6.0}
      ]}
    ]
  }
}"#;

#[test]
fn entity_level_from_plural_accepts_exactly_three_forms() {
    assert_eq!(EntityLevel::from_plural("states"), Some(EntityLevel::State));
    assert_eq!(
        EntityLevel::from_plural("districts"),
        Some(EntityLevel::District)
    );
    assert_eq!(
        EntityLevel::from_plural("pincodes"),
        Some(EntityLevel::Pincode)
    );

    assert_eq!(EntityLevel::from_plural("state"), None);
    assert_eq!(EntityLevel::from_plural("countries"), None);
    assert_eq!(EntityLevel::from_plural(""), None);
}

#[test]
fn extract_period_depends_only_on_path_position() {
    let pattern = year_pattern().unwrap();
    let path = Path::new("data/map/transaction/hover/country/india/2023/2.json");

    let period = extract_period(Category::MapTransactionHover, path, &pattern).unwrap();
    assert_eq!(period.year, 2023);
    assert_eq!(period.quarter, 2);

    let same = extract_period(Category::TopUser, path, &pattern).unwrap();
    assert_eq!(same, period);
}

#[test]
fn extract_period_rejects_malformed_names() {
    let pattern = year_pattern().unwrap();

    let bad_year = extract_period(
        Category::TopUser,
        Path::new("data/top/user/latest/1.json"),
        &pattern,
    );
    assert!(matches!(bad_year, Err(LoadError::PathFormat { .. })));

    let bad_stem = extract_period(
        Category::TopUser,
        Path::new("data/top/user/2022/q1.json"),
        &pattern,
    );
    assert!(matches!(bad_stem, Err(LoadError::PathFormat { .. })));

    let bad_quarter = extract_period(
        Category::TopUser,
        Path::new("data/top/user/2022/5.json"),
        &pattern,
    );
    assert!(matches!(bad_quarter, Err(LoadError::PathFormat { .. })));
}

#[test]
fn hover_parser_emits_one_record_per_region_metric_pair() {
    let records = map::parse_transaction_hover(Path::new("2022/1.json"), HOVER_DOC).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].name, "alpha");
    assert_eq!(records[0].metric_type, "TOTAL");
    assert_eq!(records[0].count, 100);
    assert_eq!(records[1].metric_type, "P2P");
}

#[test]
fn hover_parser_flags_missing_section() {
    let no_data = r#"{"success": true}"#;
    let result = map::parse_transaction_hover(Path::new("2022/1.json"), no_data);
    assert!(matches!(result, Err(LoadError::MalformedDocument { .. })));

    let no_list = r#"{"data": {"somethingElse": []}}"#;
    let result = map::parse_insurance_hover(Path::new("2022/1.json"), no_list);
    assert!(matches!(result, Err(LoadError::MalformedDocument { .. })));
}

#[test]
fn user_hover_parser_flattens_region_map() {
    let doc = r#"{
      "data": {
        "hoverData": {
          "alpha": {"registeredUsers": 900, "appOpens": 4000},
          "beta": {"registeredUsers": 30, "appOpens": 120}
        }
      }
    }"#;

    let records = map::parse_user_hover(Path::new("2021/3.json"), doc).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "alpha");
    assert_eq!(records[0].registered_users, 900);
    assert_eq!(records[1].app_opens, 120);
}

#[test]
fn aggregated_parser_carries_optional_window() {
    let with_window = r#"{
      "data": {
        "from": 1640995200000,
        "to": 1648771199000,
        "transactionData": [
          {"name": "Recharge & bill payments", "paymentInstruments": [
            {"type": "TOTAL", "count": 42, "amount": 900.0}
          ]}
        ]
      }
    }"#;

    let records = aggregated::parse_transaction(Path::new("2022/1.json"), with_window).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].from_ts, Some(1640995200000));
    assert_eq!(records[0].to_ts, Some(1648771199000));
    assert_eq!(records[0].category, "Recharge & bill payments");

    let without_window = r#"{
      "data": {
        "transactionData": [
          {"name": "Insurance", "paymentInstruments": [
            {"type": "TOTAL", "count": 5, "amount": 100.0}
          ]}
        ]
      }
    }"#;

    let records = aggregated::parse_insurance(Path::new("2022/1.json"), without_window).unwrap();
    assert_eq!(records[0].from_ts, None);
    assert_eq!(records[0].to_ts, None);
}

#[test]
fn aggregated_user_without_device_breakdown_yields_no_children() {
    let doc = r#"{
      "data": {
        "aggregated": {"registeredUsers": 1000, "appOpens": 25000}
      }
    }"#;

    let record = aggregated::parse_user(Path::new("2020/4.json"), doc).unwrap();
    assert_eq!(record.registered_users, 1000);
    assert_eq!(record.app_opens, 25000);
    assert!(record.devices.is_empty());
}

#[test]
fn aggregated_user_reads_device_breakdown_when_present() {
    let doc = r#"{
      "data": {
        "aggregated": {"registeredUsers": 1000, "appOpens": 25000},
        "usersByDevice": [
          {"brand": "Xiaomi", "count": 400, "percentage": 0.4},
          {"brand": "Samsung", "count": 250, "percentage": 0.25}
        ]
      }
    }"#;

    let record = aggregated::parse_user(Path::new("2020/4.json"), doc).unwrap();
    assert_eq!(record.devices.len(), 2);
    assert_eq!(record.devices[0].brand, "Xiaomi");
    assert_eq!(record.devices[1].count, 250);
}

#[test]
fn top_parser_singularizes_plural_sections() {
    let doc = r#"{
      "data": {
        "states": [{"entityName": "alpha", "metric": {"type": "TOTAL", "count": 9, "amount": 90.0}}],
        "districts": [{"entityName": "beta district", "metric": {"type": "TOTAL", "count": 4, "amount": 40.0}}],
        "pincodes": [{"entityName": "560001", "metric": {"type": "TOTAL", "count": 2, "amount": 20.0}}]
      }
    }"#;

    let records = top::parse_transaction(Path::new("2022/1.json"), doc).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].entity_level, EntityLevel::State);
    assert_eq!(records[1].entity_level, EntityLevel::District);
    assert_eq!(records[2].entity_level, EntityLevel::Pincode);
    assert_eq!(records[2].entity_name, "560001");
}

#[test]
fn top_parser_tolerates_absent_level_sections() {
    let doc = r#"{
      "data": {
        "states": [{"name": "alpha", "registeredUsers": 500}],
        "pincodes": null
      }
    }"#;

    let records = top::parse_user(Path::new("2022/1.json"), doc).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity_level, EntityLevel::State);
    assert_eq!(records[0].registered_users, 500);
}

#[test]
fn top_parser_flags_non_mapping_data_section() {
    let doc = r#"{"success": false, "data": "No data available"}"#;
    let result = top::parse_transaction(Path::new("2022/1.json"), doc);
    assert!(matches!(result, Err(LoadError::MalformedDocument { .. })));
}

#[test]
fn discover_documents_finds_only_json_files() {
    let dir = tempfile::tempdir().unwrap();
    write_doc(dir.path(), "2022", "1", "{}");
    write_doc(dir.path(), "2022", "2", "{}");
    fs::write(dir.path().join("2022").join("notes.txt"), "ignore me").unwrap();

    let documents = discover_documents(dir.path()).unwrap();
    assert_eq!(documents.len(), 2);
}

#[test]
fn load_category_skips_malformed_documents_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let doc = r#"{
      "data": {
        "states": [{"entityName": "alpha", "metric": {"type": "TOTAL", "count": 9, "amount": 90.0}}]
      }
    }"#;
    write_doc(dir.path(), "2022", "1", doc);
    write_doc(dir.path(), "2022", "2", r#"{"data": "No data available"}"#);

    let mut connection = memory_db();
    let outcome = load_category(
        &mut connection,
        Category::TopTransaction,
        dir.path(),
        ErrorPolicy::Skip,
    )
    .unwrap();

    assert_eq!(outcome.summary.files_seen, 2);
    assert_eq!(outcome.summary.files_loaded, 1);
    assert_eq!(outcome.summary.files_skipped, 1);
    assert_eq!(outcome.summary.rows_inserted, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(row_count(&connection, "top_transaction"), 1);
}

#[test]
fn abort_policy_rolls_back_the_whole_category() {
    let dir = tempfile::tempdir().unwrap();
    write_doc(dir.path(), "2022", "1", HOVER_DOC);
    write_doc(dir.path(), "2022", "2", r#"{"success": true}"#);

    let mut connection = memory_db();
    let result = load_category(
        &mut connection,
        Category::MapTransactionHover,
        dir.path(),
        ErrorPolicy::Abort,
    );

    assert!(result.is_err());
    assert_eq!(row_count(&connection, "map_transaction_hover"), 0);
}

#[test]
fn reloading_a_directory_doubles_row_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_doc(dir.path(), "2022", "1", HOVER_DOC);

    let mut connection = memory_db();
    for _ in 0..2 {
        load_category(
            &mut connection,
            Category::MapTransactionHover,
            dir.path(),
            ErrorPolicy::Skip,
        )
        .unwrap();
    }

    assert_eq!(row_count(&connection, "map_transaction_hover"), 12);
}

#[test]
fn two_file_category_root_loads_each_period() {
    let dir = tempfile::tempdir().unwrap();
    let q1 = r#"{
      "data": {
        "hoverDataList": [
          {"name": "alpha", "metric": [{"type": "TOTAL", "count": 10, "amount": 100.0}]}
        ]
      }
    }"#;
    let q2 = r#"{
      "data": {
        "hoverDataList": [
          {"name": "alpha", "metric": [{"type": "TOTAL", "count": 20, "amount": 200.0}]}
        ]
      }
    }"#;
    write_doc(dir.path(), "2022", "1", q1);
    write_doc(dir.path(), "2022", "2", q2);

    let mut connection = memory_db();
    let outcome = load_category(
        &mut connection,
        Category::MapTransactionHover,
        dir.path(),
        ErrorPolicy::Skip,
    )
    .unwrap();

    assert_eq!(outcome.summary.rows_inserted, 2);

    let mut statement = connection
        .prepare(
            "SELECT year, quarter, count, amount FROM map_transaction_hover ORDER BY quarter",
        )
        .unwrap();
    let rows: Vec<(i64, i64, i64, f64)> = statement
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(rows, vec![(2022, 1, 10, 100.0), (2022, 2, 20, 200.0)]);
}

#[test]
fn user_summary_children_follow_their_parent() {
    let dir = tempfile::tempdir().unwrap();
    let q1 = r#"{
      "data": {
        "aggregated": {"registeredUsers": 100, "appOpens": 900},
        "usersByDevice": [
          {"brand": "Xiaomi", "count": 60, "percentage": 0.6},
          {"brand": "Samsung", "count": 40, "percentage": 0.4}
        ]
      }
    }"#;
    let q2 = r#"{
      "data": {
        "aggregated": {"registeredUsers": 150, "appOpens": 1200}
      }
    }"#;
    write_doc(dir.path(), "2021", "1", q1);
    write_doc(dir.path(), "2021", "2", q2);

    let mut connection = memory_db();
    load_category(
        &mut connection,
        Category::AggregatedUser,
        dir.path(),
        ErrorPolicy::Skip,
    )
    .unwrap();

    assert_eq!(row_count(&connection, "aggregated_user"), 2);
    assert_eq!(row_count(&connection, "aggregated_user_device"), 2);

    let parent_quarter: i64 = connection
        .query_row(
            "SELECT DISTINCT u.quarter
             FROM aggregated_user_device d
             JOIN aggregated_user u ON u.id = d.user_id",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(parent_quarter, 1);
}
