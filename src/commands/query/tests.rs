use rusqlite::{Connection, params};

use crate::commands::ingest::ensure_schema;
use crate::model::EntityLevel;

use super::views;

fn seeded_db() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    ensure_schema(&connection).unwrap();

    let transactions = [
        (2022, 1, "Merchant payments", "TOTAL", 100, 1000.0),
        (2022, 1, "Peer-to-peer payments", "TOTAL", 50, 2500.0),
        (2022, 2, "Merchant payments", "TOTAL", 120, 1400.0),
        (2023, 1, "Merchant payments", "TOTAL", 300, 9000.0),
    ];
    for (year, quarter, category, instrument, count, amount) in transactions {
        connection
            .execute(
                "INSERT INTO aggregated_transaction
                 (year, quarter, category, instrument_type, count, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![year, quarter, category, instrument, count, amount],
            )
            .unwrap();
    }

    let insurance = [
        (2021, 4, 10, 500.0),
        (2022, 1, 20, 900.0),
        (2022, 2, 25, 1100.0),
    ];
    for (year, quarter, count, amount) in insurance {
        connection
            .execute(
                "INSERT INTO aggregated_insurance
                 (year, quarter, category, instrument_type, count, amount)
                 VALUES (?1, ?2, 'Insurance', 'TOTAL', ?3, ?4)",
                params![year, quarter, count, amount],
            )
            .unwrap();
    }

    let top_entries = [
        (2022, 1, "state", "alpha", 40, 400.0),
        (2022, 1, "state", "beta", 10, 900.0),
        (2022, 1, "district", "alpha east", 5, 50.0),
        (2022, 2, "state", "alpha", 60, 600.0),
    ];
    for (year, quarter, level, name, count, amount) in top_entries {
        connection
            .execute(
                "INSERT INTO top_transaction
                 (year, quarter, entity_level, entity_name, metric_type, count, amount)
                 VALUES (?1, ?2, ?3, ?4, 'TOTAL', ?5, ?6)",
                params![year, quarter, level, name, count, amount],
            )
            .unwrap();
    }

    let top_user_entries = [
        (2022, 1, "state", "alpha", 700),
        (2022, 1, "district", "alpha east", 300),
        (2022, 2, "state", "alpha", 850),
    ];
    for (year, quarter, level, name, users) in top_user_entries {
        connection
            .execute(
                "INSERT INTO top_user
                 (year, quarter, entity_level, entity_name, registered_users)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![year, quarter, level, name, users],
            )
            .unwrap();
    }

    connection
        .execute(
            "INSERT INTO aggregated_user (id, year, quarter, registered_users, app_opens)
             VALUES (1, 2022, 1, 1000, 30000), (2, 2023, 1, 1500, 42000)",
            [],
        )
        .unwrap();
    connection
        .execute(
            "INSERT INTO aggregated_user_device (user_id, brand, count, percentage)
             VALUES (1, 'Xiaomi', 400, 0.4),
                    (1, 'Samsung', 250, 0.25),
                    (2, 'Xiaomi', 700, 0.5)",
            [],
        )
        .unwrap();

    connection
}

#[test]
fn category_trends_filters_by_bound_year() {
    let connection = seeded_db();

    let rows = views::category_trends(&connection, 2022, None).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.quarter == 1 || row.quarter == 2));

    let rows = views::category_trends(&connection, 2023, None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_count, 300);
}

#[test]
fn category_trends_applies_optional_category_filter() {
    let connection = seeded_db();

    let rows = views::category_trends(&connection, 2022, Some("Merchant payments")).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.category == "Merchant payments"));

    let rows = views::category_trends(&connection, 2022, Some("Unknown")).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn insurance_growth_sums_within_year_range() {
    let connection = seeded_db();

    let rows = views::insurance_growth(&connection, 2022, 2022).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].total_policies, 20);
    assert_eq!(rows[1].total_premium, 1100.0);

    let rows = views::insurance_growth(&connection, 2021, 2022).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].year, 2021);
}

#[test]
fn top_locations_binds_entity_level() {
    let connection = seeded_db();

    let rows = views::top_locations(&connection, EntityLevel::State, 10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].entity_name, "alpha");
    assert_eq!(rows[0].total_amount, 1000.0);

    let rows = views::top_locations(&connection, EntityLevel::Pincode, 10).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn top_users_scopes_to_one_period() {
    let connection = seeded_db();

    let rows = views::top_users(&connection, 2022, 1, 10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].entity_name, "alpha");
    assert_eq!(rows[0].total_users, 700);

    let rows = views::top_users(&connection, 2022, 1, 1).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn distinct_lookups_populate_selection_controls() {
    let connection = seeded_db();

    let years: Vec<i64> = views::distinct_years(&connection)
        .unwrap()
        .into_iter()
        .map(|row| row.year)
        .collect();
    assert_eq!(years, vec![2022, 2023]);

    let categories = views::distinct_categories(&connection).unwrap();
    assert_eq!(categories.len(), 2);

    let periods = views::distinct_periods(&connection).unwrap();
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0].year, 2022);
    assert_eq!(periods[0].quarter, 1);
}

#[test]
fn device_share_joins_parent_period() {
    let connection = seeded_db();

    let rows = views::device_share(&connection, None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].brand, "Xiaomi");
    assert_eq!(rows[0].total_count, 1100);

    let rows = views::device_share(&connection, Some(2022)).unwrap();
    assert_eq!(rows.len(), 2);
    let xiaomi = rows.iter().find(|row| row.brand == "Xiaomi").unwrap();
    assert_eq!(xiaomi.total_count, 400);
}
