use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::cli::{QueryArgs, ReportView};

use super::output::write_rows;
use super::views;

pub fn run(args: QueryArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("fintel_warehouse.sqlite"));

    let connection = Connection::open_with_flags(
        &db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))?;

    let limit = args.limit.max(1);

    let returned = match args.view {
        ReportView::Years => {
            let rows = views::distinct_years(&connection)?;
            write_rows("years", &rows, args.json)?;
            rows.len()
        }
        ReportView::Categories => {
            let rows = views::distinct_categories(&connection)?;
            write_rows("categories", &rows, args.json)?;
            rows.len()
        }
        ReportView::Periods => {
            let rows = views::distinct_periods(&connection)?;
            write_rows("periods", &rows, args.json)?;
            rows.len()
        }
        ReportView::CategoryTrends => {
            let Some(year) = args.year else {
                bail!("--view category-trends requires --year");
            };
            let rows = views::category_trends(&connection, year, args.category.as_deref())?;
            write_rows("category-trends", &rows, args.json)?;
            rows.len()
        }
        ReportView::RegionTrends => {
            let Some(year) = args.year else {
                bail!("--view region-trends requires --year");
            };
            let rows = views::region_trends(&connection, year)?;
            write_rows("region-trends", &rows, args.json)?;
            rows.len()
        }
        ReportView::InsuranceGrowth => {
            let (from_year, to_year) = resolve_year_range(&connection, &args)?;
            let rows = views::insurance_growth(&connection, from_year, to_year)?;
            write_rows("insurance-growth", &rows, args.json)?;
            rows.len()
        }
        ReportView::InsuranceRegions => {
            let (from_year, to_year) = resolve_year_range(&connection, &args)?;
            let rows = views::insurance_regions(&connection, from_year, to_year)?;
            write_rows("insurance-regions", &rows, args.json)?;
            rows.len()
        }
        ReportView::TopLocations => {
            let Some(entity_level) = args.entity_level else {
                bail!("--view top-locations requires --entity-level");
            };
            let rows = views::top_locations(&connection, entity_level, limit)?;
            write_rows("top-locations", &rows, args.json)?;
            rows.len()
        }
        ReportView::TopUsers => {
            let (Some(year), Some(quarter)) = (args.year, args.quarter) else {
                bail!("--view top-users requires --year and --quarter");
            };
            let rows = views::top_users(&connection, year, quarter, limit)?;
            write_rows("top-users", &rows, args.json)?;
            rows.len()
        }
        ReportView::DeviceShare => {
            let rows = views::device_share(&connection, args.year)?;
            write_rows("device-share", &rows, args.json)?;
            rows.len()
        }
    };

    info!(view = ?args.view, returned, "query completed");

    Ok(())
}

/// Year-range views fall back to the full span present in the insurance
/// relation when no explicit range is given.
fn resolve_year_range(connection: &Connection, args: &QueryArgs) -> Result<(u16, u16)> {
    let (from_year, to_year) = match (args.from_year, args.to_year) {
        (Some(from_year), Some(to_year)) => (from_year, to_year),
        _ => {
            let bounds: (Option<i64>, Option<i64>) = connection
                .query_row(
                    "SELECT MIN(year), MAX(year) FROM aggregated_insurance",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .context("failed to resolve year bounds")?;

            let (Some(min_year), Some(max_year)) = bounds else {
                bail!("aggregated_insurance is empty; pass --from-year and --to-year");
            };

            let min_year = u16::try_from(min_year).context("stored year out of range")?;
            let max_year = u16::try_from(max_year).context("stored year out of range")?;
            (
                args.from_year.unwrap_or(min_year),
                args.to_year.unwrap_or(max_year),
            )
        }
    };

    if from_year > to_year {
        bail!("--from-year must not exceed --to-year");
    }

    Ok((from_year, to_year))
}
