use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::model::EntityLevel;

use super::output::TextRow;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct YearRow {
    pub year: i64,
}

impl TextRow for YearRow {
    fn text_line(&self) -> String {
        self.year.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategoryRow {
    pub category: String,
}

impl TextRow for CategoryRow {
    fn text_line(&self) -> String {
        self.category.clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PeriodRow {
    pub year: i64,
    pub quarter: i64,
}

impl TextRow for PeriodRow {
    fn text_line(&self) -> String {
        format!("{} Q{}", self.year, self.quarter)
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategoryTrendRow {
    pub quarter: i64,
    pub category: String,
    pub total_count: i64,
    pub total_amount: f64,
}

impl TextRow for CategoryTrendRow {
    fn text_line(&self) -> String {
        format!(
            "Q{}\t{}\tcount={}\tamount={:.2}",
            self.quarter, self.category, self.total_count, self.total_amount
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegionTrendRow {
    pub quarter: i64,
    pub region: String,
    pub total_count: i64,
    pub total_amount: f64,
}

impl TextRow for RegionTrendRow {
    fn text_line(&self) -> String {
        format!(
            "Q{}\t{}\tcount={}\tamount={:.2}",
            self.quarter, self.region, self.total_count, self.total_amount
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct InsuranceGrowthRow {
    pub year: i64,
    pub quarter: i64,
    pub total_policies: i64,
    pub total_premium: f64,
}

impl TextRow for InsuranceGrowthRow {
    fn text_line(&self) -> String {
        format!(
            "{} Q{}\tpolicies={}\tpremium={:.2}",
            self.year, self.quarter, self.total_policies, self.total_premium
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct InsuranceRegionRow {
    pub region: String,
    pub total_policies: i64,
    pub total_premium: f64,
}

impl TextRow for InsuranceRegionRow {
    fn text_line(&self) -> String {
        format!(
            "{}\tpolicies={}\tpremium={:.2}",
            self.region, self.total_policies, self.total_premium
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TopLocationRow {
    pub entity_name: String,
    pub total_count: i64,
    pub total_amount: f64,
}

impl TextRow for TopLocationRow {
    fn text_line(&self) -> String {
        format!(
            "{}\tcount={}\tamount={:.2}",
            self.entity_name, self.total_count, self.total_amount
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TopUserRow {
    pub entity_level: String,
    pub entity_name: String,
    pub total_users: i64,
}

impl TextRow for TopUserRow {
    fn text_line(&self) -> String {
        format!(
            "{}\t{}\tusers={}",
            self.entity_level, self.entity_name, self.total_users
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeviceShareRow {
    pub brand: String,
    pub total_count: i64,
    pub mean_percentage: f64,
}

impl TextRow for DeviceShareRow {
    fn text_line(&self) -> String {
        format!(
            "{}\tcount={}\tshare={:.4}",
            self.brand, self.total_count, self.mean_percentage
        )
    }
}

pub(crate) fn distinct_years(connection: &Connection) -> Result<Vec<YearRow>> {
    let mut statement = connection
        .prepare("SELECT DISTINCT year FROM aggregated_transaction ORDER BY year")
        .context("failed to prepare distinct-years query")?;

    let rows = statement
        .query_map([], |row| Ok(YearRow { year: row.get(0)? }))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn distinct_categories(connection: &Connection) -> Result<Vec<CategoryRow>> {
    let mut statement = connection
        .prepare("SELECT DISTINCT category FROM aggregated_transaction ORDER BY category")
        .context("failed to prepare distinct-categories query")?;

    let rows = statement
        .query_map([], |row| {
            Ok(CategoryRow {
                category: row.get(0)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn distinct_periods(connection: &Connection) -> Result<Vec<PeriodRow>> {
    let mut statement = connection
        .prepare("SELECT DISTINCT year, quarter FROM top_user ORDER BY year, quarter")
        .context("failed to prepare distinct-periods query")?;

    let rows = statement
        .query_map([], |row| {
            Ok(PeriodRow {
                year: row.get(0)?,
                quarter: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn category_trends(
    connection: &Connection,
    year: u16,
    category: Option<&str>,
) -> Result<Vec<CategoryTrendRow>> {
    let mut statement = connection
        .prepare(
            "SELECT quarter, category,
                    SUM(count) AS total_count,
                    SUM(amount) AS total_amount
             FROM aggregated_transaction
             WHERE year = ?1
               AND (?2 IS NULL OR category = ?2)
             GROUP BY quarter, category
             ORDER BY quarter, category",
        )
        .context("failed to prepare category-trends query")?;

    let rows = statement
        .query_map(params![i64::from(year), category], |row| {
            Ok(CategoryTrendRow {
                quarter: row.get(0)?,
                category: row.get(1)?,
                total_count: row.get(2)?,
                total_amount: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn region_trends(connection: &Connection, year: u16) -> Result<Vec<RegionTrendRow>> {
    let mut statement = connection
        .prepare(
            "SELECT quarter, name,
                    SUM(count) AS total_count,
                    SUM(amount) AS total_amount
             FROM map_transaction_hover
             WHERE year = ?1
             GROUP BY quarter, name
             ORDER BY quarter, name",
        )
        .context("failed to prepare region-trends query")?;

    let rows = statement
        .query_map(params![i64::from(year)], |row| {
            Ok(RegionTrendRow {
                quarter: row.get(0)?,
                region: row.get(1)?,
                total_count: row.get(2)?,
                total_amount: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn insurance_growth(
    connection: &Connection,
    from_year: u16,
    to_year: u16,
) -> Result<Vec<InsuranceGrowthRow>> {
    let mut statement = connection
        .prepare(
            "SELECT year, quarter,
                    SUM(count) AS total_policies,
                    SUM(amount) AS total_premium
             FROM aggregated_insurance
             WHERE year BETWEEN ?1 AND ?2
             GROUP BY year, quarter
             ORDER BY year, quarter",
        )
        .context("failed to prepare insurance-growth query")?;

    let rows = statement
        .query_map(params![i64::from(from_year), i64::from(to_year)], |row| {
            Ok(InsuranceGrowthRow {
                year: row.get(0)?,
                quarter: row.get(1)?,
                total_policies: row.get(2)?,
                total_premium: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn insurance_regions(
    connection: &Connection,
    from_year: u16,
    to_year: u16,
) -> Result<Vec<InsuranceRegionRow>> {
    let mut statement = connection
        .prepare(
            "SELECT name,
                    SUM(count) AS total_policies,
                    SUM(amount) AS total_premium
             FROM map_insurance_hover
             WHERE year BETWEEN ?1 AND ?2
             GROUP BY name
             ORDER BY total_policies DESC",
        )
        .context("failed to prepare insurance-regions query")?;

    let rows = statement
        .query_map(params![i64::from(from_year), i64::from(to_year)], |row| {
            Ok(InsuranceRegionRow {
                region: row.get(0)?,
                total_policies: row.get(1)?,
                total_premium: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn top_locations(
    connection: &Connection,
    entity_level: EntityLevel,
    limit: usize,
) -> Result<Vec<TopLocationRow>> {
    let mut statement = connection
        .prepare(
            "SELECT entity_name,
                    SUM(count) AS total_count,
                    SUM(amount) AS total_amount
             FROM top_transaction
             WHERE entity_level = ?1
             GROUP BY entity_name
             ORDER BY total_amount DESC
             LIMIT ?2",
        )
        .context("failed to prepare top-locations query")?;

    let rows = statement
        .query_map(params![entity_level.as_str(), limit as i64], |row| {
            Ok(TopLocationRow {
                entity_name: row.get(0)?,
                total_count: row.get(1)?,
                total_amount: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn top_users(
    connection: &Connection,
    year: u16,
    quarter: u8,
    limit: usize,
) -> Result<Vec<TopUserRow>> {
    let mut statement = connection
        .prepare(
            "SELECT entity_level, entity_name,
                    SUM(registered_users) AS total_users
             FROM top_user
             WHERE year = ?1 AND quarter = ?2
             GROUP BY entity_level, entity_name
             ORDER BY total_users DESC
             LIMIT ?3",
        )
        .context("failed to prepare top-users query")?;

    let rows = statement
        .query_map(
            params![i64::from(year), i64::from(quarter), limit as i64],
            |row| {
                Ok(TopUserRow {
                    entity_level: row.get(0)?,
                    entity_name: row.get(1)?,
                    total_users: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn device_share(
    connection: &Connection,
    year: Option<u16>,
) -> Result<Vec<DeviceShareRow>> {
    let mut statement = connection
        .prepare(
            "SELECT d.brand,
                    SUM(d.count) AS total_count,
                    AVG(d.percentage) AS mean_percentage
             FROM aggregated_user_device d
             JOIN aggregated_user u ON u.id = d.user_id
             WHERE (?1 IS NULL OR u.year = ?1)
             GROUP BY d.brand
             ORDER BY total_count DESC",
        )
        .context("failed to prepare device-share query")?;

    let rows = statement
        .query_map(params![year.map(i64::from)], |row| {
            Ok(DeviceShareRow {
                brand: row.get(0)?,
                total_count: row.get(1)?,
                mean_percentage: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
