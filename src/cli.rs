use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::{Category, EntityLevel};

#[derive(Parser, Debug)]
#[command(
    name = "fintel",
    version,
    about = "Local quarterly financial telemetry ingestion and query tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Ingest(IngestArgs),
    Query(QueryArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    #[arg(long, default_value = ".cache/fintel")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    #[arg(long, default_value = ".cache/fintel")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub ingest_manifest_path: Option<PathBuf>,

    /// Restrict the load to the named categories; all nine when empty.
    #[arg(long = "category", value_enum)]
    pub categories: Vec<Category>,

    #[arg(long, value_enum, default_value_t = ErrorPolicy::Skip)]
    pub on_error: ErrorPolicy,
}

/// Policy for files that fail period extraction or document parsing.
/// Storage errors always abort the category regardless of this setting.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ErrorPolicy {
    Skip,
    Abort,
}

impl ErrorPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReportView {
    /// Distinct years present in aggregated_transaction.
    Years,
    /// Distinct transaction categories.
    Categories,
    /// Distinct (year, quarter) pairs present in top_user.
    Periods,
    /// Per-quarter transaction totals by category for one year.
    CategoryTrends,
    /// Per-quarter transaction totals by region for one year.
    RegionTrends,
    /// Insurance policy and premium totals per period over a year range.
    InsuranceGrowth,
    /// Insurance totals per region over a year range.
    InsuranceRegions,
    /// Highest-value entities of one level across all periods.
    TopLocations,
    /// Top user-registration entities for one period.
    TopUsers,
    /// Registered-user share by device brand.
    DeviceShare,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[arg(long, default_value = ".cache/fintel")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub view: ReportView,

    #[arg(long)]
    pub year: Option<u16>,

    #[arg(long)]
    pub quarter: Option<u8>,

    #[arg(long)]
    pub from_year: Option<u16>,

    #[arg(long)]
    pub to_year: Option<u16>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum)]
    pub entity_level: Option<EntityLevel>,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/fintel")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
