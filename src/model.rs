use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One of the nine source document shapes, each feeding its own relation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    MapTransactionHover,
    MapUserHover,
    MapInsuranceHover,
    AggregatedTransaction,
    AggregatedUser,
    AggregatedInsurance,
    TopTransaction,
    TopInsurance,
    TopUser,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::MapTransactionHover,
        Category::MapUserHover,
        Category::MapInsuranceHover,
        Category::AggregatedTransaction,
        Category::AggregatedUser,
        Category::AggregatedInsurance,
        Category::TopTransaction,
        Category::TopInsurance,
        Category::TopUser,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::MapTransactionHover => "map/transaction/hover",
            Self::MapUserHover => "map/user/hover",
            Self::MapInsuranceHover => "map/insurance/hover",
            Self::AggregatedTransaction => "aggregated/transaction",
            Self::AggregatedUser => "aggregated/user",
            Self::AggregatedInsurance => "aggregated/insurance",
            Self::TopTransaction => "top/transaction",
            Self::TopInsurance => "top/insurance",
            Self::TopUser => "top/user",
        }
    }

    /// Location of this category's document tree below the data root.
    pub fn relative_root(self) -> &'static str {
        self.label()
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::MapTransactionHover => "map_transaction_hover",
            Self::MapUserHover => "map_user_hover",
            Self::MapInsuranceHover => "map_insurance_hover",
            Self::AggregatedTransaction => "aggregated_transaction",
            Self::AggregatedUser => "aggregated_user",
            Self::AggregatedInsurance => "aggregated_insurance",
            Self::TopTransaction => "top_transaction",
            Self::TopInsurance => "top_insurance",
            Self::TopUser => "top_user",
        }
    }
}

/// Granularity of a geographic rollup in the "top" categories.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityLevel {
    State,
    District,
    Pincode,
}

impl EntityLevel {
    /// Maps a plural section name from the document body to its level.
    /// Only the three known plural forms are accepted.
    pub fn from_plural(label: &str) -> Option<Self> {
        match label {
            "states" => Some(Self::State),
            "districts" => Some(Self::District),
            "pincodes" => Some(Self::Pincode),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::District => "district",
            Self::Pincode => "pincode",
        }
    }
}

/// A (year, quarter) pair derived from a document's path position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Period {
    pub year: u16,
    pub quarter: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverMetricRecord {
    pub name: String,
    pub metric_type: String,
    pub count: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserHoverRecord {
    pub name: String,
    pub registered_users: i64,
    pub app_opens: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentRecord {
    pub from_ts: Option<i64>,
    pub to_ts: Option<i64>,
    pub category: String,
    pub instrument_type: String,
    pub count: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSummaryRecord {
    pub registered_users: i64,
    pub app_opens: i64,
    pub devices: Vec<DeviceRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub brand: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopEntryRecord {
    pub entity_level: EntityLevel,
    pub entity_name: String,
    pub metric_type: String,
    pub count: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopUserRecord {
    pub entity_level: EntityLevel,
    pub entity_name: String,
    pub registered_users: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub category: Category,
    pub path: String,
    pub year: u16,
    pub quarter: u8,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub data_root: String,
    pub document_count: usize,
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLoadSummary {
    pub category: String,
    pub files_seen: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub rows_inserted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestPaths {
    pub data_root: String,
    pub manifest_dir: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub on_error: String,
    pub paths: IngestPaths,
    pub categories: Vec<CategoryLoadSummary>,
    pub rows_inserted_total: usize,
    pub files_skipped_total: usize,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
