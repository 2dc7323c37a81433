use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::available_table::AvailableTable;
use crate::domain::selection::SelectionId;

pub type DataSourceId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Upload,
    Url,
}

/// A dataset file together with its analyzed summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: DataSourceId,
    pub kind: DataSourceKind,
    pub url: Option<String>,
    pub analyzed_data_url: Option<String>,
    pub data_file: PathBuf,
    pub analyzed_file: PathBuf,
    pub available_tables: Vec<AvailableTable>,
    pub unavailable_tables: Vec<String>,
    pub selections: Vec<SelectionId>,
    pub created_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

/// Input for registering a data source.
#[derive(Debug, Clone)]
pub struct NewDataSource {
    pub kind: DataSourceKind,
    pub url: Option<String>,
    pub analyzed_data_url: Option<String>,
    pub data_file: PathBuf,
    pub analyzed_file: PathBuf,
}
