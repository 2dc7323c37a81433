// ============================================================
// ANALYZED DATA SUMMARY
// ============================================================
// Read-only view of the analysis engine output

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::domain::error::{AppError, Result};

/// One preview row: column name to value, in the order the analysis produced them.
pub type Row = Map<String, Value>;

/// Per-column statistics. Only `hits` is interpreted, the rest is carried as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnStats {
    #[serde(default)]
    pub hits: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Description of one derived table inside the analyzed summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub total_rows: u64,

    /// Array path to number of rows it contributes
    #[serde(default)]
    pub arrays: BTreeMap<String, u64>,

    /// Columns of the table when its arrays are split out
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnStats>,

    #[serde(default)]
    pub additional_columns: BTreeMap<String, Value>,

    /// Columns of the table with arrays combined inline
    #[serde(default)]
    pub combined_columns: BTreeMap<String, Value>,

    /// Child (array) tables, in the order the analysis discovered them
    #[serde(default)]
    pub child_tables: Vec<String>,

    #[serde(default)]
    pub preview_rows: Vec<Row>,

    #[serde(default)]
    pub preview_rows_combined: Vec<Row>,
}

impl TableSpec {
    /// Display name of the table, falling back to its key in the summary.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        if self.name.is_empty() {
            key
        } else {
            &self.name
        }
    }

    /// Column names used for headings: split tables expose `columns`, combined ones `combined_columns`.
    pub fn column_names(&self, split: bool) -> Vec<&str> {
        if split {
            self.columns.keys().map(String::as_str).collect()
        } else {
            self.combined_columns.keys().map(String::as_str).collect()
        }
    }
}

/// Output of the analysis engine for one dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedSummary {
    #[serde(default)]
    pub tables: HashMap<String, TableSpec>,
}

impl AnalyzedSummary {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| AppError::ParseError(format!("Invalid analyzed data: {}", e)))
    }

    /// Look a table up by name, failing with `MissingTable` when absent.
    pub fn table(&self, name: &str) -> Result<&TableSpec> {
        self.tables
            .get(name)
            .ok_or_else(|| AppError::MissingTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
