use serde::{Deserialize, Serialize};

/// Root tables recognised in analyzed data, in presentation order.
pub const ROOT_TABLES: [&str; 5] = ["tenders", "awards", "contracts", "planning", "parties"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayStats {
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAvailability {
    pub additional: usize,
    pub total: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableData {
    pub columns: ColumnAvailability,
}

/// Summary statistics of a root table that has data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTable {
    pub name: String,
    pub rows: u64,
    pub arrays: ArrayStats,
    pub available_data: AvailableData,
}
