use crate::domain::analyzed::{AnalyzedSummary, TableSpec};
use crate::domain::available_table::{
    ArrayStats, AvailableData, AvailableTable, ColumnAvailability, ROOT_TABLES,
};

/// Root tables with data, in `ROOT_TABLES` order, plus the root names without data.
pub fn retrieve_tables(summary: &AnalyzedSummary) -> (Vec<AvailableTable>, Vec<String>) {
    let mut available = Vec::new();
    let mut unavailable = Vec::new();

    for key in ROOT_TABLES {
        match summary.tables.get(key) {
            Some(spec) if spec.total_rows > 0 => available.push(describe(key, spec)),
            _ => unavailable.push(key.to_string()),
        }
    }

    (available, unavailable)
}

fn describe(key: &str, spec: &TableSpec) -> AvailableTable {
    let arrays_count = spec.arrays.values().filter(|count| **count > 0).count();
    let available_columns = spec.columns.values().filter(|col| col.hits > 0).count();

    AvailableTable {
        name: spec.display_name(key).to_string(),
        rows: spec.total_rows,
        arrays: ArrayStats {
            count: arrays_count,
        },
        available_data: AvailableData {
            columns: ColumnAvailability {
                additional: spec.additional_columns.len(),
                total: spec.columns.len(),
                available: available_columns,
            },
        },
    }
}
