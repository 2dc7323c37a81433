use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::analyzed::AnalyzedSummary;
use crate::domain::error::Result;
use crate::domain::headings::HeadingsType;
use crate::domain::selection::Selection;
use crate::domain::table::{Table, TableId};
use crate::infrastructure::headings_dictionary::{normalize_column_path, HeadingDictionary};

pub type ColumnHeadings = BTreeMap<String, String>;

/// Computes display names of table columns for a heading style.
#[derive(Clone)]
pub struct ColumnHeadingResolver {
    dictionary: Arc<HeadingDictionary>,
}

impl ColumnHeadingResolver {
    pub fn new(dictionary: Arc<HeadingDictionary>) -> Self {
        Self { dictionary }
    }

    /// Headings of one table. Empty under the OCDS style.
    pub fn resolve(
        &self,
        headings_type: HeadingsType,
        table: &Table,
        summary: &AnalyzedSummary,
    ) -> Result<ColumnHeadings> {
        let spec = summary.table(&table.name)?;
        if headings_type.is_ocds() {
            return Ok(ColumnHeadings::new());
        }

        let locale = headings_type.locale();
        Ok(spec
            .column_names(table.split)
            .into_iter()
            .map(|column| {
                let pattern = normalize_column_path(column);
                let label = self.dictionary.lookup(locale, &pattern).unwrap_or(column);
                (column.to_string(), headings_type.format_label(label))
            })
            .collect())
    }

    /// Headings for a table and every array table it owns, split or not,
    /// so stored headings always follow the current style.
    pub fn resolve_tree(
        &self,
        headings_type: HeadingsType,
        table: &Table,
        summary: &AnalyzedSummary,
    ) -> Result<Vec<(TableId, ColumnHeadings)>> {
        table
            .walk()
            .into_iter()
            .map(|owned| Ok((owned.id, self.resolve(headings_type, owned, summary)?)))
            .collect()
    }

    /// Resolve every table of the selection under `headings_type` without
    /// touching it, so a failure leaves the selection unchanged.
    pub fn resolve_selection(
        &self,
        headings_type: HeadingsType,
        selection: &Selection,
        summary: &AnalyzedSummary,
    ) -> Result<Vec<(TableId, ColumnHeadings)>> {
        let mut resolved = Vec::new();
        for table in &selection.tables {
            resolved.extend(self.resolve_tree(headings_type, table, summary)?);
        }
        Ok(resolved)
    }
}

/// Write resolved headings back onto the tables they belong to.
pub fn apply_headings<I>(tables: &mut [Table], resolved: I)
where
    I: IntoIterator<Item = (TableId, ColumnHeadings)>,
{
    for (id, headings) in resolved {
        if let Some(table) = tables.iter_mut().find_map(|table| table.find_mut(id)) {
            table.column_headings = headings;
        }
    }
}
