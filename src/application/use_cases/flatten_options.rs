use crate::domain::analyzed::AnalyzedSummary;
use crate::domain::error::{AppError, Result};
use crate::domain::flatten_options::{FlattenOptions, TableOptions};
use crate::domain::selection::Selection;
use crate::domain::table::Table;

/// Fail with `MissingTable` if a table the options would mention is absent
/// from the analyzed summary. Array tables count only under an included,
/// split root.
pub fn validate_selection_tables(selection: &Selection, summary: &AnalyzedSummary) -> Result<()> {
    for table in &selection.tables {
        let mut visited = vec![table];
        if table.include && table.split {
            visited.extend(&table.array_tables);
        }
        if let Some(missing) = visited.into_iter().find(|t| !summary.contains(&t.name)) {
            return Err(AppError::MissingTable(missing.name.clone()));
        }
    }
    Ok(())
}

/// Translate the selection's include/split/heading decisions into the
/// configuration of the flattening engine.
pub fn build_flatten_options(
    selection: &Selection,
    summary: &AnalyzedSummary,
) -> Result<FlattenOptions> {
    validate_selection_tables(selection, summary)?;

    let mut options = FlattenOptions::default();
    for table in &selection.tables {
        if !add_table(&mut options, table) {
            continue;
        }
        if table.split {
            for child in &table.array_tables {
                add_table(&mut options, child);
            }
        }
    }
    Ok(options)
}

/// Returns false when the table is excluded.
fn add_table(options: &mut FlattenOptions, table: &Table) -> bool {
    if !table.include {
        options.exclude.push(table.name.clone());
        return false;
    }
    options.selection.insert(
        table.name.clone(),
        TableOptions {
            split: table.split,
            headers: (!table.column_headings.is_empty()).then(|| table.column_headings.clone()),
            name: table.heading.clone(),
        },
    );
    true
}
