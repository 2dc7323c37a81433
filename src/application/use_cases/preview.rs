use std::fs;
use std::path::PathBuf;

use tracing::{debug, error};

use crate::domain::analyzed::{AnalyzedSummary, Row, TableSpec};
use crate::domain::datasource::DataSourceId;
use crate::domain::error::{AppError, Result};
use crate::domain::preview::{PreviewVariant, TablePreview};
use crate::domain::selection::Selection;
use crate::domain::table::Table;
use crate::infrastructure::csv::CsvPreviewWriter;
use crate::infrastructure::storage::{ensure_datasource_preview_dir, preview_path};

/// Renders table previews as CSV and caches them per data source.
pub struct PreviewMaterializer {
    preview_root: PathBuf,
    writer: CsvPreviewWriter,
}

fn rows_for(spec: &TableSpec, variant: PreviewVariant) -> &[Row] {
    match variant {
        PreviewVariant::Split | PreviewVariant::ArrayTable => &spec.preview_rows,
        PreviewVariant::Combined => &spec.preview_rows_combined,
    }
}

impl PreviewMaterializer {
    pub fn new(preview_root: PathBuf) -> Self {
        Self {
            preview_root,
            writer: CsvPreviewWriter::new(),
        }
    }

    /// Path of the cached preview, writing it first if it does not exist yet.
    pub fn materialize(
        &self,
        datasource_id: DataSourceId,
        table_name: &str,
        variant: PreviewVariant,
        summary: &AnalyzedSummary,
    ) -> Result<PathBuf> {
        let spec = summary.table(table_name)?;
        let path = preview_path(&self.preview_root, datasource_id, table_name, variant);
        if path.is_file() {
            return Ok(path);
        }

        ensure_datasource_preview_dir(&self.preview_root, datasource_id).map_err(|e| {
            error!(
                error = %e,
                datasource_id = %datasource_id,
                "Failed to create preview directory"
            );
            AppError::IoError(format!("Failed to create preview directory: {}", e))
        })?;
        self.writer.write_file(&path, rows_for(spec, variant))?;
        debug!(table = %table_name, path = %path.display(), "Materialized preview");
        Ok(path)
    }

    /// Materialize previews of the given array tables, as done right after a split.
    pub fn materialize_array_tables(
        &self,
        datasource_id: DataSourceId,
        parent: &Table,
        summary: &AnalyzedSummary,
    ) -> Result<()> {
        for child in &parent.array_tables {
            self.materialize(datasource_id, &child.name, PreviewVariant::ArrayTable, summary)?;
        }
        Ok(())
    }

    /// Previews of a table and, when it is split, of its included array tables.
    pub fn table_previews(
        &self,
        datasource_id: DataSourceId,
        selection: &Selection,
        table: &Table,
        summary: &AnalyzedSummary,
    ) -> Result<Vec<TablePreview>> {
        let with_headings = !selection.headings_type.is_ocds();
        let is_root = selection.tables.iter().any(|root| root.id == table.id);
        let variant = if is_root {
            PreviewVariant::for_root(table.split)
        } else {
            PreviewVariant::ArrayTable
        };

        let mut previews = vec![self.preview(datasource_id, table, variant, summary, with_headings)?];
        if table.split {
            for child in table.array_tables.iter().filter(|child| child.include) {
                previews.push(self.preview(
                    datasource_id,
                    child,
                    PreviewVariant::ArrayTable,
                    summary,
                    with_headings,
                )?);
            }
        }
        Ok(previews)
    }

    fn preview(
        &self,
        datasource_id: DataSourceId,
        table: &Table,
        variant: PreviewVariant,
        summary: &AnalyzedSummary,
        with_headings: bool,
    ) -> Result<TablePreview> {
        let path = self.materialize(datasource_id, &table.name, variant, summary)?;
        let preview = fs::read_to_string(&path).map_err(|e| {
            AppError::IoError(format!("Failed to read preview {}: {}", path.display(), e))
        })?;
        let spec = summary.table(&table.name)?;

        Ok(TablePreview {
            id: table.id,
            name: format!("{}.csv", spec.display_name(&table.name)),
            preview,
            headings: with_headings.then(|| table.column_headings.clone()),
        })
    }
}
