use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::application::use_cases::column_headings::{apply_headings, ColumnHeadingResolver};
use crate::application::use_cases::flatten_options::build_flatten_options;
use crate::application::use_cases::preview::PreviewMaterializer;
use crate::domain::analyzed::AnalyzedSummary;
use crate::domain::datasource::{DataSource, DataSourceId};
use crate::domain::error::{AppError, Result};
use crate::domain::flatten_options::{ExportRequest, FlattenOptions};
use crate::domain::headings::HeadingsType;
use crate::domain::preview::TablePreview;
use crate::domain::selection::{Selection, SelectionId};
use crate::domain::table::{SplitTransition, Table, TableId, TablePatch};
use crate::infrastructure::repository::DataSourceRepository;
use crate::infrastructure::storage::read_analyzed_summary;

/// Selection and table operations of one service instance.
pub struct SelectionService {
    repository: Arc<dyn DataSourceRepository>,
    resolver: ColumnHeadingResolver,
    previews: Arc<PreviewMaterializer>,
    // Serializes read-modify-write cycles on selections.
    write_lock: Mutex<()>,
}

impl SelectionService {
    pub fn new(
        repository: Arc<dyn DataSourceRepository>,
        resolver: ColumnHeadingResolver,
        previews: PreviewMaterializer,
    ) -> Self {
        Self {
            repository,
            resolver,
            previews: Arc::new(previews),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(
        &self,
        datasource_id: DataSourceId,
    ) -> Result<(DataSource, Arc<AnalyzedSummary>)> {
        let datasource = self.repository.get_datasource(datasource_id).await?;
        let analyzed_file = datasource.analyzed_file.clone();
        let summary = run_blocking(move || read_analyzed_summary(&analyzed_file)).await?;
        Ok((datasource, Arc::new(summary)))
    }

    pub async fn create_selection(
        &self,
        datasource_id: DataSourceId,
        table_names: Vec<String>,
    ) -> Result<Selection> {
        let (_, summary) = self.load(datasource_id).await?;
        let mut seen = HashSet::new();
        for name in &table_names {
            if !seen.insert(name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Table '{}' is selected more than once",
                    name
                )));
            }
            summary.table(name)?;
        }

        let selection = Selection::new(table_names.into_iter().map(Table::new).collect());
        self.repository
            .insert_selection(datasource_id, &selection)
            .await?;
        info!(
            datasource_id = %datasource_id,
            selection_id = %selection.id,
            tables = selection.tables.len(),
            "Created selection"
        );
        Ok(selection)
    }

    pub async fn get_selection(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
    ) -> Result<Selection> {
        self.repository
            .get_selection(datasource_id, selection_id)
            .await
    }

    pub async fn list_selections(&self, datasource_id: DataSourceId) -> Result<Vec<Selection>> {
        self.repository.list_selections(datasource_id).await
    }

    /// Change the heading style and recompute the headings of every table.
    ///
    /// The style is validated and all headings are resolved before anything
    /// is stored.
    pub async fn update_headings_type(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
        headings_type: &str,
    ) -> Result<Selection> {
        let headings_type: HeadingsType = headings_type.parse()?;

        let _guard = self.write_lock.lock().await;
        let mut selection = self
            .repository
            .get_selection(datasource_id, selection_id)
            .await?;
        if selection.headings_type == headings_type {
            return Ok(selection);
        }

        let (_, summary) = self.load(datasource_id).await?;
        let resolved = self
            .resolver
            .resolve_selection(headings_type, &selection, &summary)?;

        selection.headings_type = headings_type;
        apply_headings(&mut selection.tables, resolved);
        self.repository
            .save_selection(datasource_id, &selection)
            .await?;
        info!(
            selection_id = %selection_id,
            headings_type = %headings_type,
            tables = selection.all_tables().len(),
            "Updated headings type"
        );
        Ok(selection)
    }

    pub async fn list_tables(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
    ) -> Result<Vec<Table>> {
        Ok(self.get_selection(datasource_id, selection_id).await?.tables)
    }

    pub async fn get_table(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
        table_id: TableId,
    ) -> Result<Table> {
        let selection = self.get_selection(datasource_id, selection_id).await?;
        selection
            .find_table(table_id)
            .cloned()
            .ok_or_else(|| table_not_found(table_id))
    }

    /// Apply include/split/heading changes to a table.
    ///
    /// The first split of a table creates one array table per child table of
    /// the analyzed data, resolves their headings and caches their previews.
    pub async fn update_table(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
        table_id: TableId,
        patch: TablePatch,
    ) -> Result<Table> {
        let _guard = self.write_lock.lock().await;
        let (_, summary) = self.load(datasource_id).await?;
        let mut selection = self
            .repository
            .get_selection(datasource_id, selection_id)
            .await?;
        let headings_type = selection.headings_type;

        let table = selection
            .find_table_mut(table_id)
            .ok_or_else(|| table_not_found(table_id))?;
        let spec = summary.table(&table.name)?;

        if let Some(include) = patch.include {
            table.include = include;
        }
        if let Some(heading) = patch.heading.as_deref() {
            table.set_heading(heading);
        }

        let transition = match patch.split {
            Some(split) => table.set_split(split),
            None => SplitTransition::Unchanged,
        };

        if transition == SplitTransition::MaterializeChildren {
            let created = table.add_missing_children(spec.child_tables.iter().map(String::as_str));
            if created == 0 {
                warn!(table = %table.name, "Split requested but analyzed data has no child tables");
            } else {
                info!(table = %table.name, created, "Created array tables");
                let previews = Arc::clone(&self.previews);
                let parent = table.clone();
                let summary = Arc::clone(&summary);
                run_blocking(move || {
                    previews.materialize_array_tables(datasource_id, &parent, &summary)
                })
                .await?;
            }
        }

        if transition != SplitTransition::Unchanged {
            let resolved = self.resolver.resolve_tree(headings_type, table, &summary)?;
            apply_headings(std::slice::from_mut(table), resolved);
        }

        let updated = table.clone();
        self.repository
            .save_selection(datasource_id, &selection)
            .await?;
        Ok(updated)
    }

    pub async fn flatten_options(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
    ) -> Result<FlattenOptions> {
        let (_, summary) = self.load(datasource_id).await?;
        let selection = self.get_selection(datasource_id, selection_id).await?;
        build_flatten_options(&selection, &summary)
    }

    /// The request handed to the flattening engine for this selection.
    pub async fn export_request(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
    ) -> Result<ExportRequest> {
        let (datasource, summary) = self.load(datasource_id).await?;
        let selection = self.get_selection(datasource_id, selection_id).await?;
        let options = build_flatten_options(&selection, &summary)?;
        Ok(ExportRequest {
            datasource_id,
            selection_id,
            data_file: datasource.data_file,
            options,
        })
    }

    pub async fn table_preview(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
        table_id: TableId,
    ) -> Result<Vec<TablePreview>> {
        let (_, summary) = self.load(datasource_id).await?;
        let selection = self.get_selection(datasource_id, selection_id).await?;
        let previews = Arc::clone(&self.previews);
        run_blocking(move || {
            let table = selection
                .find_table(table_id)
                .ok_or_else(|| table_not_found(table_id))?;
            previews.table_previews(datasource_id, &selection, table, &summary)
        })
        .await
    }
}

/// Run file-system work off the async executor.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        error!(error = %e, "Blocking task failed");
        AppError::Internal(format!("Blocking task failed: {}", e))
    })?
}

fn table_not_found(id: TableId) -> AppError {
    AppError::NotFound(format!("Table {}", id))
}
