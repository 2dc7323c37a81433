use chrono::{Duration, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::use_cases::available_tables::retrieve_tables;
use crate::domain::datasource::{DataSource, DataSourceId, DataSourceKind, NewDataSource};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::repository::DataSourceRepository;
use crate::infrastructure::storage::read_analyzed_summary;

pub struct DataSourceService {
    repository: Arc<dyn DataSourceRepository>,
    ttl_days: i64,
    media_root: PathBuf,
}

impl DataSourceService {
    pub fn new(
        repository: Arc<dyn DataSourceRepository>,
        ttl_days: i64,
        media_root: PathBuf,
    ) -> Self {
        Self {
            repository,
            ttl_days,
            media_root,
        }
    }

    /// Relative dataset paths are taken to live under the media root.
    fn resolve_path(&self, path: PathBuf) -> PathBuf {
        if path.is_relative() {
            self.media_root.join(path)
        } else {
            path
        }
    }

    /// Register a dataset whose analyzed summary is already on disk and
    /// record which root tables it makes available.
    pub async fn register(&self, mut input: NewDataSource) -> Result<DataSource> {
        input.data_file = self.resolve_path(input.data_file);
        input.analyzed_file = self.resolve_path(input.analyzed_file);
        if input.kind == DataSourceKind::Url && input.url.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::ValidationError("Url is required".to_string()));
        }

        let summary = read_analyzed_summary(&input.analyzed_file).map_err(|e| {
            error!(
                error = %e,
                analyzed_file = %input.analyzed_file.display(),
                "Failed to load analyzed data"
            );
            e
        })?;
        let (available_tables, unavailable_tables) = retrieve_tables(&summary);

        let created_at = Utc::now();
        let datasource = DataSource {
            id: Uuid::new_v4(),
            kind: input.kind,
            url: input.url,
            analyzed_data_url: input.analyzed_data_url,
            data_file: input.data_file,
            analyzed_file: input.analyzed_file,
            available_tables,
            unavailable_tables,
            selections: Vec::new(),
            created_at,
            expired_at: created_at + Duration::days(self.ttl_days),
        };
        self.repository.insert_datasource(&datasource).await?;

        info!(
            datasource_id = %datasource.id,
            available = datasource.available_tables.len(),
            unavailable = datasource.unavailable_tables.len(),
            "Registered data source"
        );
        Ok(datasource)
    }

    pub async fn get(&self, id: DataSourceId) -> Result<DataSource> {
        self.repository.get_datasource(id).await
    }
}
