use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::datasource::{DataSource, DataSourceId};
use crate::domain::error::{AppError, Result};
use crate::domain::selection::{Selection, SelectionId};

/// Storage of data sources and the selections made on them.
#[async_trait]
pub trait DataSourceRepository: Send + Sync {
    async fn insert_datasource(&self, datasource: &DataSource) -> Result<()>;

    async fn get_datasource(&self, id: DataSourceId) -> Result<DataSource>;

    /// Store a new selection and attach it to its data source.
    async fn insert_selection(&self, datasource_id: DataSourceId, selection: &Selection)
        -> Result<()>;

    async fn get_selection(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
    ) -> Result<Selection>;

    async fn list_selections(&self, datasource_id: DataSourceId) -> Result<Vec<Selection>>;

    /// Replace a stored selection with its updated state.
    async fn save_selection(&self, datasource_id: DataSourceId, selection: &Selection)
        -> Result<()>;
}

#[derive(Default)]
struct MemoryState {
    datasources: HashMap<DataSourceId, DataSource>,
    selections: HashMap<SelectionId, (DataSourceId, Selection)>,
}

/// Process-local repository. State is lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn datasource_not_found(id: DataSourceId) -> AppError {
    AppError::NotFound(format!("Data source {}", id))
}

fn selection_not_found(id: SelectionId) -> AppError {
    AppError::NotFound(format!("Selection {}", id))
}

#[async_trait]
impl DataSourceRepository for InMemoryRepository {
    async fn insert_datasource(&self, datasource: &DataSource) -> Result<()> {
        let mut state = self.state.write().await;
        state.datasources.insert(datasource.id, datasource.clone());
        Ok(())
    }

    async fn get_datasource(&self, id: DataSourceId) -> Result<DataSource> {
        let state = self.state.read().await;
        state
            .datasources
            .get(&id)
            .cloned()
            .ok_or_else(|| datasource_not_found(id))
    }

    async fn insert_selection(
        &self,
        datasource_id: DataSourceId,
        selection: &Selection,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let datasource = state
            .datasources
            .get_mut(&datasource_id)
            .ok_or_else(|| datasource_not_found(datasource_id))?;
        datasource.selections.push(selection.id);
        state
            .selections
            .insert(selection.id, (datasource_id, selection.clone()));
        Ok(())
    }

    async fn get_selection(
        &self,
        datasource_id: DataSourceId,
        selection_id: SelectionId,
    ) -> Result<Selection> {
        let state = self.state.read().await;
        match state.selections.get(&selection_id) {
            Some((owner, selection)) if *owner == datasource_id => Ok(selection.clone()),
            _ => Err(selection_not_found(selection_id)),
        }
    }

    async fn list_selections(&self, datasource_id: DataSourceId) -> Result<Vec<Selection>> {
        let state = self.state.read().await;
        let datasource = state
            .datasources
            .get(&datasource_id)
            .ok_or_else(|| datasource_not_found(datasource_id))?;
        Ok(datasource
            .selections
            .iter()
            .filter_map(|id| state.selections.get(id))
            .map(|(_, selection)| selection.clone())
            .collect())
    }

    async fn save_selection(
        &self,
        datasource_id: DataSourceId,
        selection: &Selection,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        match state.selections.get_mut(&selection.id) {
            Some((owner, stored)) if *owner == datasource_id => {
                *stored = selection.clone();
                Ok(())
            }
            _ => Err(selection_not_found(selection.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::datasource::DataSourceKind;
    use crate::domain::table::Table;
    use chrono::Utc;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn datasource() -> DataSource {
        DataSource {
            id: Uuid::new_v4(),
            kind: DataSourceKind::Upload,
            url: None,
            analyzed_data_url: None,
            data_file: PathBuf::from("data.json"),
            analyzed_file: PathBuf::from("analyzed.json"),
            available_tables: Vec::new(),
            unavailable_tables: Vec::new(),
            selections: Vec::new(),
            created_at: Utc::now(),
            expired_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_selection_round_trip() {
        let repo = InMemoryRepository::new();
        let ds = datasource();
        repo.insert_datasource(&ds).await.unwrap();

        let mut selection = Selection::new(vec![Table::new("tenders")]);
        repo.insert_selection(ds.id, &selection).await.unwrap();
        assert_eq!(repo.get_datasource(ds.id).await.unwrap().selections, vec![selection.id]);

        selection.tables[0].include = false;
        repo.save_selection(ds.id, &selection).await.unwrap();
        let stored = repo.get_selection(ds.id, selection.id).await.unwrap();
        assert!(!stored.tables[0].include);
        assert_eq!(repo.list_selections(ds.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_selection_scoped_to_datasource() {
        let repo = InMemoryRepository::new();
        let first = datasource();
        let second = datasource();
        repo.insert_datasource(&first).await.unwrap();
        repo.insert_datasource(&second).await.unwrap();

        let selection = Selection::new(Vec::new());
        repo.insert_selection(first.id, &selection).await.unwrap();
        assert!(matches!(
            repo.get_selection(second.id, selection.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_datasource() {
        let repo = InMemoryRepository::new();
        let selection = Selection::new(Vec::new());
        assert!(matches!(
            repo.insert_selection(Uuid::new_v4(), &selection).await,
            Err(AppError::NotFound(_))
        ));
    }
}
