use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::application::use_cases::column_headings::ColumnHeadingResolver;
use crate::application::use_cases::datasource_service::DataSourceService;
use crate::application::use_cases::preview::PreviewMaterializer;
use crate::application::use_cases::selection_service::SelectionService;
use crate::domain::datasource::{DataSource, DataSourceKind, NewDataSource};
use crate::domain::headings::Locale;
use crate::infrastructure::headings_dictionary::HeadingDictionary;
use crate::infrastructure::repository::InMemoryRepository;

pub const ANALYZED_FIXTURE: &str = r#"{
  "tables": {
    "tenders": {
      "name": "tenders",
      "total_rows": 0
    },
    "parties": {
      "name": "parties",
      "total_rows": 2,
      "arrays": {"parties/roles": 2, "parties/additionalIdentifiers": 1},
      "columns": {
        "parties/0/id": {"hits": 2},
        "parties/0/name": {"hits": 1}
      },
      "combined_columns": {
        "partyName": {},
        "parties/0/id": {}
      },
      "additional_columns": {},
      "child_tables": ["parties_roles", "parties_additionalIdentifiers"],
      "preview_rows": [{"id": "1", "name": "A"}, {"id": "2"}],
      "preview_rows_combined": [{"id": "1", "name": "A"}, {"id": "2"}]
    },
    "parties_roles": {
      "name": "parties_roles",
      "total_rows": 2,
      "combined_columns": {"parties/0/roles": {}},
      "preview_rows": [{"rowID": "1", "roles": "buyer"}]
    },
    "parties_additionalIdentifiers": {
      "name": "parties_additionalIdentifiers",
      "total_rows": 1,
      "combined_columns": {"parties/0/additionalIdentifiers/0/id": {}},
      "preview_rows": [{"rowID": "1", "id": "X-1"}]
    },
    "awards": {
      "name": "awards",
      "total_rows": 3,
      "columns": {"awards/0/id": {"hits": 3}},
      "combined_columns": {"awards/0/id": {}},
      "preview_rows_combined": [{"id": "a1"}]
    }
  }
}"#;

pub struct TempDir {
    pub path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, Uuid::new_v4()));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub datasources: DataSourceService,
    pub selections: SelectionService,
}

pub fn dictionary() -> HeadingDictionary {
    let mut dictionary = HeadingDictionary::from_entries(
        Locale::En,
        [
            ("partyName", "Party Name"),
            ("parties/*/id", "Party ID"),
            ("parties/*/name", "Party Name"),
            ("parties/*/roles", "Party Roles"),
            ("parties/*/additionalIdentifiers/*/id", "Additional Identifier"),
        ],
    );
    dictionary.extend(Locale::Es, [("partyName", "Nombre de la parte")]);
    dictionary
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new("flatten-select");
        let repository = Arc::new(InMemoryRepository::new());
        let resolver = ColumnHeadingResolver::new(Arc::new(dictionary()));
        let previews = PreviewMaterializer::new(dir.path.join("previews"));
        Self {
            datasources: DataSourceService::new(repository.clone(), 2, dir.path.clone()),
            selections: SelectionService::new(repository, resolver, previews),
            dir,
        }
    }

    pub fn write_analyzed(&self, content: &str) -> PathBuf {
        let path = self.dir.path.join(format!("{}.json", Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    pub async fn datasource(&self) -> DataSource {
        let analyzed_file = self.write_analyzed(ANALYZED_FIXTURE);
        self.datasources
            .register(NewDataSource {
                kind: DataSourceKind::Upload,
                url: None,
                analyzed_data_url: None,
                data_file: self.dir.path.join("dataset.json"),
                analyzed_file,
            })
            .await
            .unwrap()
    }
}
