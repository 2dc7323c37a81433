use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::application::{
    ColumnHeadingResolver, DataSourceService, PreviewMaterializer, SelectionService,
};
use crate::domain::error::Result;
use crate::domain::headings::Locale;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::headings_dictionary::HeadingDictionary;
use crate::infrastructure::repository::InMemoryRepository;
use crate::infrastructure::storage::ensure_dir;
use crate::interfaces::http::{add_log, HttpState, LogEntry};

fn load_dictionary(config: &AppConfig) -> Result<HeadingDictionary> {
    match &config.headings.dictionary_path {
        Some(path) => HeadingDictionary::load(path).map_err(|err| {
            error!(
                error = %err,
                dictionary_path = %path.display(),
                "Failed to load heading dictionary"
            );
            err
        }),
        None => HeadingDictionary::bundled(),
    }
}

/// Build the services and shared HTTP state described by `config`.
pub fn setup(config: &AppConfig) -> Result<HttpState> {
    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));

    for dir in [&config.storage.media_root, &config.storage.preview_root] {
        ensure_dir(dir).map_err(|err| {
            error!(error = %err, dir = %dir.display(), "Failed to create storage dir");
            err
        })?;
    }

    let dictionary = Arc::new(load_dictionary(config)?);
    info!(
        en = dictionary.len(Locale::En),
        es = dictionary.len(Locale::Es),
        "Loaded heading dictionary"
    );

    let repository = Arc::new(InMemoryRepository::new());
    let datasources = DataSourceService::new(
        repository.clone(),
        config.upload_ttl_days,
        config.storage.media_root.clone(),
    );
    let selections = SelectionService::new(
        repository,
        ColumnHeadingResolver::new(dictionary),
        PreviewMaterializer::new(config.storage.preview_root.clone()),
    );

    add_log(
        &logs,
        "INFO",
        "System",
        &format!(
            "Previews stored under {}",
            config.storage.preview_root.display()
        ),
    );

    Ok(HttpState {
        datasources: Arc::new(datasources),
        selections: Arc::new(selections),
        logs,
    })
}
