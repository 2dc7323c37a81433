use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::analyzed::AnalyzedSummary;
use crate::domain::datasource::DataSourceId;
use crate::domain::error::{AppError, Result};
use crate::domain::preview::PreviewVariant;

pub fn ensure_datasource_preview_dir(
    preview_root: &Path,
    datasource_id: DataSourceId,
) -> std::io::Result<PathBuf> {
    let dir = datasource_preview_dir(preview_root, datasource_id);
    ensure_dir(&dir)?;
    Ok(dir)
}

pub fn datasource_preview_dir(preview_root: &Path, datasource_id: DataSourceId) -> PathBuf {
    preview_root.join(datasource_id.to_string())
}

/// `<preview_root>/<datasource>/<table><suffix>.csv`
pub fn preview_path(
    preview_root: &Path,
    datasource_id: DataSourceId,
    table_name: &str,
    variant: PreviewVariant,
) -> PathBuf {
    datasource_preview_dir(preview_root, datasource_id)
        .join(format!("{}{}.csv", table_name, variant.file_suffix()))
}

pub fn read_analyzed_summary(path: &Path) -> Result<AnalyzedSummary> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::IoError(format!(
            "Failed to read analyzed data {}: {}",
            path.display(),
            e
        ))
    })?;
    AnalyzedSummary::from_json(&content)
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
