// ============================================================
// CSV PREVIEW WRITER
// ============================================================
// Render analyzed preview rows as CSV and store them in the cache

use std::fs;
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::analyzed::Row;
use crate::domain::error::{AppError, Result};

/// Writes preview rows with heterogeneous keys as a single comma-separated table
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvPreviewWriter;

impl CsvPreviewWriter {
    pub fn new() -> Self {
        Self
    }

    /// Union of all row keys, in order of first appearance
    pub fn collect_headers(rows: &[Row]) -> Vec<String> {
        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
        headers
    }

    /// Render rows to CSV text. Missing fields are written as empty values.
    pub fn render(&self, rows: &[Row]) -> Result<String> {
        let headers = Self::collect_headers(rows);
        if headers.is_empty() {
            return Ok(String::new());
        }

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&headers)?;
        for row in rows {
            writer.write_record(
                headers
                    .iter()
                    .map(|header| row.get(header).map(field_text).unwrap_or_default()),
            )?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::IoError(format!("Failed to flush CSV preview: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV preview is not UTF-8: {}", e)))
    }

    /// Write rows to `path`. The content lands in a temporary sibling first and
    /// is renamed into place, so `path` never holds a partial file.
    pub fn write_file(&self, path: &Path, rows: &[Row]) -> Result<()> {
        let content = self.render(rows)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Internal(format!("Invalid preview path {}", path.display()))
            })?;
        let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let written = fs::write(&tmp_path, content.as_bytes()).and_then(|_| fs::rename(&tmp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            error!(error = %e, path = %path.display(), "Failed to write CSV preview");
            return Err(AppError::IoError(format!(
                "Failed to write preview {}: {}",
                path.display(),
                e
            )));
        }

        debug!(path = %path.display(), rows = rows.len(), "Stored CSV preview");
        Ok(())
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Nested values are kept as compact JSON
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_headers_are_union_of_keys() {
        let rows = rows(json!([{"id": "1"}, {"id": "2", "name": "B"}, {"extra": 1}]));
        assert_eq!(
            CsvPreviewWriter::collect_headers(&rows),
            vec!["id", "name", "extra"]
        );
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let rows = rows(json!([{"id": "1", "name": "A"}, {"id": "2"}]));
        let csv = CsvPreviewWriter::new().render(&rows).unwrap();
        assert_eq!(csv, "id,name\n1,A\n2,\n");
    }

    #[test]
    fn test_scalar_and_nested_values() {
        let rows = rows(json!([{"n": 1.5, "b": true, "z": null, "o": {"a": 1}}]));
        let csv = CsvPreviewWriter::new().render(&rows).unwrap();
        assert_eq!(csv, "n,b,z,o\n1.5,true,,\"{\"\"a\"\":1}\"\n");
    }

    #[test]
    fn test_empty_rows_render_empty() {
        assert_eq!(CsvPreviewWriter::new().render(&[]).unwrap(), "");
    }

    #[test]
    fn test_write_file_into_missing_dir_fails_cleanly() {
        let dir = std::env::temp_dir().join(format!("preview-missing-{}", Uuid::new_v4()));
        let path = dir.join("tenders_combined.csv");
        let rows = rows(json!([{"id": "1"}]));
        let err = CsvPreviewWriter::new().write_file(&path, &rows).unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
        assert!(!path.exists());
    }
}
