use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::table::TableId;

/// Which rows of a table spec a preview renders, and how its cache file is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewVariant {
    /// Split root table: `preview_rows`, no file suffix.
    Split,
    /// Non-split root table: `preview_rows_combined`, `_combined` suffix.
    Combined,
    /// Array table: `preview_rows`, `_combined` suffix.
    ArrayTable,
}

impl PreviewVariant {
    pub fn for_root(split: bool) -> Self {
        if split {
            PreviewVariant::Split
        } else {
            PreviewVariant::Combined
        }
    }

    pub fn file_suffix(self) -> &'static str {
        match self {
            PreviewVariant::Split => "",
            PreviewVariant::Combined | PreviewVariant::ArrayTable => "_combined",
        }
    }
}

/// One CSV preview returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub id: TableId,
    pub name: String,
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headings: Option<BTreeMap<String, String>>,
}
