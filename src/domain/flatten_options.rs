use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Per-table instructions for the flattening engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOptions {
    pub split: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Table entries in the order they were visited. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSelection(Vec<(String, TableOptions)>);

impl TableSelection {
    pub fn insert(&mut self, name: String, options: TableOptions) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = options,
            None => self.0.push((name, options)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TableOptions> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, options)| options)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for TableSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, options) in &self.0 {
            map.serialize_entry(name, options)?;
        }
        map.end()
    }
}

/// Configuration handed to the flattening engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlattenOptions {
    pub selection: TableSelection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Everything the flattening engine needs to produce an export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    pub datasource_id: Uuid,
    pub selection_id: Uuid,
    pub data_file: PathBuf,
    pub options: FlattenOptions,
}
