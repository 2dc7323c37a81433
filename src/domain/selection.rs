use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::headings::HeadingsType;
use crate::domain::table::{Table, TableId};

pub type SelectionId = Uuid;

/// A set of tables picked from one analyzed dataset, sharing one heading style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: SelectionId,
    pub headings_type: HeadingsType,
    pub tables: Vec<Table>,
    pub created_at: DateTime<Utc>,
}

impl Selection {
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            id: Uuid::new_v4(),
            headings_type: HeadingsType::default(),
            tables,
            created_at: Utc::now(),
        }
    }

    pub fn find_table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find_map(|table| table.find(id))
    }

    pub fn find_table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find_map(|table| table.find_mut(id))
    }

    /// Every table owned by the selection, roots and their array tables.
    pub fn all_tables(&self) -> Vec<&Table> {
        self.tables.iter().flat_map(|table| table.walk()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_selection_uses_ocds_headings() {
        let selection = Selection::new(vec![Table::new("tenders")]);
        assert_eq!(selection.headings_type, HeadingsType::Ocds);
    }

    #[test]
    fn test_all_tables_includes_children() {
        let mut parties = Table::new("parties");
        parties.add_missing_children(["parties_roles"]);
        let selection = Selection::new(vec![Table::new("tenders"), parties]);
        let names: Vec<&str> = selection
            .all_tables()
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["tenders", "parties", "parties_roles"]);
    }

    #[test]
    fn test_find_table_reaches_children() {
        let mut parties = Table::new("parties");
        parties.add_missing_children(["parties_roles"]);
        let child_id = parties.array_tables[0].id;
        let mut selection = Selection::new(vec![parties]);
        assert!(selection.find_table(child_id).is_some());
        selection.find_table_mut(child_id).unwrap().include = false;
        assert!(!selection.find_table(child_id).unwrap().include);
    }
}
