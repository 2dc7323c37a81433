use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type TableId = Uuid;

/// A derived table chosen by the user: a root table or one of its array tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub include: bool,
    pub split: bool,
    /// User override of the exported table name.
    pub heading: Option<String>,
    pub column_headings: BTreeMap<String, String>,
    pub array_tables: Vec<Table>,
}

/// What a change to `split` requires from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitTransition {
    Unchanged,
    /// The flag flipped; headings depend on it and must be recomputed.
    Changed,
    /// The table is split and has no array tables yet.
    MaterializeChildren,
}

/// Partial update of a table's user-controlled state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablePatch {
    #[serde(default)]
    pub split: Option<bool>,
    #[serde(default)]
    pub include: Option<bool>,
    /// An empty string clears the override.
    #[serde(default)]
    pub heading: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            include: true,
            split: false,
            heading: None,
            column_headings: BTreeMap::new(),
            array_tables: Vec::new(),
        }
    }

    pub fn set_split(&mut self, split: bool) -> SplitTransition {
        let changed = self.split != split;
        self.split = split;
        if split && self.array_tables.is_empty() {
            SplitTransition::MaterializeChildren
        } else if changed {
            SplitTransition::Changed
        } else {
            SplitTransition::Unchanged
        }
    }

    pub fn set_heading(&mut self, heading: &str) {
        let trimmed = heading.trim();
        self.heading = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Add one array table per name not already present under this table.
    ///
    /// Children are keyed by name, so repeated calls never duplicate them.
    /// Returns the number of tables created.
    pub fn add_missing_children<'a, I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut created = 0;
        for name in names {
            if self.array_tables.iter().any(|child| child.name == name) {
                continue;
            }
            self.array_tables.push(Table::new(name));
            created += 1;
        }
        created
    }

    pub fn find(&self, id: TableId) -> Option<&Table> {
        if self.id == id {
            return Some(self);
        }
        self.array_tables.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: TableId) -> Option<&mut Table> {
        if self.id == id {
            return Some(self);
        }
        self.array_tables
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// This table followed by its array tables, depth first.
    pub fn walk(&self) -> Vec<&Table> {
        let mut out = vec![self];
        for child in &self.array_tables {
            out.extend(child.walk());
        }
        out
    }
}
