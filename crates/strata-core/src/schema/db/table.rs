use super::{ColumnId, Constraint};
use indexmap::IndexMap;

use std::fmt;

/// A database table
#[derive(Debug, Clone)]
pub struct Table {
    /// Uniquely identifies a table
    pub id: TableId,

    /// Name of the table
    pub name: String,

    /// The table's columns, in declaration order
    pub columns: Vec<ColumnId>,

    pub primary_key: Vec<ColumnId>,

    /// Table-level options, only ever set by the class that defines the table
    pub args: Option<TableArgs>,

    pub constraints: Vec<Constraint>,
}

/// Uniquely identifies a table
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct TableId(pub usize);

/// Options applied to a whole table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableArgs {
    /// Database schema the table lives in
    pub schema: Option<String>,

    /// Dialect-specific options, in declaration order
    pub options: IndexMap<String, String>,
}

impl Table {
    pub(crate) fn new(id: TableId, name: String) -> Self {
        Self {
            id,
            name,
            columns: vec![],
            primary_key: vec![],
            args: None,
            constraints: vec![],
        }
    }

    pub fn contains(&self, column: ColumnId) -> bool {
        self.columns.contains(&column)
    }
}

impl TableArgs {
    pub fn new() -> TableArgs {
        TableArgs::default()
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TableId({})", self.0)
    }
}
