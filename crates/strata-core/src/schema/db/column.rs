use super::{TableId, Type};
use crate::schema::mapping::UnionId;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Uniquely identifies the column in the schema.
    pub id: ColumnId,

    /// The name of the column in the database.
    pub name: String,

    /// The database storage type of the column.
    pub ty: Type,

    /// Whether or not the column is nullable
    pub nullable: bool,

    /// True if the column is part of the table's primary key
    pub primary_key: bool,

    /// Columns this column references.
    pub foreign_keys: Vec<ForeignKey>,

    /// Relation the column belongs to, if any.
    pub owner: ColumnOwner,
}

/// Identity of a column.
///
/// Ids are handed out in creation order and never reused, so two bindings
/// refer to the same column exactly when their ids are equal.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ColumnId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOwner {
    /// Created but not added to a table yet
    Unattached,

    /// Column of a physical table
    Table(TableId),

    /// Output column of a polymorphic union
    Union(UnionId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub target: FkTarget,
}

/// The column a foreign key points at.
///
/// A foreign key does not own its target. Naming the target as
/// `"table.column"` allows referencing tables that have not been declared
/// yet; such references are resolved when the metadata is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FkTarget {
    Column(ColumnId),
    Name(String),
}

impl Column {
    pub fn table(&self) -> Option<TableId> {
        match self.owner {
            ColumnOwner::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        !matches!(self.owner, ColumnOwner::Unattached)
    }
}

impl FkTarget {
    /// Splits a name target into its table and column parts.
    pub fn split_name(&self) -> Option<(&str, &str)> {
        match self {
            FkTarget::Name(name) => name.rsplit_once('.'),
            FkTarget::Column(_) => None,
        }
    }
}

impl From<ColumnId> for FkTarget {
    fn from(value: ColumnId) -> Self {
        FkTarget::Column(value)
    }
}

impl From<&str> for FkTarget {
    fn from(value: &str) -> Self {
        FkTarget::Name(value.to_string())
    }
}

impl From<&Column> for ColumnId {
    fn from(value: &Column) -> Self {
        value.id
    }
}

impl fmt::Debug for ColumnId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ColumnId({})", self.0)
    }
}
