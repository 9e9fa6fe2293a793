use super::UnionId;
use crate::{
    schema::db::{ColumnId, TableId},
    Metadata,
};

/// The relation rows of a class are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum Selectable {
    Table(TableId),

    /// A table joined onto the selectable of its parent class
    Join(Box<Join>),

    Union(UnionId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Selectable,
    pub right: TableId,

    /// `(left column, right column)` pairs that must be equal
    pub on: Vec<(ColumnId, ColumnId)>,
}

impl Selectable {
    pub fn join(left: Selectable, right: TableId, on: Vec<(ColumnId, ColumnId)>) -> Selectable {
        Selectable::Join(Box::new(Join { left, right, on }))
    }

    /// Physical tables read, leftmost first. Empty for a union.
    pub fn tables(&self) -> Vec<TableId> {
        match self {
            Selectable::Table(table) => vec![*table],
            Selectable::Join(join) => {
                let mut tables = join.left.tables();
                tables.push(join.right);
                tables
            }
            Selectable::Union(_) => vec![],
        }
    }

    /// Columns the selectable exposes, in order.
    pub fn columns(&self, metadata: &Metadata) -> Vec<ColumnId> {
        match self {
            Selectable::Table(table) => metadata.table(*table).columns.clone(),
            Selectable::Join(join) => {
                let mut columns = join.left.columns(metadata);
                columns.extend(metadata.table(join.right).columns.iter().copied());
                columns
            }
            Selectable::Union(union) => metadata.union(*union).columns.clone(),
        }
    }

    /// Translates a column into the column of this selectable that carries
    /// its values.
    ///
    /// Table and join selectables expose their columns unchanged. A union
    /// exposes each leaf table column through the union column of the same
    /// name.
    pub fn corresponding_column(&self, metadata: &Metadata, column: ColumnId) -> Option<ColumnId> {
        match self {
            Selectable::Table(table) => metadata.table(*table).contains(column).then_some(column),
            Selectable::Join(join) => join
                .left
                .corresponding_column(metadata, column)
                .or_else(|| metadata.table(join.right).contains(column).then_some(column)),
            Selectable::Union(id) => {
                let union = metadata.union(*id);

                if union.columns.contains(&column) {
                    return Some(column);
                }

                let source = metadata.column(column);
                let table = source.table()?;

                if !union.arms.iter().any(|arm| arm.table == table) {
                    return None;
                }

                union.column_named(metadata.schema(), &source.name)
            }
        }
    }
}
