use super::Value;
use crate::schema::db::ColumnId;
use indexmap::IndexMap;

/// One result row, keyed by the identity of the column that produced each
/// value.
///
/// Rows from a polymorphic union are keyed by the union's columns; rows from
/// a table or a join are keyed by the physical columns.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    values: IndexMap<ColumnId, Value>,
}

impl Row {
    pub fn new() -> Row {
        Row::default()
    }

    /// Returns the value for `column`, or `None` when the row has no such
    /// column (as opposed to a NULL value).
    pub fn get(&self, column: ColumnId) -> Option<&Value> {
        self.values.get(&column)
    }

    pub fn contains(&self, column: ColumnId) -> bool {
        self.values.contains_key(&column)
    }

    pub fn insert(&mut self, column: ColumnId, value: Value) {
        self.values.insert(column, value);
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = ColumnId> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn extend(&mut self, other: &Row) {
        for (column, value) in &other.values {
            self.values.insert(*column, value.clone());
        }
    }
}

impl FromIterator<(ColumnId, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (ColumnId, Value)>>(iter: T) -> Self {
        Row {
            values: iter.into_iter().collect(),
        }
    }
}
