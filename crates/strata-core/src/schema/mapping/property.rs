use crate::{
    schema::{app::Computed, db::ColumnId},
    stmt::{Row, Value},
};

#[derive(Debug, Clone)]
pub enum Property {
    Column(ColumnProperty),

    /// An attribute of a mapped ancestor that a concrete class does not
    /// implement
    ConcreteInherited,

    Computed(Computed),
}

/// An attribute bound to one or more columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProperty {
    /// Bound columns, most derived first. The first column is authoritative.
    pub columns: Vec<ColumnId>,

    /// Excluded from default projections
    pub deferred: bool,
}

impl Property {
    pub fn as_column(&self) -> Option<&ColumnProperty> {
        match self {
            Property::Column(property) => Some(property),
            _ => None,
        }
    }

    pub(crate) fn as_column_mut(&mut self) -> Option<&mut ColumnProperty> {
        match self {
            Property::Column(property) => Some(property),
            _ => None,
        }
    }

    pub fn is_concrete_inherited(&self) -> bool {
        matches!(self, Property::ConcreteInherited)
    }
}

impl ColumnProperty {
    pub fn new(column: ColumnId) -> ColumnProperty {
        ColumnProperty {
            columns: vec![column],
            deferred: false,
        }
    }

    /// The column that is authoritative for the attribute.
    pub fn column(&self) -> ColumnId {
        self.columns[0]
    }

    /// Loads the attribute from a row.
    ///
    /// Columns are considered in precedence order; the first non-null value
    /// wins. Returns `None` when the row contains none of the columns.
    pub fn load(&self, row: &Row) -> Option<Value> {
        self.load_adapted(row, Some)
    }

    /// Like [`load`](Self::load), translating each column with `adapt` first.
    pub(crate) fn load_adapted(
        &self,
        row: &Row,
        adapt: impl Fn(ColumnId) -> Option<ColumnId>,
    ) -> Option<Value> {
        let mut present = false;

        for column in self.columns.iter().filter_map(|column| adapt(*column)) {
            match row.get(column) {
                Some(value) if !value.is_null() => return Some(value.clone()),
                Some(_) => present = true,
                None => {}
            }
        }

        present.then(Value::null)
    }
}

impl From<ColumnProperty> for Property {
    fn from(value: ColumnProperty) -> Self {
        Property::Column(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(columns: &[usize]) -> ColumnProperty {
        ColumnProperty {
            columns: columns.iter().copied().map(ColumnId).collect(),
            deferred: false,
        }
    }

    #[test]
    fn load_prefers_first_non_null() {
        let property = property(&[1, 0]);
        let row = Row::from_iter([(ColumnId(0), Value::from(7)), (ColumnId(1), Value::Null)]);

        assert_eq!(property.load(&row), Some(Value::from(7)));

        let row = Row::from_iter([(ColumnId(0), Value::from(7)), (ColumnId(1), Value::from(8))]);
        assert_eq!(property.load(&row), Some(Value::from(8)));
    }

    #[test]
    fn load_partial_row() {
        let property = property(&[1, 0]);

        let row = Row::from_iter([(ColumnId(0), Value::from(3))]);
        assert_eq!(property.load(&row), Some(Value::from(3)));

        let row = Row::from_iter([(ColumnId(1), Value::Null)]);
        assert_eq!(property.load(&row), Some(Value::Null));

        let row = Row::from_iter([(ColumnId(5), Value::from(1))]);
        assert_eq!(property.load(&row), None);
    }
}
