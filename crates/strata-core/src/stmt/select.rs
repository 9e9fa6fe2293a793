use super::Expr;
use crate::schema::{db::ColumnId, mapping::Selectable};

/// `SELECT columns FROM source [WHERE filter]`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Table, join chain or polymorphic union being read
    pub source: Selectable,

    /// Projected columns, in output order
    pub columns: Vec<ColumnId>,

    /// Optional row filter
    pub filter: Option<Expr>,
}

impl Select {
    pub fn new(source: Selectable, columns: Vec<ColumnId>) -> Select {
        Select {
            source,
            columns,
            filter: None,
        }
    }

    /// Adds a predicate, AND-ing it with any existing filter.
    pub fn and_filter(&mut self, expr: Expr) {
        self.filter = Some(match self.filter.take() {
            Some(filter) => Expr::and(filter, expr),
            None => expr,
        });
    }
}
