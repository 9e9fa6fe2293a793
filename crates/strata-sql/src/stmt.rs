mod column_def;
pub use column_def::ColumnDef;

mod create_table;
pub use create_table::{CreateTable, TableConstraint};

mod drop_table;
pub use drop_table::DropTable;

mod name;
pub use name::Name;

pub use strata_core::stmt::*;

#[derive(Debug, Clone)]
pub enum Statement {
    CreateTable(CreateTable),
    DropTable(DropTable),
    Select(Select),
}

impl Statement {
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }

    /// Returns the number of columns each row of the result carries, if the
    /// statement returns rows.
    pub fn returning_len(&self) -> Option<usize> {
        match self {
            Statement::Select(select) => Some(select.columns.len()),
            _ => None,
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}
