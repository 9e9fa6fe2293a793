use super::*;

use strata_core::schema::db::Table;

/// `DROP TABLE` for one table of a mapped hierarchy.
#[derive(Debug, Clone)]
pub struct DropTable {
    pub name: Name,

    /// Succeed when the table is already gone
    pub if_exists: bool,

    /// Also drop what depends on the table, such as the foreign keys joined
    /// subclass tables hold to it. SQLite has no such clause and ignores it.
    pub cascade: bool,
}

impl DropTable {
    pub fn new(table: &Table) -> DropTable {
        DropTable {
            name: Name::table(table),
            if_exists: false,
            cascade: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }
}

impl Statement {
    pub fn drop_table(table: &Table) -> Self {
        DropTable::new(table).into()
    }

    pub fn drop_table_if_exists(table: &Table) -> Self {
        DropTable::new(table).if_exists().into()
    }
}

impl From<DropTable> for Statement {
    fn from(value: DropTable) -> Self {
        Self::DropTable(value)
    }
}
