use super::ClassId;
use crate::{
    schema::db::{ColumnId, Table, TableId},
    Metadata,
};

/// What a declared attribute, deferred mapper arguments or a deferred
/// discriminator can observe about the class being declared.
pub struct DeclContext<'a> {
    pub(crate) metadata: &'a Metadata,
    pub(crate) class_name: &'a str,
    pub(crate) mapped_base: Option<ClassId>,
    pub(crate) table: Option<TableId>,
}

impl<'a> DeclContext<'a> {
    pub fn class_name(&self) -> &str {
        self.class_name
    }

    /// The mapped class this class inherits from, if any.
    pub fn mapped_base(&self) -> Option<ClassId> {
        self.mapped_base
    }

    /// Returns `true` if a mapped ancestor owns a table.
    pub fn has_inherited_table(&self) -> bool {
        self.metadata.has_table_in_chain(self.mapped_base)
    }

    /// The table the class maps into, if it is known at this point.
    ///
    /// Declared attributes of a single-table subclass see the inherited
    /// table. A deferred discriminator sees the class's own table once it is
    /// synthesized.
    pub fn table(&self) -> Option<&'a Table> {
        self.table.map(|id| self.metadata.table(id))
    }

    /// Finds a column by name on [`table`](Self::table).
    pub fn table_column(&self, name: &str) -> Option<ColumnId> {
        self.table
            .and_then(|table| self.metadata.schema().column_named(table, name))
    }

    pub fn metadata(&self) -> &'a Metadata {
        self.metadata
    }
}
