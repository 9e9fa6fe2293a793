use super::{Column, ColumnId, ColumnOwner, FkTarget, ForeignKey, Table, TableId};
use crate::{schema::app::ColumnDef, Error, Result};
use indexmap::IndexMap;

/// Registry of every column and table known to a [`Metadata`].
///
/// Columns live in an arena; tables and unions refer to them by id.
///
/// [`Metadata`]: crate::Metadata
#[derive(Debug, Default, Clone)]
pub struct Schema {
    pub columns: Vec<Column>,

    pub tables: Vec<Table>,

    /// Maps table names to identifiers
    table_lookup: IndexMap<String, TableId>,

    /// Set while a fallible metadata operation is in progress
    savepoint: Option<Savepoint>,
}

/// Prior state of the registry entries touched since [`Schema::begin`].
///
/// Columns and tables are only ever appended, so entries created after the
/// savepoint are dropped by truncating. Entries that existed before are
/// copied the first time they are handed out mutably.
#[derive(Debug, Clone)]
struct Savepoint {
    columns: usize,
    tables: usize,
    touched_columns: IndexMap<ColumnId, Column>,
    touched_tables: IndexMap<TableId, Table>,
}

impl Schema {
    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        self.columns.get(id.into().0).expect("invalid column ID")
    }

    pub(crate) fn column_mut(&mut self, id: ColumnId) -> &mut Column {
        if let Some(savepoint) = &mut self.savepoint {
            if id.0 < savepoint.columns {
                savepoint
                    .touched_columns
                    .entry(id)
                    .or_insert_with(|| self.columns[id.0].clone());
            }
        }

        self.columns.get_mut(id.0).expect("invalid column ID")
    }

    pub fn table(&self, id: impl Into<TableId>) -> &Table {
        self.tables.get(id.into().0).expect("invalid table ID")
    }

    pub(crate) fn table_mut(&mut self, id: TableId) -> &mut Table {
        if let Some(savepoint) = &mut self.savepoint {
            if id.0 < savepoint.tables {
                savepoint
                    .touched_tables
                    .entry(id)
                    .or_insert_with(|| self.tables[id.0].clone());
            }
        }

        self.tables.get_mut(id.0).expect("invalid table ID")
    }

    /// Starts recording changes so they can be undone by
    /// [`Schema::rollback`].
    pub(crate) fn begin(&mut self) {
        debug_assert!(self.savepoint.is_none(), "savepoint already open");

        self.savepoint = Some(Savepoint {
            columns: self.columns.len(),
            tables: self.tables.len(),
            touched_columns: IndexMap::new(),
            touched_tables: IndexMap::new(),
        });
    }

    pub(crate) fn commit(&mut self) {
        self.savepoint = None;
    }

    /// Restores every column and table to its state at [`Schema::begin`].
    pub(crate) fn rollback(&mut self) {
        let Some(savepoint) = self.savepoint.take() else {
            return;
        };

        self.columns.truncate(savepoint.columns);
        self.tables.truncate(savepoint.tables);
        self.table_lookup.retain(|_, id| id.0 < savepoint.tables);

        for (id, column) in savepoint.touched_columns {
            self.columns[id.0] = column;
        }

        for (id, table) in savepoint.touched_tables {
            self.tables[id.0] = table;
        }
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.table_lookup.get(name).map(|id| self.table(*id))
    }

    /// Finds the column of `table` named `name`.
    pub fn column_named(&self, table: TableId, name: &str) -> Option<ColumnId> {
        self.table(table)
            .columns
            .iter()
            .copied()
            .find(|id| self.column(*id).name == name)
    }

    /// Formats a column as `table.column`.
    pub fn qualified_name(&self, id: ColumnId) -> String {
        let column = self.column(id);

        match column.owner {
            ColumnOwner::Table(table) => format!("{}.{}", self.table(table).name, column.name),
            _ => column.name.clone(),
        }
    }

    /// Resolves a foreign key target to a column, if its table exists yet.
    pub fn resolve_fk(&self, target: &FkTarget) -> Option<ColumnId> {
        match target {
            FkTarget::Column(id) => Some(*id),
            FkTarget::Name(_) => {
                let (table, column) = target.split_name()?;
                let table = self.table_by_name(table)?;
                self.column_named(table.id, column)
            }
        }
    }

    pub(crate) fn new_column(&mut self, name: &str, def: &ColumnDef) -> ColumnId {
        let id = ColumnId(self.columns.len());

        self.columns.push(Column {
            id,
            name: def.name.clone().unwrap_or_else(|| name.to_string()),
            ty: def.ty.clone(),
            nullable: def.nullable.unwrap_or(!def.primary_key),
            primary_key: def.primary_key,
            foreign_keys: def
                .foreign_keys
                .iter()
                .map(|target| ForeignKey {
                    target: target.clone(),
                })
                .collect(),
            owner: ColumnOwner::Unattached,
        });

        id
    }

    pub(crate) fn create_table(&mut self, name: &str) -> Result<TableId> {
        if self.table_lookup.contains_key(name) {
            return Err(Error::configuration(format!(
                "table '{name}' is already defined for this metadata"
            )));
        }

        let id = TableId(self.tables.len());
        self.tables.push(Table::new(id, name.to_string()));
        self.table_lookup.insert(name.to_string(), id);

        log::debug!("created table {name}");
        Ok(id)
    }

    /// Appends an unattached column to `table`.
    ///
    /// The caller is responsible for ruling out name conflicts.
    pub(crate) fn attach(&mut self, table: TableId, id: ColumnId) {
        let column = self.column_mut(id);
        debug_assert!(!column.is_attached(), "column {id:?} is already attached");
        column.owner = ColumnOwner::Table(table);
        let primary_key = column.primary_key;

        let table = self.table_mut(table);
        table.columns.push(id);

        if primary_key {
            table.primary_key.push(id);
        }
    }

    /// Creates a column owned by a polymorphic union.
    pub(crate) fn new_union_column(&mut self, owner: ColumnOwner, name: &str, ty: super::Type) -> ColumnId {
        let id = ColumnId(self.columns.len());

        self.columns.push(Column {
            id,
            name: name.to_string(),
            ty,
            nullable: true,
            primary_key: false,
            foreign_keys: vec![],
            owner,
        });

        id
    }
}
