use super::*;

use strata_core::schema::db::{self, Constraint, Table};

#[derive(Debug, Clone)]
pub struct CreateTable {
    /// Name of the table
    pub name: Name,

    /// Column definitions
    pub columns: Vec<ColumnDef>,

    /// Names of the primary key columns
    pub primary_key: Vec<String>,

    pub constraints: Vec<TableConstraint>,
}

/// A table constraint, with its columns resolved to names.
#[derive(Debug, Clone)]
pub enum TableConstraint {
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    Check {
        name: Option<String>,
        sql: String,
    },
}

impl TableConstraint {
    pub fn name(&self) -> Option<&str> {
        match self {
            TableConstraint::Unique { name, .. } | TableConstraint::Check { name, .. } => {
                name.as_deref()
            }
        }
    }
}

impl Statement {
    pub fn create_table(schema: &db::Schema, table: &Table) -> Self {
        let column_name = |id: &db::ColumnId| schema.column(*id).name.clone();

        CreateTable {
            name: Name::table(table),
            columns: table
                .columns
                .iter()
                .map(|id| ColumnDef::from_schema(schema, schema.column(*id)))
                .collect(),
            primary_key: table.primary_key.iter().map(column_name).collect(),
            constraints: table
                .constraints
                .iter()
                .map(|constraint| match constraint {
                    Constraint::Unique { name, columns } => TableConstraint::Unique {
                        name: name.clone(),
                        columns: columns.iter().map(column_name).collect(),
                    },
                    Constraint::Check { name, sql } => TableConstraint::Check {
                        name: name.clone(),
                        sql: sql.clone(),
                    },
                })
                .collect(),
        }
        .into()
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
