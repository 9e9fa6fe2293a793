use super::Name;

use strata_core::schema::db::{self, Column};

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub ty: db::Type,
    pub not_null: bool,

    /// `(table, column)` referenced by a foreign key
    pub references: Vec<(Name, String)>,
}

impl ColumnDef {
    pub(crate) fn from_schema(schema: &db::Schema, column: &Column) -> ColumnDef {
        let references = column
            .foreign_keys
            .iter()
            .filter_map(|fk| match schema.resolve_fk(&fk.target) {
                Some(target) => {
                    let target = schema.column(target);
                    let table = schema.table(target.table()?);
                    Some((Name::table(table), target.name.clone()))
                }
                // Targets are checked when the metadata is configured. An
                // unresolved one is rendered as written.
                None => {
                    let (table, column) = fk.target.split_name()?;
                    Some((Name::from(table), column.to_string()))
                }
            })
            .collect();

        ColumnDef {
            name: column.name.clone(),
            ty: column.ty.clone(),
            not_null: !column.nullable,
            references,
        }
    }
}
