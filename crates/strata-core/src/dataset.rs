use crate::{
    schema::db::TableId,
    stmt::{Row, Value},
    Metadata, Result,
};
use indexmap::IndexMap;

/// In-memory table contents that queries are evaluated against.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    tables: IndexMap<TableId, Vec<Row>>,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset::default()
    }

    /// Inserts a row into the table named `table`. Columns are named by
    /// their physical name; columns left out are NULL.
    pub fn insert<'a, V: Into<Value>>(
        &mut self,
        metadata: &Metadata,
        table: &str,
        values: impl IntoIterator<Item = (&'a str, V)>,
    ) -> Result<()> {
        let Some(table) = metadata.table_by_name(table) else {
            bail!("unknown table `{table}`");
        };

        let mut row: Row = table
            .columns
            .iter()
            .map(|column| (*column, Value::Null))
            .collect();

        for (name, value) in values {
            let Some(column) = metadata.schema().column_named(table.id, name) else {
                bail!("table `{}` has no column `{name}`", table.name);
            };

            row.insert(column, value.into());
        }

        self.tables.entry(table.id).or_default().push(row);
        Ok(())
    }

    pub fn rows(&self, table: TableId) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }
}
