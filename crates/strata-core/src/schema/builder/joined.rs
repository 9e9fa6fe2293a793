use crate::{
    schema::{
        app::{ClassDef, ClassId, MapperArgs},
        db::{ColumnId, TableId},
        mapping::Property,
    },
    Error, Metadata, Result,
};
use indexmap::IndexMap;

impl Metadata {
    /// Determines the `(parent, child)` column pairs joining a joined-table
    /// subclass to its parent.
    ///
    /// An explicit inherit condition is used as given. Otherwise exactly one
    /// child primary key column must reference a primary key column of the
    /// parent's tables. Foreign keys whose target is not declared yet are
    /// skipped.
    pub(super) fn inherit_condition(
        &self,
        def: &ClassDef,
        parent: ClassId,
        table: TableId,
        own: &IndexMap<String, ColumnId>,
        args: &MapperArgs,
    ) -> Result<Vec<(ColumnId, ColumnId)>> {
        let parent_tables = self.table_chain(parent);

        if let Some(condition) = &args.inherit_condition {
            let parent_mapper = self.mapper(parent)?;

            return condition
                .pairs
                .iter()
                .map(|(child, parent_ref)| {
                    let child = self.resolve_column_ref(
                        &def.name,
                        |key| own.get(key).copied(),
                        &[table],
                        None,
                        child,
                    )?;
                    let parent_column = self.resolve_column_ref(
                        self.class_name(parent),
                        |key| {
                            parent_mapper
                                .properties
                                .get(key)
                                .and_then(Property::as_column)
                                .map(|property| property.column())
                        },
                        &parent_tables,
                        None,
                        parent_ref,
                    )?;
                    Ok((parent_column, child))
                })
                .collect();
        }

        let mut candidates = vec![];

        for column in &self.table(table).primary_key {
            for fk in &self.column(*column).foreign_keys {
                let Some(target) = self.resolve_fk(&fk.target) else {
                    log::debug!(
                        "skipping unresolved foreign key {:?} of {}",
                        fk.target,
                        self.db.qualified_name(*column)
                    );
                    continue;
                };

                let target_column = self.column(target);
                let in_parent = target_column
                    .table()
                    .is_some_and(|table| parent_tables.contains(&table));

                if target_column.primary_key && in_parent && !candidates.contains(&(target, *column))
                {
                    candidates.push((target, *column));
                }
            }
        }

        if candidates.len() == 1 {
            return Ok(candidates);
        }

        let parent_table = parent_tables
            .first()
            .map(|table| self.table(*table).name.clone())
            .unwrap_or_else(|| self.class_name(parent).to_string());

        Err(Error::ambiguous_join(
            self.table(table).name.clone(),
            parent_table,
            candidates.len(),
        ))
    }
}
