use crate::{
    schema::{
        app::{ClassDef, ColumnRef, DeclContext, Discriminator, MapperArgs},
        db::{ColumnId, TableId},
        mapping::{Mapper, Property, UnionId},
    },
    Error, Metadata, Result,
};

impl Metadata {
    /// Binds the discriminator column of a class.
    ///
    /// Subclasses inherit the discriminator of their root; concrete classes
    /// start over. A deferred discriminator is evaluated here, once the
    /// class's table exists.
    pub(super) fn bind_discriminator(
        &self,
        def: &ClassDef,
        mapper: &Mapper,
        args: &MapperArgs,
    ) -> Result<Option<ColumnId>> {
        let inherited = match (&mapper.inheritance, mapper.parent) {
            (_, None) => None,
            (inheritance, _) if inheritance.is_concrete() => None,
            (_, Some(parent)) => self.mapper(parent)?.discriminator,
        };

        let Some(discriminator) = &args.polymorphic_on else {
            return Ok(inherited);
        };

        let column_ref = match discriminator {
            Discriminator::Column(column_ref) => column_ref.clone(),
            Discriminator::Deferred(f) => f(&DeclContext {
                metadata: self,
                class_name: &def.name,
                mapped_base: mapper.parent,
                table: mapper
                    .local_table
                    .or_else(|| self.nearest_table(mapper.parent)),
            })?,
        };

        let column = self.resolve_column_ref(
            &def.name,
            |key| attr_column(mapper, key),
            &self.mapper_tables(mapper),
            mapper.union,
            &column_ref,
        )?;

        match inherited {
            Some(inherited) if inherited != column => Err(Error::configuration(format!(
                "class '{}' can't use {} as its discriminator; it inherits discriminator {} \
                 from its base",
                def.name,
                self.db.qualified_name(column),
                self.db.qualified_name(inherited)
            ))),
            _ => {
                log::debug!(
                    "class {} discriminates on {}",
                    def.name,
                    self.db.qualified_name(column)
                );
                Ok(Some(column))
            }
        }
    }

    /// Resolves an attribute key of the class being mapped to its
    /// authoritative column.
    pub(super) fn resolve_attr_column(&self, class_name: &str, mapper: &Mapper, key: &str) -> Result<ColumnId> {
        attr_column(mapper, key).ok_or_else(|| {
            Error::configuration(format!(
                "class '{class_name}' has no column attribute '{key}'"
            ))
        })
    }

    /// Resolves a column reference made from within the declaration of
    /// `class_name`.
    ///
    /// Attribute references go through `attr`; name references search
    /// `tables` in order, then `union`.
    pub(super) fn resolve_column_ref(
        &self,
        class_name: &str,
        attr: impl Fn(&str) -> Option<ColumnId>,
        tables: &[TableId],
        union: Option<UnionId>,
        column_ref: &ColumnRef,
    ) -> Result<ColumnId> {
        match column_ref {
            ColumnRef::Attr(key) => attr(key).ok_or_else(|| {
                Error::configuration(format!(
                    "class '{class_name}' has no column attribute '{key}'"
                ))
            }),
            ColumnRef::Name(name) => tables
                .iter()
                .find_map(|table| self.db.column_named(*table, name))
                .or_else(|| union.and_then(|union| self.union(union).column_named(&self.db, name)))
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "class '{class_name}' has no column named '{name}'"
                    ))
                }),
            ColumnRef::Id(id) if id.0 < self.db.columns.len() => Ok(*id),
            ColumnRef::Id(id) => Err(Error::configuration(format!(
                "class '{class_name}' refers to unknown column {id:?}"
            ))),
        }
    }

    /// Tables a class can refer to columns of: its own, then those it
    /// inherits rows from.
    fn mapper_tables(&self, mapper: &Mapper) -> Vec<TableId> {
        let mut tables: Vec<_> = mapper.local_table.into_iter().collect();

        if !mapper.inheritance.is_concrete() {
            if let Some(parent) = mapper.parent {
                tables.extend(self.table_chain(parent));
            }
        }

        tables
    }
}

fn attr_column(mapper: &Mapper, key: &str) -> Option<ColumnId> {
    mapper
        .properties
        .get(key)
        .and_then(Property::as_column)
        .map(|property| property.column())
}
