use crate::{
    schema::{
        app::{Attr, ClassId, ClassKind, DeclContext},
        db::{ColumnId, ColumnOwner, FkTarget, TableId},
        mapping::{ColumnProperty, Inheritance, Property},
        ConcreteState,
    },
    Error, Metadata, Result,
};

impl Metadata {
    /// Materializes `attr` on `table` and returns the bound column.
    ///
    /// An existing column is bound as is when it already belongs to `table`
    /// or to one of the `allowed` ancestor tables. `single` applies the
    /// restrictions of single-table subclasses.
    pub(super) fn bind_attr(
        &mut self,
        class_name: &str,
        table: TableId,
        key: &str,
        attr: &Attr,
        allowed: &[TableId],
        single: bool,
    ) -> Result<ColumnId> {
        match attr {
            Attr::Column(def) => {
                let column = self.db.new_column(key, def);
                self.attach_new(class_name, table, column, single)?;
                Ok(column)
            }
            Attr::Existing(column) => match self.column(*column).owner {
                ColumnOwner::Unattached => {
                    self.attach_new(class_name, table, *column, single)?;
                    Ok(*column)
                }
                ColumnOwner::Table(owner) if owner == table || allowed.contains(&owner) => {
                    Ok(*column)
                }
                _ => Err(Error::configuration(format!(
                    "column '{}' bound to attribute '{key}' of class '{class_name}' belongs \
                     to another table",
                    self.db.qualified_name(*column)
                ))),
            },
            Attr::Declared(_) => Err(Error::configuration(format!(
                "declared attribute '{key}' of class '{class_name}' was not evaluated"
            ))),
        }
    }

    /// Adds an unattached column to `table`, rejecting name conflicts and,
    /// for single-table subclasses, new primary key columns.
    fn attach_new(&mut self, class_name: &str, table: TableId, column: ColumnId, single: bool) -> Result<()> {
        let name = &self.column(column).name;

        if let Some(existing) = self.db.column_named(table, name) {
            return Err(Error::column_conflict(
                class_name,
                name.clone(),
                self.db.qualified_name(existing),
            ));
        }

        if single && self.column(column).primary_key {
            return Err(Error::configuration(format!(
                "can't place primary key column '{name}' on single-table subclass \
                 '{class_name}', which has no table of its own; place primary key columns \
                 on the base class"
            )));
        }

        self.db.attach(table, column);
        Ok(())
    }

    /// Adds a column to a table created outside of a class declaration.
    pub(crate) fn attach_column(&mut self, table: TableId, column: ColumnId) -> Result<()> {
        let name = &self.column(column).name;

        if self.db.column_named(table, name).is_some() {
            return Err(Error::configuration(format!(
                "table '{}' already has a column named '{name}'",
                self.table(table).name
            )));
        }

        self.db.attach(table, column);
        Ok(())
    }

    /// Resolves a foreign key target, honoring the table name prefix.
    pub(crate) fn resolve_fk(&self, target: &FkTarget) -> Option<ColumnId> {
        self.db.resolve_fk(target).or_else(|| {
            let (table, column) = target.split_name()?;
            let table = self.db.table_by_name(&self.config.table_name(table))?;
            self.db.column_named(table.id, column)
        })
    }

    pub(crate) fn add_class_attribute(&mut self, class: ClassId, key: &str, attr: Attr) -> Result<()> {
        let def = self.class(class).clone();
        log::debug!("adding attribute {key} to class {}", def.name);

        if !def.is_mapped() {
            // Only classes declared from now on pick it up
            self.class_mut(class).def.attrs.insert(key.to_string(), attr);
            return Ok(());
        }

        if def.kind == ClassKind::AbstractConcreteBase {
            let subclasses = self
                .concrete
                .get(&class)
                .map(|state| state.subclasses().to_vec())
                .unwrap_or_default();

            self.class_mut(class)
                .def
                .attrs
                .insert(key.to_string(), attr.clone());

            for subclass in subclasses {
                self.add_class_attribute(subclass, key, attr.clone())?;
            }

            self.mark_stale(class);
            return Ok(());
        }

        let mapper = self.mapper(class)?.clone();

        let attr = {
            let cx = DeclContext {
                metadata: self,
                class_name: &def.name,
                mapped_base: mapper.parent,
                table: self.nearest_table(Some(class)),
            };
            self.evaluate_attr(&cx, key, attr)?
        };

        let allowed = match (&mapper.inheritance, mapper.parent) {
            (Inheritance::Single | Inheritance::Joined { .. }, Some(parent)) => self.table_chain(parent),
            _ => vec![],
        };

        let column = match (&mapper.inheritance, mapper.local_table) {
            (Inheritance::Single, _) => {
                let Some(table) = self.nearest_table(mapper.parent) else {
                    return Err(Error::configuration(format!(
                        "class '{}' has no table to add attribute '{key}' to",
                        def.name
                    )));
                };
                self.bind_attr(&def.name, table, key, &attr, &allowed, true)?
            }
            (_, Some(table)) => self.bind_attr(&def.name, table, key, &attr, &allowed, false)?,
            (_, None) => {
                return Err(Error::configuration(format!(
                    "can't add column attribute '{key}' to class '{}', which is mapped onto a \
                     union",
                    def.name
                )));
            }
        };

        let mut property = ColumnProperty {
            columns: vec![column],
            deferred: attr.is_deferred(),
        };

        if let (Inheritance::Joined { .. }, Some(Property::Column(existing))) =
            (&mapper.inheritance, mapper.properties.get(key))
        {
            property
                .columns
                .extend(existing.columns.iter().copied().filter(|id| *id != column));
        }

        self.mapper_mut(class)
            .properties
            .insert(key.to_string(), Property::Column(property.clone()));
        self.propagate_attribute(class, key, &property);

        self.class_mut(class).def.attrs.insert(key.to_string(), attr);

        if def.kind == ClassKind::ConcreteBase {
            self.mark_stale(class);
        }

        if let Some(root) = mapper.concrete_root {
            self.mark_stale(root);
        }

        Ok(())
    }

    /// Makes a newly added attribute visible on every class inheriting
    /// bindings from `class`.
    fn propagate_attribute(&mut self, class: ClassId, key: &str, property: &ColumnProperty) {
        let children = self.mapper_mut(class).children.clone();

        for child in children {
            let mapper = self.mapper_mut(child);

            if mapper.inheritance.is_concrete() {
                mapper
                    .properties
                    .entry(key.to_string())
                    .or_insert(Property::ConcreteInherited);
                continue;
            }

            let joined = mapper.inheritance.is_joined();

            let inherited = match mapper.properties.get_mut(key) {
                None => {
                    mapper
                        .properties
                        .insert(key.to_string(), Property::Column(property.clone()));
                    property.clone()
                }
                Some(Property::Column(existing)) if joined => {
                    // The child's own columns stay ahead of inherited ones
                    let mut columns: Vec<_> = existing
                        .columns
                        .iter()
                        .copied()
                        .filter(|column| !property.columns.contains(column))
                        .collect();
                    columns.extend(property.columns.iter().copied());

                    existing.columns = columns;
                    existing.deferred |= property.deferred;
                    existing.clone()
                }
                // Overridden by the child
                Some(_) => continue,
            };

            self.propagate_attribute(child, key, &inherited);
        }
    }

    pub(crate) fn mark_stale(&mut self, root: ClassId) {
        if let Some(ConcreteState::Configured { stale, .. }) = self.concrete_mut(root) {
            *stale = true;
        }
    }
}
