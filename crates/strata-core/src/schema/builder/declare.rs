use super::hierarchy::{self, Resolved};
use crate::{
    schema::{
        app::{Attr, ClassDef, ClassId, ClassKind, DeclContext, MapperArgs, TableSource},
        db::{ColumnId, Constraint, TableId},
        mapping::{ColumnProperty, Inheritance, Mapper, Property},
        Class, ConcreteState,
    },
    Error, Metadata, Result,
};
use indexmap::IndexMap;

impl Metadata {
    pub(crate) fn declare_class(&mut self, def: ClassDef) -> Result<ClassId> {
        let id = ClassId(self.classes.len());

        if let Some(base) = def.bases.iter().find(|base| base.0 >= self.classes.len()) {
            return Err(Error::configuration(format!(
                "base {base:?} of class '{}' is not declared",
                def.name
            )));
        }

        if self.class_by_name(&def.name).is_some() {
            log::warn!(
                "class '{}' is already declared in this metadata; the new declaration is \
                 a distinct class with the same name",
                def.name
            );
        }

        let resolved = hierarchy::resolve(self, &def)?;

        log::debug!(
            "declaring class {} ({:?}); mapped base = {:?}",
            def.name,
            def.kind,
            resolved.mapped_base.map(|id| self.class_name(id))
        );

        self.classes.push(Class {
            def: def.clone(),
            mapper: None,
        });

        if !def.is_mapped() {
            return Ok(id);
        }

        let mapper = self.build_mapper(id, &def, &resolved)?;
        self.install_mapper(mapper);

        Ok(id)
    }

    fn build_mapper(&mut self, id: ClassId, def: &ClassDef, resolved: &Resolved) -> Result<Mapper> {
        let base = resolved.mapped_base;

        let args = def.mapper_args.resolve(&DeclContext {
            metadata: self,
            class_name: &def.name,
            mapped_base: base,
            table: self.nearest_table(base),
        })?;

        let inheritance = self.classify(def, resolved, &args)?;
        let mut mapper = Mapper::new(id, base, inheritance);
        mapper.polymorphic_identity = args.polymorphic_identity.clone();

        if def.kind == ClassKind::AbstractConcreteBase {
            // Mapped onto a union of its subclasses once configured
            self.set_concrete(id, ConcreteState::Pending { subclasses: vec![] });
            return Ok(mapper);
        }

        let attrs = self.collect_attrs(def, resolved, &mapper)?;

        let own = if mapper.inheritance.is_single() {
            self.map_single(def, &mapper, &attrs)?
        } else {
            self.map_table(def, &mut mapper, &attrs, &args)?
        };

        self.build_properties(def, &mut mapper, &attrs, own, &args)?;
        mapper.discriminator = self.bind_discriminator(def, &mapper, &args)?;

        if let Some(key) = &args.version_id_col {
            mapper.version_id_col = Some(self.resolve_attr_column(&def.name, &mapper, key)?);
        }

        mapper.concrete_root = self.concrete_root_of(def, resolved, &mapper)?;
        self.check_identity(def, &mapper)?;

        Ok(mapper)
    }

    /// Decides how the class relates to its mapped base.
    fn classify(&self, def: &ClassDef, resolved: &Resolved, args: &MapperArgs) -> Result<Inheritance> {
        let name = &def.name;

        match (def.kind, resolved.mapped_base, def.has_table()) {
            (ClassKind::AbstractConcreteBase, Some(base), _) => Err(Error::configuration(format!(
                "abstract concrete base '{name}' can't inherit from mapped class '{}'",
                self.class_name(base)
            ))),
            (ClassKind::AbstractConcreteBase, None, true) => Err(Error::configuration(format!(
                "abstract concrete base '{name}' can't define a table of its own"
            ))),
            (ClassKind::AbstractConcreteBase, None, false) => Ok(Inheritance::Base),
            (ClassKind::ConcreteBase, Some(base), _) => Err(Error::configuration(format!(
                "concrete base '{name}' must be the root of its hierarchy, but inherits from '{}'",
                self.class_name(base)
            ))),
            (_, None, false) => match resolved.abstract_concrete_base {
                Some(acb) => Err(Error::configuration(format!(
                    "class '{name}' inherits from abstract concrete base '{}' and must define \
                     its own table",
                    self.class_name(acb)
                ))),
                None => Err(Error::configuration(format!(
                    "class '{name}' does not have a table name or explicit table, \
                     and does not inherit from a mapped class"
                ))),
            },
            (_, None, true) => Ok(Inheritance::Base),
            (_, Some(_), false) if args.concrete => Err(Error::configuration(format!(
                "class '{name}' can't be mapped as concrete without a table of its own"
            ))),
            (_, Some(_), false) => Ok(Inheritance::Single),
            (_, Some(_), true) if args.concrete => Ok(Inheritance::Concrete),
            (_, Some(_), true) => Ok(Inheritance::Joined { on: vec![] }),
        }
    }

    /// Gathers the attributes a class declares itself or picks up from
    /// unmapped ancestors, evaluating declared attributes.
    fn collect_attrs(
        &self,
        def: &ClassDef,
        resolved: &Resolved,
        mapper: &Mapper,
    ) -> Result<IndexMap<String, Attr>> {
        // Concrete classes inherit no bindings, so they also materialize
        // attributes of unmapped classes above their mapped base.
        let contributors = if mapper.inheritance.is_concrete() {
            &resolved.all_unmapped
        } else {
            &resolved.local_unmapped
        };

        let mut declared = IndexMap::new();
        for contributor in contributors {
            for (key, attr) in &self.class(*contributor).attrs {
                declared.insert(key.clone(), attr.clone());
            }
        }

        for (key, attr) in &def.attrs {
            declared.insert(key.clone(), attr.clone());
        }

        let cx = DeclContext {
            metadata: self,
            class_name: &def.name,
            mapped_base: mapper.parent,
            table: match mapper.inheritance {
                Inheritance::Single => self.nearest_table(mapper.parent),
                _ => None,
            },
        };

        let mut attrs = IndexMap::new();
        for (key, attr) in declared {
            let attr = self.evaluate_attr(&cx, &key, attr)?;
            attrs.insert(key, attr);
        }

        Ok(attrs)
    }

    pub(super) fn evaluate_attr(&self, cx: &DeclContext<'_>, key: &str, attr: Attr) -> Result<Attr> {
        let Attr::Declared(f) = attr else {
            return Ok(attr);
        };

        match f(cx)? {
            Attr::Declared(_) => Err(Error::configuration(format!(
                "declared attribute '{key}' of class '{}' must produce a column",
                cx.class_name
            ))),
            attr => Ok(attr),
        }
    }

    /// Maps a class that owns a table, a joined or concrete subclass or a
    /// root. Returns the class's own attribute bindings.
    fn map_table(
        &mut self,
        def: &ClassDef,
        mapper: &mut Mapper,
        attrs: &IndexMap<String, Attr>,
        args: &MapperArgs,
    ) -> Result<IndexMap<String, ColumnId>> {
        let own = match def.table {
            Some(TableSource::Table(table)) => {
                mapper.local_table = Some(table);
                let columns = self.table(table).columns.clone();
                self.map_explicit_columns(def, &columns, attrs, args)?
            }
            Some(TableSource::Union(union)) => {
                mapper.union = Some(union);
                let columns = self.union(union).columns.clone();
                self.map_explicit_columns(def, &columns, attrs, args)?
            }
            None => {
                let Some(table_name) = &def.table_name else {
                    return Err(Error::configuration(format!(
                        "class '{}' has no table",
                        def.name
                    )));
                };

                let table = self.db.create_table(&self.config.table_name(table_name))?;
                mapper.local_table = Some(table);

                // Joined subclasses may bind columns of their ancestors' tables
                let allowed = match (&mapper.inheritance, mapper.parent) {
                    (Inheritance::Joined { .. }, Some(parent)) => self.table_chain(parent),
                    _ => vec![],
                };

                let mut own = IndexMap::new();
                for (key, attr) in attrs {
                    let column = self.bind_attr(&def.name, table, key, attr, &allowed, false)?;
                    own.insert(key.clone(), column);
                }
                own
            }
        };

        if let Some(table) = mapper.local_table {
            if def.table_args.is_some() {
                self.db.table_mut(table).args = def.table_args.clone();
            }
            self.attach_constraints(&def.name, table, def)?;

            if !mapper.inheritance.is_joined() && self.table(table).primary_key.is_empty() {
                return Err(Error::configuration(format!(
                    "mapper for class '{}' could not assemble any primary key columns for \
                     mapped table '{}'",
                    def.name,
                    self.table(table).name
                )));
            }
        }

        if mapper.inheritance.is_joined() {
            if let (Some(parent), Some(table)) = (mapper.parent, mapper.local_table) {
                let on = self.inherit_condition(def, parent, table, &own, args)?;
                mapper.inheritance = Inheritance::Joined { on };
            }
        }

        Ok(own)
    }

    /// Binds the columns of an explicitly supplied table or union. Every
    /// column is mapped, under its name plus the column prefix unless an
    /// attribute binds it under another key.
    fn map_explicit_columns(
        &self,
        def: &ClassDef,
        columns: &[ColumnId],
        attrs: &IndexMap<String, Attr>,
        args: &MapperArgs,
    ) -> Result<IndexMap<String, ColumnId>> {
        let mut renamed = IndexMap::new();

        for (key, attr) in attrs {
            match attr {
                Attr::Existing(column) if columns.contains(column) => {
                    renamed.insert(*column, key.clone());
                }
                Attr::Existing(column) => {
                    return Err(Error::configuration(format!(
                        "column '{}' bound to attribute '{key}' is not part of the table class \
                         '{}' is mapped onto",
                        self.db.qualified_name(*column),
                        def.name
                    )));
                }
                _ => {
                    return Err(Error::configuration(format!(
                        "can't add additional column '{key}' when mapping class '{}' onto an \
                         explicit table",
                        def.name
                    )));
                }
            }
        }

        let prefix = args.column_prefix.as_deref().unwrap_or("");
        let mut own = IndexMap::new();

        for column in columns {
            let key = match renamed.get(column) {
                Some(key) => key.clone(),
                None => format!("{prefix}{}", self.column(*column).name),
            };
            own.insert(key, *column);
        }

        Ok(own)
    }

    pub(super) fn attach_constraints(&mut self, class_name: &str, table: TableId, def: &ClassDef) -> Result<()> {
        for constraint in &def.constraints {
            let constraint = match constraint {
                crate::schema::app::ConstraintDef::Unique { name, columns } => {
                    let columns = columns
                        .iter()
                        .map(|column| {
                            self.db.column_named(table, column).ok_or_else(|| {
                                Error::configuration(format!(
                                    "unique constraint of class '{class_name}' names unknown \
                                     column '{column}' of table '{}'",
                                    self.table(table).name
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;

                    Constraint::Unique {
                        name: name.clone(),
                        columns,
                    }
                }
                crate::schema::app::ConstraintDef::Check { name, sql } => Constraint::Check {
                    name: name.clone(),
                    sql: sql.clone(),
                },
            };

            self.db.table_mut(table).constraints.push(constraint);
        }

        Ok(())
    }

    /// Assembles the attribute bindings of the class from what it inherits
    /// and what it declares.
    fn build_properties(
        &self,
        def: &ClassDef,
        mapper: &mut Mapper,
        attrs: &IndexMap<String, Attr>,
        own: IndexMap<String, ColumnId>,
        args: &MapperArgs,
    ) -> Result<()> {
        let parent = match mapper.parent {
            Some(parent) => Some(self.mapper(parent)?),
            None => None,
        };

        let mut properties = match (&mapper.inheritance, parent) {
            (Inheritance::Single | Inheritance::Joined { .. }, Some(parent)) => {
                parent.properties.clone()
            }
            _ => IndexMap::new(),
        };

        for (key, column) in own {
            if !args.includes(&key) {
                continue;
            }

            let deferred = attrs.get(&key).is_some_and(Attr::is_deferred);

            match properties.get_mut(&key).and_then(Property::as_column_mut) {
                Some(existing) if existing.columns.contains(&column) => {}
                Some(existing) if mapper.inheritance.is_joined() => {
                    if !self.is_fk_linked(column, &existing.columns, &mapper.inheritance) {
                        log::warn!(
                            "implicitly combining column {} with column {} under attribute \
                             '{key}' of class '{}'; declare the attribute explicitly on the \
                             subclass to silence this warning",
                            self.db.qualified_name(existing.columns[0]),
                            self.db.qualified_name(column),
                            def.name
                        );
                    }

                    existing.columns.insert(0, column);
                    existing.deferred |= deferred;
                }
                _ => {
                    properties.insert(key, Property::Column(ColumnProperty {
                        columns: vec![column],
                        deferred,
                    }));
                }
            }
        }

        if let (Inheritance::Concrete, Some(parent)) = (&mapper.inheritance, parent) {
            for key in parent.properties.keys() {
                if !properties.contains_key(key) && !def.computed.contains_key(key) {
                    properties.insert(key.clone(), Property::ConcreteInherited);
                }
            }
        }

        for (key, computed) in &def.computed {
            properties.insert(key.clone(), Property::Computed(computed.clone()));
        }

        properties.retain(|key, property| property.as_column().is_none() || args.includes(key));
        mapper.properties = properties;

        Ok(())
    }

    /// Returns `true` if `column` references one of `columns`, directly or
    /// through the inherit condition.
    fn is_fk_linked(&self, column: ColumnId, columns: &[ColumnId], inheritance: &Inheritance) -> bool {
        if let Inheritance::Joined { on } = inheritance {
            if on
                .iter()
                .any(|(parent, child)| *child == column && columns.contains(parent))
            {
                return true;
            }
        }

        self.column(column)
            .foreign_keys
            .iter()
            .filter_map(|fk| self.resolve_fk(&fk.target))
            .any(|target| columns.contains(&target))
    }

    fn concrete_root_of(
        &self,
        def: &ClassDef,
        resolved: &Resolved,
        mapper: &Mapper,
    ) -> Result<Option<ClassId>> {
        Ok(match (&mapper.inheritance, mapper.parent) {
            (Inheritance::Base, None)
                if mapper.local_table.is_some() && def.kind != ClassKind::ConcreteBase =>
            {
                resolved.abstract_concrete_base
            }
            (Inheritance::Concrete, Some(parent)) => {
                if self.class(parent).kind == ClassKind::ConcreteBase {
                    Some(parent)
                } else {
                    self.mapper(parent)?.concrete_root
                }
            }
            _ => None,
        })
    }

    /// Rejects or warns about a polymorphic identity already used within the
    /// same hierarchy.
    fn check_identity(&self, def: &ClassDef, mapper: &Mapper) -> Result<()> {
        let Some(identity) = &mapper.polymorphic_identity else {
            return Ok(());
        };

        let root = match (mapper.parent, mapper.concrete_root) {
            (Some(parent), _) => self.polymorphic_root(parent),
            (None, Some(root)) => root,
            (None, None) => return Ok(()),
        };

        let Some(existing) = self.identities(root).get(identity).copied() else {
            return Ok(());
        };

        if self.config.reject_duplicate_identities {
            return Err(Error::configuration(format!(
                "polymorphic identity {identity} of class '{}' is already used by class '{}'",
                def.name,
                self.class_name(existing)
            )));
        }

        log::warn!(
            "reassigning polymorphic identity {identity} from class '{}' to class '{}'; \
             rows with this identity now load as '{}'",
            self.class_name(existing),
            def.name,
            def.name
        );

        Ok(())
    }

    fn install_mapper(&mut self, mapper: Mapper) {
        let id = mapper.class;

        if let Some(parent) = mapper.parent {
            self.mapper_mut(parent).children.push(id);
        }

        if let Some(root) = mapper.concrete_root {
            self.register_concrete_subclass(root, id);
        }

        if self.class(id).kind == ClassKind::ConcreteBase && !self.concrete.contains_key(&id) {
            self.set_concrete(id, ConcreteState::Pending { subclasses: vec![] });
        }

        log::debug!(
            "mapped class {} as {:?} with {} attributes",
            self.class_name(id),
            mapper.inheritance,
            mapper.properties.len()
        );

        self.class_mut(id).mapper = Some(mapper);
    }

    fn register_concrete_subclass(&mut self, root: ClassId, class: ClassId) {
        match self.concrete_mut(root) {
            Some(ConcreteState::Pending { subclasses }) => subclasses.push(class),
            Some(ConcreteState::Configured {
                subclasses, stale, ..
            }) => {
                subclasses.push(class);
                *stale = true;
            }
            None => {
                self.set_concrete(
                    root,
                    ConcreteState::Pending {
                        subclasses: vec![class],
                    },
                );
            }
        }
    }
}
