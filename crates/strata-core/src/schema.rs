pub mod app;

mod builder;
pub use builder::Builder;

mod configure;
pub(crate) use configure::ConcreteState;

pub mod db;

pub mod mapping;

use crate::{stmt::Value, Error, Result};
use app::{Attr, ClassDef, ClassId, ClassKind, ColumnDef};
use db::{ColumnId, Table, TableId};
use indexmap::IndexMap;
use mapping::{ClassMapping, Mapper, PolymorphicUnion, Property, Selectable, UnionId};

/// The schema context every class is declared into.
///
/// `Metadata` owns the column and table registry, the declared classes and
/// their resolved mappers, the synthesized polymorphic unions and the
/// configuration state of every concrete hierarchy. There is no process-wide
/// registry: two `Metadata` values never observe each other's classes.
///
/// Every mutating operation is atomic. When a declaration or a call to
/// [`Metadata::configure`] fails, the metadata is left exactly as it was
/// before the call.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Options the metadata was built with
    pub(crate) config: builder::Config,

    /// Columns and tables
    pub(crate) db: db::Schema,

    /// Declared classes, indexed by `ClassId`
    pub(crate) classes: Vec<Class>,

    /// Polymorphic unions, indexed by `UnionId`
    pub(crate) unions: Vec<PolymorphicUnion>,

    /// Configuration state of each abstract or concrete base, keyed by the
    /// base class.
    pub(crate) concrete: IndexMap<ClassId, ConcreteState>,

    /// Set while a fallible operation is in progress
    savepoint: Option<Savepoint>,
}

/// Prior state of the classes, unions and concrete states touched since the
/// current operation started. The column registry keeps its own.
#[derive(Debug, Clone)]
struct Savepoint {
    classes: usize,
    unions: usize,
    touched_classes: IndexMap<ClassId, Class>,
    touched_unions: IndexMap<UnionId, PolymorphicUnion>,
    touched_concrete: IndexMap<ClassId, Option<ConcreteState>>,
}

/// A declared class: its declaration and, once resolved, its mapper.
///
/// Unmapped classes (abstract classes and mixins) never get a mapper.
#[derive(Debug, Clone)]
pub(crate) struct Class {
    pub(crate) def: ClassDef,
    pub(crate) mapper: Option<Mapper>,
}

impl Metadata {
    pub fn new() -> Metadata {
        Builder::new().build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Declares a class, resolving its place in the hierarchy and
    /// synthesizing the schema it needs.
    pub fn declare(&mut self, def: ClassDef) -> Result<ClassId> {
        self.atomically(|metadata| metadata.declare_class(def))
    }

    /// Adds an attribute to a class after it has been declared.
    ///
    /// Descendants that inherit the class's bindings observe the new
    /// attribute.
    pub fn add_attribute(&mut self, class: ClassId, key: &str, attr: impl Into<Attr>) -> Result<()> {
        let attr = attr.into();
        self.atomically(|metadata| metadata.add_class_attribute(class, key, attr))
    }

    /// Finalizes every pending mapping.
    ///
    /// Resolves foreign keys declared by name and (re)synthesizes the
    /// polymorphic union of every abstract or concrete base that is pending
    /// or has gained subclasses since it was last configured. Calling it
    /// again without intervening declarations is a no-op.
    pub fn configure(&mut self) -> Result<()> {
        self.atomically(|metadata| metadata.configure_all())
    }

    /// Creates a table outside of any class declaration.
    ///
    /// Classes can then be mapped onto it with [`ClassDef::table_ref`].
    pub fn create_table<'a>(
        &mut self,
        name: &str,
        columns: impl IntoIterator<Item = (&'a str, ColumnDef)>,
    ) -> Result<TableId> {
        let columns: Vec<_> = columns.into_iter().collect();

        self.atomically(|metadata| {
            let name = metadata.config.table_name(name);
            let table = metadata.db.create_table(&name)?;

            for (key, def) in columns {
                let column = metadata.db.new_column(key, &def);
                metadata.attach_column(table, column)?;
            }

            Ok(table)
        })
    }

    /// Creates a column that is not yet part of any table.
    ///
    /// Binding the returned id with [`Attr::Existing`] from several classes
    /// shares one column between them.
    pub fn new_column(&mut self, name: &str, def: ColumnDef) -> ColumnId {
        self.db.new_column(name, &def)
    }

    /// Builds a polymorphic union from explicitly supplied tables.
    ///
    /// Arms appear in the order given. When `discriminator` is set, each arm
    /// tags its rows with the identity it was supplied with.
    pub fn polymorphic_union<'a, V: Into<Value>>(
        &mut self,
        tables: impl IntoIterator<Item = (V, &'a str)>,
        discriminator: Option<&str>,
        alias: &str,
    ) -> Result<UnionId> {
        let mut leaves = vec![];

        for (identity, name) in tables {
            let Some(table) = self.db.table_by_name(&self.config.table_name(name)) else {
                return Err(Error::configuration(format!("unknown table '{name}'")));
            };
            leaves.push((table.id, Some(identity.into())));
        }

        self.atomically(|metadata| {
            let id = UnionId(metadata.unions.len());
            let union = mapping::union::synthesize(
                &mut metadata.db,
                id,
                alias,
                &leaves,
                discriminator,
                None,
            )?;
            metadata.unions.push(union);
            Ok(id)
        })
    }

    /// Returns the resolved mapping of a class: its queryable attribute
    /// keys, selectable, discriminator and identity map.
    pub fn mapping(&self, class: ClassId) -> Result<ClassMapping> {
        ClassMapping::new(self, class)
    }

    /// Returns the property bound to `key` at the class level.
    pub fn class_attribute(&self, class: ClassId, key: &str) -> Result<&Property> {
        self.check_configured(class)?;
        let mapper = self.mapper(class)?;

        match mapper.properties.get(key) {
            None => Err(Error::attribute_not_found(self.class_name(class), key)),
            Some(Property::ConcreteInherited) => {
                Err(Error::attribute_not_implemented(self.class_name(class), key))
            }
            Some(property) => Ok(property),
        }
    }

    /// Returns the columns bound to a column attribute, most authoritative
    /// first.
    pub fn attribute_columns(&self, class: ClassId, key: &str) -> Result<&[ColumnId]> {
        match self.class_attribute(class, key)? {
            Property::Column(property) => Ok(&property.columns),
            _ => Err(Error::configuration(format!(
                "attribute '{key}' of '{}' is not a column attribute",
                self.class_name(class)
            ))),
        }
    }

    /// Returns `true` if any mapped ancestor of `class` owns a table.
    pub fn has_inherited_table(&self, class: ClassId) -> bool {
        let parent = self.classes[class.0]
            .mapper
            .as_ref()
            .and_then(|mapper| mapper.parent);

        self.has_table_in_chain(parent)
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes.get(id.0).expect("invalid class ID").def
    }

    pub fn class_name(&self, id: ClassId) -> &str {
        &self.class(id).name
    }

    /// Finds the most recently declared class named `name`.
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .rposition(|class| class.def.name == name)
            .map(ClassId)
    }

    pub fn mapper(&self, class: ClassId) -> Result<&Mapper> {
        let class_def = self.class(class);

        self.classes[class.0].mapper.as_ref().ok_or_else(|| {
            Error::configuration(format!("class '{}' is not mapped", class_def.name))
        })
    }

    pub fn table(&self, id: TableId) -> &Table {
        self.db.table(id)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.db
            .table_by_name(name)
            .or_else(|| self.db.table_by_name(&self.config.table_name(name)))
    }

    pub fn column(&self, id: ColumnId) -> &db::Column {
        self.db.column(id)
    }

    pub fn union(&self, id: UnionId) -> &PolymorphicUnion {
        self.unions.get(id.0).expect("invalid union ID")
    }

    pub fn schema(&self) -> &db::Schema {
        &self.db
    }

    /// Runs `f`, restoring the metadata to its prior state if it fails.
    ///
    /// Only entries `f` touches are copied, so the cost is bounded by the
    /// part of the schema the operation works on.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Metadata) -> Result<T>) -> Result<T> {
        if self.savepoint.is_some() {
            return f(self);
        }

        self.savepoint = Some(Savepoint {
            classes: self.classes.len(),
            unions: self.unions.len(),
            touched_classes: IndexMap::new(),
            touched_unions: IndexMap::new(),
            touched_concrete: IndexMap::new(),
        });
        self.db.begin();

        let ret = f(self);

        if ret.is_ok() {
            self.savepoint = None;
            self.db.commit();
        } else {
            self.rollback();
        }

        ret
    }

    fn rollback(&mut self) {
        self.db.rollback();

        let Some(savepoint) = self.savepoint.take() else {
            return;
        };

        self.classes.truncate(savepoint.classes);
        self.unions.truncate(savepoint.unions);

        for (id, class) in savepoint.touched_classes {
            self.classes[id.0] = class;
        }

        for (id, union) in savepoint.touched_unions {
            self.unions[id.0] = union;
        }

        for (root, state) in savepoint.touched_concrete {
            match state {
                Some(state) => {
                    self.concrete.insert(root, state);
                }
                None => {
                    self.concrete.shift_remove(&root);
                }
            }
        }
    }

    /// Fails with a pending-mapping error if `class` is an abstract concrete
    /// base that has not been configured yet.
    pub(crate) fn check_configured(&self, class: ClassId) -> Result<()> {
        if self.class(class).kind != ClassKind::AbstractConcreteBase {
            return Ok(());
        }

        match self.concrete.get(&class) {
            Some(ConcreteState::Configured { .. }) => Ok(()),
            Some(ConcreteState::Pending { subclasses }) => Err(Error::mapping_pending(
                self.class_name(class),
                subclasses
                    .iter()
                    .map(|id| self.class_name(*id).to_string())
                    .collect(),
            )),
            None => Err(Error::mapping_pending(self.class_name(class), vec![])),
        }
    }

    pub(crate) fn mapper_opt(&self, class: ClassId) -> Option<&Mapper> {
        self.classes.get(class.0).and_then(|class| class.mapper.as_ref())
    }

    pub(crate) fn mapper_mut(&mut self, class: ClassId) -> &mut Mapper {
        self.class_mut(class)
            .mapper
            .as_mut()
            .expect("class is not mapped")
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut Class {
        if let Some(savepoint) = &mut self.savepoint {
            if id.0 < savepoint.classes {
                savepoint
                    .touched_classes
                    .entry(id)
                    .or_insert_with(|| self.classes[id.0].clone());
            }
        }

        self.classes.get_mut(id.0).expect("invalid class ID")
    }

    pub(crate) fn union_mut(&mut self, id: UnionId) -> &mut PolymorphicUnion {
        if let Some(savepoint) = &mut self.savepoint {
            if id.0 < savepoint.unions {
                savepoint
                    .touched_unions
                    .entry(id)
                    .or_insert_with(|| self.unions[id.0].clone());
            }
        }

        self.unions.get_mut(id.0).expect("invalid union ID")
    }

    pub(crate) fn concrete_mut(&mut self, root: ClassId) -> Option<&mut ConcreteState> {
        self.touch_concrete(root);
        self.concrete.get_mut(&root)
    }

    pub(crate) fn set_concrete(&mut self, root: ClassId, state: ConcreteState) {
        self.touch_concrete(root);
        self.concrete.insert(root, state);
    }

    fn touch_concrete(&mut self, root: ClassId) {
        if let Some(savepoint) = &mut self.savepoint {
            savepoint
                .touched_concrete
                .entry(root)
                .or_insert_with(|| self.concrete.get(&root).cloned());
        }
    }

    /// Walks up the mapped parents starting at `class`, returning `true` if
    /// any of them owns a table.
    pub(crate) fn has_table_in_chain(&self, mut class: Option<ClassId>) -> bool {
        while let Some(id) = class {
            let Some(mapper) = self.mapper_opt(id) else {
                return false;
            };

            if mapper.local_table.is_some() || mapper.union.is_some() {
                return true;
            }

            class = mapper.parent;
        }

        false
    }

    /// The nearest table `class` or one of its mapped ancestors owns.
    pub(crate) fn nearest_table(&self, mut class: Option<ClassId>) -> Option<TableId> {
        while let Some(id) = class {
            let mapper = self.mapper_opt(id)?;

            if let Some(table) = mapper.local_table {
                return Some(table);
            }

            class = mapper.parent;
        }

        None
    }

    /// Tables of `class` and every mapped ancestor it inherits rows from,
    /// nearest first.
    pub(crate) fn table_chain(&self, class: ClassId) -> Vec<TableId> {
        let mut tables = vec![];
        let mut next = Some(class);

        while let Some(id) = next {
            let Some(mapper) = self.mapper_opt(id) else {
                break;
            };

            if let Some(table) = mapper.local_table {
                tables.push(table);
            }

            if mapper.inheritance.is_concrete() {
                break;
            }

            next = mapper.parent;
        }

        tables
    }

    /// Returns `true` if `class` is `ancestor` or inherits from it, either
    /// through mapped parents or by being unioned under it.
    pub(crate) fn is_descendant(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut next = Some(class);

        while let Some(id) = next {
            if id == ancestor {
                return true;
            }

            let Some(mapper) = self.mapper_opt(id) else {
                return false;
            };

            if mapper.concrete_root == Some(ancestor) {
                return true;
            }

            next = mapper.parent;
        }

        false
    }

    /// Mapped classes that are `class` or inherit from it, in declaration
    /// order.
    pub(crate) fn descendants(&self, class: ClassId) -> Vec<ClassId> {
        (0..self.classes.len())
            .map(ClassId)
            .filter(|id| self.mapper_opt(*id).is_some() && self.is_descendant(*id, class))
            .collect()
    }

    /// The class whose identity map `class` registers its identity in.
    pub(crate) fn polymorphic_root(&self, class: ClassId) -> ClassId {
        let mut root = class;

        while let Some(parent) = self.mapper_opt(root).and_then(|mapper| mapper.parent) {
            root = parent;
        }

        self.mapper_opt(root)
            .and_then(|mapper| mapper.concrete_root)
            .unwrap_or(root)
    }

    /// Maps each polymorphic identity of `class` and its descendants to the
    /// class carrying it. With duplicate identities, the later class wins.
    pub(crate) fn identities(&self, class: ClassId) -> IndexMap<Value, ClassId> {
        let mut identities = IndexMap::new();

        for id in self.descendants(class) {
            if let Some(identity) = self
                .mapper_opt(id)
                .and_then(|mapper| mapper.polymorphic_identity.clone())
            {
                identities.insert(identity, id);
            }
        }

        identities
    }

    /// The selectable rows of `class` are read from, ignoring any
    /// polymorphic union.
    pub(crate) fn table_selectable(&self, class: ClassId) -> Result<Selectable> {
        let mapper = self.mapper(class)?;

        if let Some(union) = mapper.union {
            return Ok(Selectable::Union(union));
        }

        match &mapper.inheritance {
            mapping::Inheritance::Base | mapping::Inheritance::Concrete => match mapper.local_table {
                Some(table) => Ok(Selectable::Table(table)),
                None => Err(Error::configuration(format!(
                    "class '{}' has no table",
                    self.class_name(class)
                ))),
            },
            mapping::Inheritance::Single => {
                let parent = mapper.parent.expect("single-table class has a parent");
                self.table_selectable(parent)
            }
            mapping::Inheritance::Joined { on } => {
                let parent = mapper.parent.expect("joined class has a parent");
                let table = mapper.local_table.expect("joined class has a table");

                Ok(Selectable::join(self.table_selectable(parent)?, table, on.clone()))
            }
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
