use super::{Attr, Computed, MapperArgs, MapperArgsDef};
use crate::schema::{
    db::{TableArgs, TableId},
    mapping::UnionId,
};
use indexmap::IndexMap;

use std::fmt;

/// Declaration of a class.
///
/// ```
/// # use strata_core::schema::app::*;
/// # use strata_core::Metadata;
/// let mut metadata = Metadata::new();
///
/// let person = metadata.declare(
///     ClassDef::new("Person")
///         .table("people")
///         .column("id", ColumnDef::integer().primary_key())
///         .column("discriminator", ColumnDef::varchar(50))
///         .mapper_args(MapperArgs::new().polymorphic_on("discriminator")),
/// )?;
///
/// let engineer = metadata.declare(
///     ClassDef::new("Engineer")
///         .base(person)
///         .column("primary_language", ColumnDef::varchar(50))
///         .mapper_args(MapperArgs::new().polymorphic_identity("engineer")),
/// )?;
/// # Ok::<_, strata_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Class name, used in error messages only
    pub name: String,

    pub kind: ClassKind,

    /// Declared base classes, in declaration order
    pub bases: Vec<ClassId>,

    /// Name of the table the class defines
    pub table_name: Option<String>,

    /// An existing table or union the class is mapped onto
    pub table: Option<TableSource>,

    pub table_args: Option<TableArgs>,

    /// Declared attributes, in declaration order
    pub attrs: IndexMap<String, Attr>,

    pub mapper_args: MapperArgsDef,

    pub constraints: Vec<ConstraintDef>,

    /// Properties overriding schema-backed attributes
    pub computed: IndexMap<String, Computed>,

    /// Name of the discriminator column of a synthesized union
    pub concrete_discriminator: Option<String>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A regular mapped class
    Mapped,

    /// Explicitly abstract; never mapped, contributes attributes to
    /// subclasses
    Abstract,

    /// Plain class contributing attributes to subclasses
    Mixin,

    /// Root of a concrete hierarchy without a table of its own. It is mapped
    /// onto a union of its subclasses' tables once configured.
    AbstractConcreteBase,

    /// Root of a concrete hierarchy with its own table. Once configured,
    /// queries read a union of its table and its subclasses' tables.
    ConcreteBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Table(TableId),
    Union(UnionId),
}

/// A table constraint declared on a class, naming columns by physical name.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintDef {
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    Check {
        name: Option<String>,
        sql: String,
    },
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> ClassDef {
        ClassDef {
            name: name.into(),
            kind: ClassKind::Mapped,
            bases: vec![],
            table_name: None,
            table: None,
            table_args: None,
            attrs: IndexMap::new(),
            mapper_args: MapperArgsDef::default(),
            constraints: vec![],
            computed: IndexMap::new(),
            concrete_discriminator: None,
        }
    }

    pub fn abstract_class(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name).kind(ClassKind::Abstract)
    }

    pub fn mixin(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name).kind(ClassKind::Mixin)
    }

    pub fn abstract_concrete_base(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name).kind(ClassKind::AbstractConcreteBase)
    }

    pub fn concrete_base(name: impl Into<String>) -> ClassDef {
        ClassDef::new(name).kind(ClassKind::ConcreteBase)
    }

    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn base(mut self, base: ClassId) -> Self {
        self.bases.push(base);
        self
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Maps the class onto an existing table.
    pub fn table_ref(mut self, table: TableId) -> Self {
        self.table = Some(TableSource::Table(table));
        self
    }

    /// Maps the class onto an existing polymorphic union.
    pub fn selectable(mut self, union: UnionId) -> Self {
        self.table = Some(TableSource::Union(union));
        self
    }

    pub fn table_args(mut self, args: TableArgs) -> Self {
        self.table_args = Some(args);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, attr: impl Into<Attr>) -> Self {
        self.attrs.insert(key.into(), attr.into());
        self
    }

    pub fn column(self, key: impl Into<String>, def: super::ColumnDef) -> Self {
        self.attr(key, Attr::Column(def))
    }

    pub fn mapper_args(mut self, args: impl Into<MapperArgsDef>) -> Self {
        self.mapper_args = args.into();
        self
    }

    /// Computes mapper arguments from the declaration context.
    pub fn declared_mapper_args(
        mut self,
        f: impl Fn(&super::DeclContext<'_>) -> crate::Result<MapperArgs> + Send + Sync + 'static,
    ) -> Self {
        self.mapper_args = MapperArgsDef::Declared(std::sync::Arc::new(f));
        self
    }

    pub fn constraint(mut self, constraint: ConstraintDef) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn computed(mut self, key: impl Into<String>, computed: Computed) -> Self {
        self.computed.insert(key.into(), computed);
        self
    }

    /// Names the discriminator column of the union synthesized for this
    /// base. Defaults to the metadata's setting.
    pub fn concrete_discriminator(mut self, name: impl Into<String>) -> Self {
        self.concrete_discriminator = Some(name.into());
        self
    }

    pub fn has_table(&self) -> bool {
        self.table_name.is_some() || self.table.is_some()
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self.kind, ClassKind::Abstract | ClassKind::Mixin)
    }
}

impl ConstraintDef {
    pub fn unique<I, S>(columns: I) -> ConstraintDef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConstraintDef::Unique {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn check(sql: impl Into<String>) -> ConstraintDef {
        ConstraintDef::Check {
            name: None,
            sql: sql.into(),
        }
    }

    pub fn named(mut self, constraint_name: impl Into<String>) -> Self {
        match &mut self {
            ConstraintDef::Unique { name, .. } | ConstraintDef::Check { name, .. } => {
                *name = Some(constraint_name.into());
            }
        }
        self
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ClassId({})", self.0)
    }
}
