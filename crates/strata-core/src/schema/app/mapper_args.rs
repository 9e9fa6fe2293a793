use super::DeclContext;
use crate::{schema::db::ColumnId, stmt::Value, Result};

use std::{fmt, sync::Arc};

/// Per-class mapper configuration.
///
/// Mapper arguments are never copied into subclasses. The discriminator is
/// the one exception: subclasses inherit the discriminator of their root.
#[derive(Debug, Clone, Default)]
pub struct MapperArgs {
    /// Discriminator value identifying rows of this class
    pub polymorphic_identity: Option<Value>,

    /// Discriminator column, only on the hierarchy root
    pub polymorphic_on: Option<Discriminator>,

    /// Explicit join between a joined subclass's table and its parent's
    pub inherit_condition: Option<InheritCondition>,

    /// Maps the class onto its own table independently of its parent
    pub concrete: bool,

    /// Attribute key of the version counter column
    pub version_id_col: Option<String>,

    /// Prefix applied to the attribute keys of columns mapped from an
    /// explicit table
    pub column_prefix: Option<String>,

    /// When set, only these attribute keys are mapped
    pub include_properties: Option<Vec<String>>,

    pub exclude_properties: Vec<String>,
}

/// Mapper arguments, given directly or computed from the declaration
/// context.
#[derive(Clone)]
pub enum MapperArgsDef {
    Static(MapperArgs),
    Declared(Arc<dyn Fn(&DeclContext<'_>) -> Result<MapperArgs> + Send + Sync>),
}

/// How the discriminator column is specified.
#[derive(Clone)]
pub enum Discriminator {
    Column(ColumnRef),

    /// Evaluated once, after the class's table has been synthesized
    Deferred(Arc<dyn Fn(&DeclContext<'_>) -> Result<ColumnRef> + Send + Sync>),
}

/// Refers to a column from within a class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// An attribute of the class, including inherited ones
    Attr(String),

    /// A physical column by name
    Name(String),

    Id(ColumnId),
}

/// Column pairs joining a subclass table to its parent, as
/// `(child, parent)`.
///
/// The child side resolves against the subclass's own table, the parent side
/// against the tables of its mapped ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritCondition {
    pub pairs: Vec<(ColumnRef, ColumnRef)>,
}

impl MapperArgs {
    pub fn new() -> MapperArgs {
        MapperArgs::default()
    }

    pub fn polymorphic_identity(mut self, identity: impl Into<Value>) -> Self {
        self.polymorphic_identity = Some(identity.into());
        self
    }

    pub fn polymorphic_on(mut self, discriminator: impl Into<Discriminator>) -> Self {
        self.polymorphic_on = Some(discriminator.into());
        self
    }

    pub fn inherit_condition(mut self, condition: InheritCondition) -> Self {
        self.inherit_condition = Some(condition);
        self
    }

    pub fn concrete(mut self) -> Self {
        self.concrete = true;
        self
    }

    pub fn version_id_col(mut self, key: impl Into<String>) -> Self {
        self.version_id_col = Some(key.into());
        self
    }

    pub fn column_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.column_prefix = Some(prefix.into());
        self
    }

    pub fn include_properties<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_properties = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude_properties<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_properties = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the attribute `key` should be mapped.
    pub(crate) fn includes(&self, key: &str) -> bool {
        let included = match &self.include_properties {
            Some(keys) => keys.iter().any(|k| k == key),
            None => true,
        };

        included && !self.exclude_properties.iter().any(|k| k == key)
    }
}

impl MapperArgsDef {
    pub(crate) fn resolve(&self, cx: &DeclContext<'_>) -> Result<MapperArgs> {
        match self {
            MapperArgsDef::Static(args) => Ok(args.clone()),
            MapperArgsDef::Declared(f) => f(cx),
        }
    }
}

impl Default for MapperArgsDef {
    fn default() -> Self {
        MapperArgsDef::Static(MapperArgs::default())
    }
}

impl From<MapperArgs> for MapperArgsDef {
    fn from(value: MapperArgs) -> Self {
        MapperArgsDef::Static(value)
    }
}

impl Discriminator {
    /// Discriminator on the attribute `key`.
    pub fn attr(key: impl Into<String>) -> Discriminator {
        Discriminator::Column(ColumnRef::Attr(key.into()))
    }

    /// Discriminator on the physical column `name`.
    pub fn name(name: impl Into<String>) -> Discriminator {
        Discriminator::Column(ColumnRef::Name(name.into()))
    }

    pub fn deferred(
        f: impl Fn(&DeclContext<'_>) -> Result<ColumnRef> + Send + Sync + 'static,
    ) -> Discriminator {
        Discriminator::Deferred(Arc::new(f))
    }
}

impl From<ColumnRef> for Discriminator {
    fn from(value: ColumnRef) -> Self {
        Discriminator::Column(value)
    }
}

impl From<ColumnId> for Discriminator {
    fn from(value: ColumnId) -> Self {
        Discriminator::Column(ColumnRef::Id(value))
    }
}

impl From<&str> for Discriminator {
    fn from(value: &str) -> Self {
        Discriminator::attr(value)
    }
}

impl From<ColumnId> for ColumnRef {
    fn from(value: ColumnId) -> Self {
        ColumnRef::Id(value)
    }
}

impl InheritCondition {
    pub fn new() -> InheritCondition {
        InheritCondition::default()
    }

    /// Adds `child = parent` to the condition.
    pub fn eq(mut self, child: impl Into<ColumnRef>, parent: impl Into<ColumnRef>) -> Self {
        self.pairs.push((child.into(), parent.into()));
        self
    }
}

impl fmt::Debug for MapperArgsDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapperArgsDef::Static(args) => f.debug_tuple("Static").field(args).finish(),
            MapperArgsDef::Declared(_) => f.write_str("Declared(..)"),
        }
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discriminator::Column(column) => f.debug_tuple("Column").field(column).finish(),
            Discriminator::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Attr(value.to_string())
    }
}
