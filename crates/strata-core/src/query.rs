//! Querying a mapped class and loading polymorphic instances from the
//! result.

mod instance;
pub use instance::Instance;

use crate::{
    schema::{
        app::ClassId,
        db::ColumnId,
        mapping::{ClassMapping, Property, Selectable},
    },
    stmt::{Expr, Row, Select, Value},
    Dataset, Error, Metadata, Result,
};

/// A select over the selectable of one class.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    metadata: &'a Metadata,
    mapping: ClassMapping,
    select: Select,
}

impl Metadata {
    /// Builds the query loading every row of `class`.
    ///
    /// Querying an abstract concrete base before it is configured fails with
    /// a pending-mapping error.
    pub fn query(&self, class: ClassId) -> Result<Query<'_>> {
        Query::new(self, class)
    }
}

impl<'a> Query<'a> {
    fn new(metadata: &'a Metadata, class: ClassId) -> Result<Query<'a>> {
        let mapping = metadata.mapping(class)?;
        let mapper = metadata.mapper(class)?;

        let deferred: Vec<_> = mapper
            .properties
            .values()
            .filter_map(Property::as_column)
            .filter(|property| property.deferred)
            .flat_map(|property| {
                property
                    .columns
                    .iter()
                    .filter_map(|column| mapping.selectable.corresponding_column(metadata, *column))
            })
            .collect();

        let columns = mapping
            .selectable
            .columns(metadata)
            .into_iter()
            .filter(|column| !deferred.contains(column))
            .collect();

        let mut select = Select::new(mapping.selectable.clone(), columns);

        // Rows of a single-table subclass are told apart by discriminator
        if mapper.inheritance.is_single() {
            if let Some(discriminator) = mapping.discriminator {
                let identities = mapping.identity_values();

                if !identities.is_empty() {
                    select.and_filter(Expr::in_list(discriminator, identities));
                }
            }
        }

        Ok(Query {
            metadata,
            mapping,
            select,
        })
    }

    /// Keeps rows whose attribute `key` equals `value`.
    pub fn filter_by(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        let class = self.mapping.class;

        let column = match self.metadata.mapper(class)?.properties.get(key) {
            Some(Property::Column(property)) => property
                .columns
                .iter()
                .find_map(|column| self.corresponding_column(*column))
                .ok_or_else(|| {
                    Error::attribute_not_loaded(self.metadata.class_name(class), key)
                })?,
            Some(Property::ConcreteInherited) => {
                return Err(Error::attribute_not_implemented(
                    self.metadata.class_name(class),
                    key,
                ))
            }
            _ => return Err(Error::attribute_not_found(self.metadata.class_name(class), key)),
        };

        self.select
            .and_filter(Expr::eq(column, Expr::Value(value.into())));
        Ok(self)
    }

    /// Keeps rows whose discriminator equals `identity`.
    pub fn filter_identity(mut self, identity: impl Into<Value>) -> Result<Self> {
        let Some(discriminator) = self.mapping.discriminator else {
            return Err(Error::configuration(format!(
                "class '{}' has no polymorphic discriminator",
                self.metadata.class_name(self.mapping.class)
            )));
        };

        self.select
            .and_filter(Expr::eq(discriminator, Expr::Value(identity.into())));
        Ok(self)
    }

    pub fn metadata(&self) -> &'a Metadata {
        self.metadata
    }

    pub fn mapping(&self) -> &ClassMapping {
        &self.mapping
    }

    pub fn selectable(&self) -> &Selectable {
        &self.mapping.selectable
    }

    pub fn statement(&self) -> &Select {
        &self.select
    }

    pub fn into_statement(self) -> Select {
        self.select
    }

    /// Evaluates the query over `dataset`, loading each row as an instance
    /// of the class its discriminator identifies.
    pub fn all(&self, dataset: &Dataset) -> Result<Vec<Instance>> {
        self.load(self.select.eval(self.metadata, dataset)?)
    }

    /// Loads rows produced by running [`Query::statement`] elsewhere, such as
    /// through a database driver.
    ///
    /// Each row must be keyed by the statement's projected columns.
    pub fn load(&self, rows: impl IntoIterator<Item = Row>) -> Result<Vec<Instance>> {
        rows.into_iter()
            .map(|row| Instance::load(self.metadata, &self.mapping, &row))
            .collect()
    }

    fn corresponding_column(&self, column: ColumnId) -> Option<ColumnId> {
        self.mapping
            .selectable
            .corresponding_column(self.metadata, column)
    }
}
