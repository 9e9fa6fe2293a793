use super::{Inheritance, Property, Selectable};
use crate::{
    schema::{app::ClassId, ConcreteState},
    stmt::Value,
    Metadata, Result,
};
use indexmap::IndexMap;

/// What the query layer sees of a finalized class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
    pub class: ClassId,

    /// Keys of the attributes that can be queried
    pub attributes: Vec<String>,

    /// Relation rows of the class are read from
    pub selectable: Selectable,

    /// Discriminator column, as exposed by `selectable`
    pub discriminator: Option<crate::schema::db::ColumnId>,

    /// Maps each polymorphic identity to the class it loads as
    pub identities: IndexMap<Value, ClassId>,
}

impl ClassMapping {
    pub(crate) fn new(metadata: &Metadata, class: ClassId) -> Result<ClassMapping> {
        metadata.check_configured(class)?;
        let mapper = metadata.mapper(class)?;

        let selectable = match metadata.concrete.get(&class) {
            Some(ConcreteState::Configured { union, .. }) => Selectable::Union(*union),
            _ => metadata.table_selectable(class)?,
        };

        let discriminator = mapper
            .discriminator
            .and_then(|column| selectable.corresponding_column(metadata, column));

        let attributes = mapper
            .properties
            .iter()
            .filter(|(_, property)| matches!(property, Property::Column(_)))
            .map(|(key, _)| key.clone())
            .collect();

        Ok(ClassMapping {
            class,
            attributes,
            selectable,
            discriminator,
            identities: metadata.identities(class),
        })
    }

    /// Identities that select rows of this class and its descendants.
    pub fn identity_values(&self) -> Vec<Value> {
        self.identities.keys().cloned().collect()
    }

    pub fn is_single_table_subclass(&self, metadata: &Metadata) -> bool {
        metadata
            .mapper_opt(self.class)
            .is_some_and(|mapper| mapper.inheritance == Inheritance::Single)
    }
}
