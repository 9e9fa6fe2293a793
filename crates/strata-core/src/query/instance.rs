use crate::{
    schema::{
        app::{ClassId, Computed},
        mapping::{ClassMapping, Property},
    },
    stmt::{Row, Value},
    Error, Metadata, Result,
};
use indexmap::IndexMap;

/// An object loaded from one result row.
#[derive(Debug, Clone)]
pub struct Instance {
    class: ClassId,
    class_name: String,
    attrs: IndexMap<String, Slot>,
}

#[derive(Debug, Clone)]
enum Slot {
    Loaded(Value),
    NotLoaded,
    NotImplemented,
    Computed(Computed),
}

impl Instance {
    /// Loads `row` as an instance of the class identified by the row's
    /// discriminator, falling back to the queried class.
    pub(crate) fn load(metadata: &Metadata, mapping: &ClassMapping, row: &Row) -> Result<Instance> {
        let class = mapping
            .discriminator
            .and_then(|column| row.get(column))
            .and_then(|identity| mapping.identities.get(identity))
            .copied()
            .unwrap_or(mapping.class);

        let mapper = metadata.mapper(class)?;
        let mut attrs = IndexMap::new();

        for (key, property) in &mapper.properties {
            let slot = match property {
                Property::Column(property) if property.deferred => Slot::NotLoaded,
                Property::Column(property) => property
                    .load_adapted(row, |column| {
                        mapping.selectable.corresponding_column(metadata, column)
                    })
                    .map(Slot::Loaded)
                    .unwrap_or(Slot::NotLoaded),
                Property::ConcreteInherited => Slot::NotImplemented,
                Property::Computed(computed) => Slot::Computed(computed.clone()),
            };

            attrs.insert(key.clone(), slot);
        }

        Ok(Instance {
            class,
            class_name: metadata.class_name(class).to_string(),
            attrs,
        })
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Reads an attribute.
    pub fn get(&self, key: &str) -> Result<Value> {
        match self.attrs.get(key) {
            Some(Slot::Loaded(value)) => Ok(value.clone()),
            Some(Slot::Computed(computed)) => Ok(computed.eval(self)),
            Some(Slot::NotLoaded) => Err(Error::attribute_not_loaded(&self.class_name, key)),
            Some(Slot::NotImplemented) => {
                Err(Error::attribute_not_implemented(&self.class_name, key))
            }
            None => Err(Error::attribute_not_found(&self.class_name, key)),
        }
    }

    /// Keys of the attributes holding a loaded value.
    pub fn loaded_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.attrs
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Loaded(_)))
            .map(|(key, _)| key.as_str())
    }
}
