use super::{
    app::{Attr, ClassId, ClassKind},
    db::{ColumnId, ColumnOwner, FkTarget},
    mapping::{self, ColumnProperty, PolymorphicUnion, Property, UnionId},
};
use crate::{Error, Metadata, Result};
use indexmap::IndexMap;

/// Configuration state of an abstract or concrete base.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConcreteState {
    /// The union has not been synthesized yet
    Pending { subclasses: Vec<ClassId> },

    /// The union reflects the subclasses known when it was synthesized.
    /// `stale` is set when the hierarchy changed since.
    Configured {
        union: UnionId,
        subclasses: Vec<ClassId>,
        stale: bool,
    },
}

impl ConcreteState {
    pub(crate) fn subclasses(&self) -> &[ClassId] {
        match self {
            ConcreteState::Pending { subclasses } | ConcreteState::Configured { subclasses, .. } => {
                subclasses
            }
        }
    }

    fn needs_configure(&self) -> bool {
        match self {
            ConcreteState::Pending { .. } => true,
            ConcreteState::Configured { stale, .. } => *stale,
        }
    }
}

impl Metadata {
    pub(super) fn configure_all(&mut self) -> Result<()> {
        self.resolve_foreign_keys()?;

        let roots: Vec<_> = self
            .concrete
            .iter()
            .filter(|(_, state)| state.needs_configure())
            .map(|(root, _)| *root)
            .collect();

        for root in roots {
            self.configure_concrete(root)?;
        }

        log::debug!(
            "configured {} classes, {} polymorphic unions",
            self.classes.len(),
            self.unions.len()
        );

        Ok(())
    }

    /// Replaces every foreign key named by `"table.column"` with the column
    /// it refers to.
    fn resolve_foreign_keys(&mut self) -> Result<()> {
        for index in 0..self.db.columns.len() {
            let column = &self.db.columns[index];

            if column.owner == ColumnOwner::Unattached {
                continue;
            }

            let mut resolved = vec![];

            for (i, fk) in column.foreign_keys.iter().enumerate() {
                let FkTarget::Name(name) = &fk.target else {
                    continue;
                };

                match self.resolve_fk(&fk.target) {
                    Some(target) => resolved.push((i, target)),
                    None => {
                        let (table, target) = fk.target.split_name().unwrap_or((name.as_str(), ""));
                        let qualified = self.db.qualified_name(column.id);

                        return Err(match self.table_by_name(table) {
                            None => Error::configuration(format!(
                                "foreign key associated with column '{qualified}' could not find \
                                 table '{table}' with which to generate a foreign key to target \
                                 column '{target}'"
                            )),
                            Some(_) => Error::configuration(format!(
                                "foreign key associated with column '{qualified}' could not find \
                                 column '{name}'"
                            )),
                        });
                    }
                }
            }

            for (i, target) in resolved {
                self.db.column_mut(ColumnId(index)).foreign_keys[i].target = FkTarget::Column(target);
            }
        }

        Ok(())
    }

    /// (Re)synthesizes the union of an abstract or concrete base over its
    /// current subclasses and maps the base onto it.
    fn configure_concrete(&mut self, root: ClassId) -> Result<()> {
        let Some(state) = self.concrete.get(&root).cloned() else {
            return Ok(());
        };

        let subclasses = state.subclasses().to_vec();
        let kind = self.class(root).kind;

        let mut members = vec![];
        if kind == ClassKind::ConcreteBase {
            members.push(root);
        }
        members.extend(subclasses.iter().copied());

        if kind == ClassKind::AbstractConcreteBase && subclasses.is_empty() {
            log::debug!(
                "abstract concrete base {} has no subclasses yet; its mapping stays pending",
                self.class_name(root)
            );
            return Ok(());
        }

        // Most recently declared leaf first
        let mut leaves = vec![];
        for member in members.iter().rev() {
            let mapper = self.mapper(*member)?;
            if let Some(table) = mapper.local_table {
                leaves.push((table, mapper.polymorphic_identity.clone()));
            }
        }

        let discriminator = self
            .class(root)
            .concrete_discriminator
            .clone()
            .unwrap_or_else(|| self.config.discriminator_name.clone());

        let (id, previous) = match &state {
            ConcreteState::Configured { union, .. } => (*union, Some(self.union(*union).clone())),
            ConcreteState::Pending { .. } => (UnionId(self.unions.len()), None),
        };

        let union = mapping::union::synthesize(
            &mut self.db,
            id,
            &self.config.union_alias,
            &leaves,
            Some(&discriminator),
            previous.as_ref(),
        )?;

        self.map_concrete_root(root, &union, &subclasses)?;

        if id.0 == self.unions.len() {
            self.unions.push(union);
        } else {
            *self.union_mut(id) = union;
        }

        log::debug!(
            "configured {} over {} subclasses",
            self.class_name(root),
            subclasses.len()
        );

        self.set_concrete(
            root,
            ConcreteState::Configured {
                union: id,
                subclasses,
                stale: false,
            },
        );

        Ok(())
    }

    /// Maps an abstract or concrete base onto its union and marks what its
    /// concrete subclasses don't implement.
    fn map_concrete_root(
        &mut self,
        root: ClassId,
        union: &PolymorphicUnion,
        subclasses: &[ClassId],
    ) -> Result<()> {
        let def = self.class(root).clone();

        if def.kind == ClassKind::AbstractConcreteBase {
            let mut properties = IndexMap::new();

            // Attributes declared on the base keep their keys
            for (key, attr) in &def.attrs {
                let name = match attr {
                    Attr::Column(column) => column.column_name(key).to_string(),
                    Attr::Existing(column) => self.column(*column).name.clone(),
                    Attr::Declared(_) => key.clone(),
                };

                if let Some(column) = union.column_named(&self.db, &name) {
                    properties.insert(key.clone(), Property::Column(ColumnProperty::new(column)));
                }
            }

            for column in &union.columns {
                let bound = properties.values().any(|property| {
                    matches!(property, Property::Column(p) if p.columns.contains(column))
                });

                if !bound {
                    properties.insert(
                        self.column(*column).name.clone(),
                        Property::Column(ColumnProperty::new(*column)),
                    );
                }
            }

            for (key, computed) in &def.computed {
                properties.insert(key.clone(), Property::Computed(computed.clone()));
            }

            self.mapper_mut(root).properties = properties;
        } else if let Some(discriminator) = union.discriminator {
            let name = self.column(discriminator).name.clone();
            self.mapper_mut(root)
                .properties
                .entry(name)
                .or_insert_with(|| Property::Column(ColumnProperty::new(discriminator)));
        }

        self.mapper_mut(root).discriminator = union.discriminator;

        let keys: Vec<String> = self.mapper(root)?.properties.keys().cloned().collect();

        for subclass in subclasses.iter().copied() {
            let computed = self.class(subclass).computed.clone();
            let mapper = self.mapper_mut(subclass);

            for key in &keys {
                if !mapper.properties.contains_key(key) && !computed.contains_key(key) {
                    mapper
                        .properties
                        .insert(key.clone(), Property::ConcreteInherited);
                }
            }
        }

        Ok(())
    }
}
