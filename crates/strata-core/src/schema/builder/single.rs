use crate::{
    schema::{
        app::{Attr, ClassDef},
        db::ColumnId,
        mapping::Mapper,
    },
    Error, Metadata, Result,
};
use indexmap::IndexMap;

impl Metadata {
    /// Maps a single-table subclass: its columns are added to the nearest
    /// table of its ancestry, shared with the rest of the subhierarchy.
    ///
    /// The columns stay invisible to the base class and to siblings, which
    /// never get a binding for them.
    pub(super) fn map_single(
        &mut self,
        def: &ClassDef,
        mapper: &Mapper,
        attrs: &IndexMap<String, Attr>,
    ) -> Result<IndexMap<String, ColumnId>> {
        let Some(parent) = mapper.parent else {
            return Err(Error::configuration(format!(
                "single-table class '{}' has no mapped base",
                def.name
            )));
        };

        if def.table_args.is_some() {
            return Err(Error::configuration(format!(
                "can't place table args on single-table subclass '{}' of '{}', which has no \
                 table of its own; place table args on the base class",
                def.name,
                self.class_name(parent)
            )));
        }

        let Some(table) = self.nearest_table(Some(parent)) else {
            return Err(Error::configuration(format!(
                "class '{}' inherits from '{}', which has no table to share",
                def.name,
                self.class_name(parent)
            )));
        };

        let allowed = self.table_chain(parent);
        let mut own = IndexMap::new();

        for (key, attr) in attrs {
            let column = self.bind_attr(&def.name, table, key, attr, &allowed, true)?;
            own.insert(key.clone(), column);
        }

        self.attach_constraints(&def.name, table, def)?;

        log::debug!(
            "single-table subclass {} maps into table {}",
            def.name,
            self.table(table).name
        );

        Ok(own)
    }
}
