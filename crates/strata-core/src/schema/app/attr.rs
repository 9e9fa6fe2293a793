use super::{ColumnDef, DeclContext};
use crate::{schema::db::ColumnId, Result};

use std::{fmt, sync::Arc};

/// A declared attribute.
#[derive(Clone)]
pub enum Attr {
    /// A new column built from a template
    Column(ColumnDef),

    /// A column that already exists.
    ///
    /// Redeclaring a column of the shared table in a single-table subclass
    /// this way is not a conflict, since it is the very same column.
    Existing(ColumnId),

    /// Computed per class when the class is declared, once its position in
    /// the hierarchy is known.
    Declared(Arc<dyn Fn(&DeclContext<'_>) -> Result<Attr> + Send + Sync>),
}

impl Attr {
    pub fn declared(
        f: impl Fn(&DeclContext<'_>) -> Result<Attr> + Send + Sync + 'static,
    ) -> Attr {
        Attr::Declared(Arc::new(f))
    }

    pub(crate) fn is_deferred(&self) -> bool {
        matches!(self, Attr::Column(def) if def.deferred)
    }
}

impl From<ColumnDef> for Attr {
    fn from(value: ColumnDef) -> Self {
        Attr::Column(value)
    }
}

impl From<ColumnId> for Attr {
    fn from(value: ColumnId) -> Self {
        Attr::Existing(value)
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Column(def) => f.debug_tuple("Column").field(def).finish(),
            Attr::Existing(id) => f.debug_tuple("Existing").field(id).finish(),
            Attr::Declared(_) => f.write_str("Declared(..)"),
        }
    }
}
