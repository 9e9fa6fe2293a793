use super::{Property, UnionId};
use crate::{
    schema::{
        app::ClassId,
        db::{ColumnId, TableId},
    },
    stmt::Value,
};
use indexmap::IndexMap;

/// The resolved mapping of one class.
#[derive(Debug, Clone)]
pub struct Mapper {
    pub class: ClassId,

    /// The single mapped class this class inherits from
    pub parent: Option<ClassId>,

    pub inheritance: Inheritance,

    /// The table this class defines. Single-table subclasses and abstract
    /// concrete bases have none.
    pub local_table: Option<TableId>,

    /// Explicit union the class is mapped onto
    pub union: Option<UnionId>,

    /// Attribute bindings, in declaration order
    pub properties: IndexMap<String, Property>,

    /// Discriminator column, shared by the whole hierarchy
    pub discriminator: Option<ColumnId>,

    pub polymorphic_identity: Option<Value>,

    pub version_id_col: Option<ColumnId>,

    /// Mapped classes declared with this class as their parent
    pub children: Vec<ClassId>,

    /// The abstract or concrete base whose union includes this class's table
    pub concrete_root: Option<ClassId>,
}

/// How a class relates to its mapped parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inheritance {
    /// No mapped parent
    Base,

    /// Shares the table of its nearest table-owning ancestor
    Single,

    /// Owns a table joined to the parent's on the given
    /// `(parent, child)` column pairs
    Joined { on: Vec<(ColumnId, ColumnId)> },

    /// Owns an independent table and inherits no bindings
    Concrete,
}

impl Mapper {
    pub(crate) fn new(class: ClassId, parent: Option<ClassId>, inheritance: Inheritance) -> Mapper {
        Mapper {
            class,
            parent,
            inheritance,
            local_table: None,
            union: None,
            properties: IndexMap::new(),
            discriminator: None,
            polymorphic_identity: None,
            version_id_col: None,
            children: vec![],
            concrete_root: None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }
}

impl Inheritance {
    pub fn is_single(&self) -> bool {
        matches!(self, Inheritance::Single)
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, Inheritance::Joined { .. })
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Inheritance::Concrete)
    }
}
