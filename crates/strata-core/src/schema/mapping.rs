//! Resolved mappings: how each class's attributes correspond to columns of
//! tables, join chains and polymorphic unions.

mod class_mapping;
pub use class_mapping::ClassMapping;

mod mapper;
pub use mapper::{Inheritance, Mapper};

mod property;
pub use property::{ColumnProperty, Property};

mod selectable;
pub use selectable::{Join, Selectable};

pub(crate) mod union;
pub use union::{ArmColumn, PolymorphicUnion, UnionArm, UnionId};
