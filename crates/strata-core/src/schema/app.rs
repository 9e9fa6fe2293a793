//! Class declarations, as written by the user before resolution.

mod attr;
pub use attr::Attr;

mod class;
pub use class::{ClassDef, ClassId, ClassKind, ConstraintDef, TableSource};

mod column_def;
pub use column_def::ColumnDef;

mod computed;
pub use computed::Computed;

mod context;
pub use context::DeclContext;

mod mapper_args;
pub use mapper_args::{ColumnRef, Discriminator, InheritCondition, MapperArgs, MapperArgsDef};
