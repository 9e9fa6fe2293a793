mod column;
pub use column::{Column, ColumnId, ColumnOwner, FkTarget, ForeignKey};

mod constraint;
pub use constraint::Constraint;

mod schema;
pub use schema::Schema;

mod table;
pub use table::{Table, TableArgs, TableId};

mod ty;
pub use ty::Type;
