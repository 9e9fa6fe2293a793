//! The statement model handed to the SQL serializer and to the in-memory
//! evaluator. It only covers what mapping queries need: selecting columns
//! from a table, a joined-inheritance chain or a polymorphic union, filtered
//! by simple predicates.

mod eval;

mod expr;
pub use expr::{BinaryOp, Expr, ExprBinaryOp, ExprInList};

mod row;
pub use row::Row;

mod select;
pub use select::Select;

mod value;
pub use value::Value;
