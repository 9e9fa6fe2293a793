use super::{Params, ToSql};

use crate::stmt;

/// A value written into the statement text instead of being bound as a
/// parameter.
pub(super) struct Literal<'a>(pub(super) &'a stmt::Value);

impl ToSql for &stmt::Value {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let placeholder = f.params.push(self);
        fmt!(f, placeholder)
    }
}

impl ToSql for Literal<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use std::fmt::Write;

        match self.0 {
            stmt::Value::Null => fmt!(f, "NULL"),
            stmt::Value::Bool(true) => fmt!(f, "TRUE"),
            stmt::Value::Bool(false) => fmt!(f, "FALSE"),
            stmt::Value::I64(value) => write!(f.dst, "{value}").unwrap(),
            stmt::Value::String(value) => {
                f.dst.push('\'');
                for c in value.chars() {
                    if c == '\'' {
                        f.dst.push('\'');
                    }
                    f.dst.push(c);
                }
                f.dst.push('\'');
            }
        }
    }
}
