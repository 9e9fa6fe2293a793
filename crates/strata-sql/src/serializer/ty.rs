use super::{Params, ToSql};

use strata_core::schema::db::Type;

impl ToSql for &Type {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        match self {
            Type::Boolean => fmt!(f, "BOOLEAN"),
            Type::Integer(n) if *n <= 2 => fmt!(f, "SMALLINT"),
            Type::Integer(n) if *n <= 4 => fmt!(f, "INTEGER"),
            Type::Integer(_) => fmt!(f, "BIGINT"),
            Type::Text => fmt!(f, "TEXT"),
            Type::VarChar(len) => {
                let len = *len;
                fmt!(f, "VARCHAR(" len ")")
            }
            Type::Numeric => fmt!(f, "NUMERIC"),
        }
    }
}
