use super::{Ident, Params, ToSql};

use crate::stmt;

impl ToSql for &stmt::ColumnDef {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let name = Ident(&self.name);
        let ty = &self.ty;

        fmt!(f, name " " ty);

        if self.not_null {
            fmt!(f, " NOT NULL");
        }

        for (table, column) in &self.references {
            let column = Ident(column);
            fmt!(f, " REFERENCES " table " (" column ")");
        }
    }
}
