use super::{Comma, Flavor, Ident, Params, ToSql};

use crate::stmt::{self, Statement, TableConstraint};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::DropTable(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let name = &self.name;
        let elements = TableElements(self);

        fmt!(f, "CREATE TABLE " name " (" elements "\n)");
    }
}

/// Column definitions followed by the table constraints, one per line.
struct TableElements<'a>(&'a stmt::CreateTable);

impl ToSql for TableElements<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let mut s = "\n    ";

        for column in &self.0.columns {
            fmt!(f, s column);
            s = ",\n    ";
        }

        if !self.0.primary_key.is_empty() {
            let pk = Comma(self.0.primary_key.iter().map(Ident));
            fmt!(f, s "PRIMARY KEY (" pk ")");
        }

        for constraint in &self.0.constraints {
            fmt!(f, s constraint);
        }
    }
}

impl ToSql for &TableConstraint {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if let Some(name) = self.name() {
            let name = Ident(name);
            fmt!(f, "CONSTRAINT " name " ");
        }

        match self {
            TableConstraint::Unique { columns, .. } => {
                let columns = Comma(columns.iter().map(Ident));
                fmt!(f, "UNIQUE (" columns ")")
            }
            TableConstraint::Check { sql, .. } => {
                let sql = sql.as_str();
                fmt!(f, "CHECK (" sql ")")
            }
        }
    }
}

impl ToSql for &stmt::DropTable {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let if_exists = if self.if_exists { "IF EXISTS " } else { "" };
        let cascade = if self.cascade && f.serializer.flavor != Flavor::Sqlite {
            " CASCADE"
        } else {
            ""
        };
        let name = &self.name;

        fmt!(f, "DROP TABLE " if_exists name cascade);
    }
}
