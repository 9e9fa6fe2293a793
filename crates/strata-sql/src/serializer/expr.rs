use super::{Comma, Delimited, Params, ToSql};

use crate::stmt::{self, Expr};

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Expr::And(operands) if operands.is_empty() => fmt!(f, "TRUE"),
            Expr::And(operands) => {
                let operands = Delimited(operands.iter().map(Operand), " AND ");
                fmt!(f, operands)
            }
            Expr::BinaryOp(expr) => expr.to_sql(f),
            Expr::Column(id) => {
                let name = f.serializer.column_ref(*id);
                fmt!(f, name)
            }
            // No row is in an empty list
            Expr::InList(expr) if expr.list.is_empty() => fmt!(f, "FALSE"),
            Expr::InList(expr) => {
                let lhs = &*expr.expr;
                let list = Comma(&expr.list);
                fmt!(f, lhs " IN (" list ")")
            }
            Expr::Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for &stmt::ExprBinaryOp {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let lhs = &*self.lhs;

        // Comparing with NULL is never true, so NULL is tested for instead
        if let Expr::Value(stmt::Value::Null) = &*self.rhs {
            let test = match self.op {
                stmt::BinaryOp::Eq => " IS NULL",
                stmt::BinaryOp::Ne => " IS NOT NULL",
            };
            fmt!(f, lhs test);
            return;
        }

        let rhs = &*self.rhs;
        fmt!(f, lhs " " self.op " " rhs)
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            stmt::BinaryOp::Eq => fmt!(f, "="),
            stmt::BinaryOp::Ne => fmt!(f, "<>"),
        }
    }
}

/// Operand of a conjunction. Nested conjunctions are parenthesized.
struct Operand<'a>(&'a Expr);

impl ToSql for Operand<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self.0 {
            Expr::And(_) => {
                let expr = self.0;
                fmt!(f, "(" expr ")")
            }
            expr => expr.to_sql(f),
        }
    }
}
