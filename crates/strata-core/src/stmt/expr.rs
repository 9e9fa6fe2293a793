use super::Value;
use crate::schema::db::ColumnId;

/// A predicate or operand within a [`Select`](super::Select).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All operands must hold
    And(Vec<Expr>),

    /// Binary comparison
    BinaryOp(ExprBinaryOp),

    /// Reference to a column of the statement's source
    Column(ColumnId),

    /// `expr IN (values...)`
    InList(ExprInList),

    /// A literal value, bound as a parameter when serialized
    Value(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Vec<Value>,
}

impl Expr {
    pub fn column(id: ColumnId) -> Expr {
        Expr::Column(id)
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Ne, rhs)
    }

    pub fn binary_op(lhs: impl Into<Expr>, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        })
    }

    pub fn in_list(expr: impl Into<Expr>, list: Vec<Value>) -> Expr {
        Expr::InList(ExprInList {
            expr: Box::new(expr.into()),
            list,
        })
    }

    /// Combines two predicates, flattening nested conjunctions.
    pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        let mut operands = vec![];

        for expr in [lhs.into(), rhs.into()] {
            match expr {
                Expr::And(nested) => operands.extend(nested),
                expr => operands.push(expr),
            }
        }

        Expr::And(operands)
    }

    /// Visits every column referenced by the expression.
    pub fn for_each_column(&self, f: &mut impl FnMut(ColumnId)) {
        match self {
            Expr::And(operands) => {
                for operand in operands {
                    operand.for_each_column(f);
                }
            }
            Expr::BinaryOp(expr) => {
                expr.lhs.for_each_column(f);
                expr.rhs.for_each_column(f);
            }
            Expr::Column(id) => f(*id),
            Expr::InList(expr) => expr.expr.for_each_column(f),
            Expr::Value(_) => {}
        }
    }
}

impl From<ColumnId> for Expr {
    fn from(value: ColumnId) -> Self {
        Expr::Column(value)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Value(value.into())
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Value(value.into())
    }
}
