use super::{BinaryOp, Expr, Row, Select, Value};
use crate::{
    schema::{
        db::TableId,
        mapping::{ArmColumn, Selectable},
    },
    Dataset, Metadata, Result,
};

impl Select {
    /// Evaluates the statement over `dataset`, returning rows keyed by the
    /// projected columns.
    pub fn eval(&self, metadata: &Metadata, dataset: &Dataset) -> Result<Vec<Row>> {
        let mut rows = vec![];

        for row in eval_source(&self.source, metadata, dataset) {
            if let Some(filter) = &self.filter {
                if filter.eval(&row) != Value::Bool(true) {
                    continue;
                }
            }

            rows.push(
                self.columns
                    .iter()
                    .map(|column| (*column, row.get(*column).cloned().unwrap_or_default()))
                    .collect(),
            );
        }

        Ok(rows)
    }
}

fn eval_source(source: &Selectable, metadata: &Metadata, dataset: &Dataset) -> Vec<Row> {
    match source {
        Selectable::Table(table) => table_rows(*table, metadata, dataset),
        Selectable::Join(join) => {
            let right = table_rows(join.right, metadata, dataset);
            let mut rows = vec![];

            for left in eval_source(&join.left, metadata, dataset) {
                for candidate in &right {
                    let matches = join.on.iter().all(|(l, r)| {
                        let lhs = left.get(*l).unwrap_or(&Value::Null);
                        let rhs = candidate.get(*r).unwrap_or(&Value::Null);
                        !lhs.is_null() && lhs == rhs
                    });

                    if matches {
                        let mut row = left.clone();
                        row.extend(candidate);
                        rows.push(row);
                    }
                }
            }

            rows
        }
        Selectable::Union(id) => {
            let union = metadata.union(*id);
            let mut rows = vec![];

            for arm in &union.arms {
                for source in dataset.rows(arm.table) {
                    rows.push(
                        union
                            .columns
                            .iter()
                            .zip(&arm.columns)
                            .map(|(column, arm_column)| {
                                let value = match arm_column {
                                    ArmColumn::Column(id) => source.get(*id).cloned().unwrap_or_default(),
                                    ArmColumn::Null(_) => Value::Null,
                                    ArmColumn::Literal(value) => value.clone(),
                                };
                                (*column, value)
                            })
                            .collect(),
                    );
                }
            }

            rows
        }
    }
}

/// Rows of `table`, with columns added after a row was inserted read as
/// NULL.
fn table_rows(table: TableId, metadata: &Metadata, dataset: &Dataset) -> Vec<Row> {
    let columns = &metadata.table(table).columns;

    dataset
        .rows(table)
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| (*column, row.get(*column).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

impl Expr {
    /// Evaluates the expression against a row with SQL NULL semantics.
    pub fn eval(&self, row: &Row) -> Value {
        match self {
            Expr::And(operands) => {
                let mut result = Value::Bool(true);

                for operand in operands {
                    match operand.eval(row) {
                        Value::Bool(true) => {}
                        Value::Bool(false) => return Value::Bool(false),
                        _ => result = Value::Null,
                    }
                }

                result
            }
            Expr::BinaryOp(expr) => {
                let lhs = expr.lhs.eval(row);
                let rhs = expr.rhs.eval(row);

                if lhs.is_null() || rhs.is_null() {
                    return Value::Null;
                }

                Value::Bool(match expr.op {
                    BinaryOp::Eq => lhs == rhs,
                    BinaryOp::Ne => lhs != rhs,
                })
            }
            Expr::Column(column) => row.get(*column).cloned().unwrap_or_default(),
            Expr::InList(expr) => {
                let value = expr.expr.eval(row);

                if value.is_null() {
                    return Value::Null;
                }

                Value::Bool(expr.list.contains(&value))
            }
            Expr::Value(value) => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::db::ColumnId;

    #[test]
    fn null_comparisons_are_not_true() {
        let row = Row::from_iter([(ColumnId(0), Value::Null), (ColumnId(1), Value::from(2))]);

        assert_eq!(Expr::eq(ColumnId(0), 1).eval(&row), Value::Null);
        assert_eq!(Expr::eq(ColumnId(1), 2).eval(&row), Value::Bool(true));
        assert_eq!(
            Expr::and(Expr::eq(ColumnId(1), 2), Expr::eq(ColumnId(0), 1)).eval(&row),
            Value::Null
        );
        assert_eq!(
            Expr::in_list(ColumnId(1), vec![Value::from(1), Value::from(2)]).eval(&row),
            Value::Bool(true)
        );
    }
}
