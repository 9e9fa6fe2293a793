use super::{Comma, Delimited, Ident, Literal, Params, ToSql};

use crate::stmt::{self, Name};
use strata_core::schema::mapping::{ArmColumn, PolymorphicUnion, Selectable, UnionArm};

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let serializer = f.serializer;
        let columns = Comma(self.columns.iter().map(|id| serializer.column_ref(*id)));
        let source = &self.source;

        fmt!(f, "SELECT " columns " FROM " source);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &Selectable {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let serializer = f.serializer;

        match self {
            Selectable::Table(table) => {
                let name = serializer.table_name(*table);
                fmt!(f, name)
            }
            Selectable::Join(join) => {
                let left = &join.left;
                let right = serializer.table_name(join.right);
                let on = Delimited(
                    join.on.iter().map(|(lhs, rhs)| {
                        Equals(serializer.column_ref(*lhs), serializer.column_ref(*rhs))
                    }),
                    " AND ",
                );

                fmt!(f, left " JOIN " right " ON " on)
            }
            Selectable::Union(id) => {
                let union = serializer.metadata.union(*id);
                let arms = Delimited(
                    union.arms.iter().map(|arm| Arm { union, arm }),
                    " UNION ALL ",
                );
                let alias = Ident(&union.alias);

                fmt!(f, "(" arms ") AS " alias)
            }
        }
    }
}

/// `lhs = rhs` in a join condition
struct Equals(Name, Name);

impl ToSql for Equals {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, self.0 " = " self.1)
    }
}

/// One `SELECT` of a polymorphic union, projecting the union's columns in
/// order.
struct Arm<'a> {
    union: &'a PolymorphicUnion,
    arm: &'a UnionArm,
}

impl ToSql for Arm<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let serializer = f.serializer;
        let table = serializer.table_name(self.arm.table);

        let columns = Comma(self.arm.columns.iter().zip(&self.union.columns).map(
            |(column, target)| ArmProjection {
                column,
                alias: &serializer.schema().column(*target).name,
            },
        ));

        fmt!(f, "SELECT " columns " FROM " table)
    }
}

struct ArmProjection<'a> {
    column: &'a ArmColumn,

    /// Name of the union column being projected
    alias: &'a str,
}

impl ToSql for ArmProjection<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let alias = Ident(self.alias);

        match self.column {
            ArmColumn::Column(id) => {
                let name = f.serializer.column_ref(*id);

                if name.0.last().map(String::as_str) == Some(self.alias) {
                    fmt!(f, name)
                } else {
                    fmt!(f, name " AS " alias)
                }
            }
            ArmColumn::Null(ty) => fmt!(f, "CAST(NULL AS " ty ") AS " alias),
            ArmColumn::Literal(value) => {
                let value = Literal(value);
                fmt!(f, value " AS " alias)
            }
        }
    }
}
