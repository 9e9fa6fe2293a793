use crate::{
    schema::db::{self, ColumnId, ColumnOwner, TableId, Type},
    stmt::Value,
    Error, Result,
};
use indexmap::IndexMap;

use std::fmt;

/// A virtual table made of one `SELECT` arm per leaf table, combined with
/// `UNION ALL`.
///
/// Every arm projects the union's columns in the same order: the leaf's own
/// column where it has one, a typed NULL where it does not, and the leaf's
/// identity for the discriminator.
#[derive(Debug, Clone, PartialEq)]
pub struct PolymorphicUnion {
    pub id: UnionId,

    /// Name the union is selected as
    pub alias: String,

    /// Output columns, owned by the union
    pub columns: Vec<ColumnId>,

    /// The output column tagging each row with its arm's identity
    pub discriminator: Option<ColumnId>,

    pub arms: Vec<UnionArm>,
}

#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct UnionId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct UnionArm {
    pub table: TableId,

    pub identity: Option<Value>,

    /// One entry per union column
    pub columns: Vec<ArmColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArmColumn {
    /// The leaf's own column
    Column(ColumnId),

    /// `CAST(NULL AS ty)`
    Null(Type),

    Literal(Value),
}

impl PolymorphicUnion {
    pub fn column_named(&self, schema: &db::Schema, name: &str) -> Option<ColumnId> {
        self.columns
            .iter()
            .copied()
            .find(|id| schema.column(*id).name == name)
    }

    pub fn tables(&self) -> impl ExactSizeIterator<Item = TableId> + '_ {
        self.arms.iter().map(|arm| arm.table)
    }
}

/// Builds the union over `leaves`, in the order given.
///
/// Union columns are ordered by first appearance while scanning the leaves,
/// with the discriminator last. A column's type is taken from the first leaf
/// that has it. When `previous` is given, its columns are reused by name so
/// that re-synthesizing keeps column identities stable.
pub(crate) fn synthesize(
    schema: &mut db::Schema,
    id: UnionId,
    alias: &str,
    leaves: &[(TableId, Option<Value>)],
    discriminator: Option<&str>,
    previous: Option<&PolymorphicUnion>,
) -> Result<PolymorphicUnion> {
    if leaves.is_empty() {
        return Err(Error::configuration(format!(
            "polymorphic union '{alias}' requires at least one table"
        )));
    }

    let mut names = IndexMap::<String, Type>::new();

    for (table, _) in leaves {
        for column in &schema.table(*table).columns {
            let column = schema.column(*column);

            if Some(column.name.as_str()) == discriminator {
                return Err(Error::configuration(format!(
                    "polymorphic union '{alias}' can't use '{}' as the discriminator column \
                     because table '{}' has a column of that name; \
                     choose a different concrete discriminator name",
                    column.name,
                    schema.table(*table).name,
                )));
            }

            names
                .entry(column.name.clone())
                .or_insert_with(|| column.ty.clone());
        }
    }

    let owner = ColumnOwner::Union(id);
    let reuse = |schema: &mut db::Schema, name: &str, ty: Type| {
        match previous.and_then(|union| union.column_named(schema, name)) {
            Some(column) => {
                schema.column_mut(column).ty = ty;
                column
            }
            None => schema.new_union_column(owner, name, ty),
        }
    };

    let mut columns = vec![];
    for (name, ty) in &names {
        columns.push(reuse(schema, name, ty.clone()));
    }

    let discriminator = discriminator.map(|name| {
        let ty = match leaves.iter().find_map(|(_, identity)| identity.as_ref()) {
            Some(Value::I64(_)) => Type::Integer(8),
            Some(Value::Bool(_)) => Type::Boolean,
            _ => Type::Text,
        };
        reuse(schema, name, ty)
    });

    let arms = leaves
        .iter()
        .map(|(table, identity)| {
            let mut arm_columns: Vec<_> = names
                .iter()
                .map(|(name, ty)| match schema.column_named(*table, name) {
                    Some(column) => ArmColumn::Column(column),
                    None => ArmColumn::Null(ty.clone()),
                })
                .collect();

            if discriminator.is_some() {
                arm_columns.push(ArmColumn::Literal(identity.clone().unwrap_or_default()));
            }

            UnionArm {
                table: *table,
                identity: identity.clone(),
                columns: arm_columns,
            }
        })
        .collect();

    columns.extend(discriminator);

    log::debug!(
        "synthesized polymorphic union {alias} over {} tables with {} columns",
        leaves.len(),
        columns.len()
    );

    Ok(PolymorphicUnion {
        id,
        alias: alias.to_string(),
        columns,
        discriminator,
        arms,
    })
}

impl fmt::Debug for UnionId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "UnionId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::app::ColumnDef;

    fn leaf(schema: &mut db::Schema, name: &str, columns: &[(&str, ColumnDef)]) -> TableId {
        let table = schema.create_table(name).unwrap();
        for (key, def) in columns {
            let column = schema.new_column(key, def);
            schema.attach(table, column);
        }
        table
    }

    fn names(schema: &db::Schema, union: &PolymorphicUnion) -> Vec<String> {
        union
            .columns
            .iter()
            .map(|id| schema.column(*id).name.clone())
            .collect()
    }

    #[test]
    fn columns_follow_first_appearance() {
        let mut schema = db::Schema::default();
        let engineer = leaf(
            &mut schema,
            "engineer",
            &[
                ("id", ColumnDef::integer().primary_key()),
                ("name", ColumnDef::varchar(50)),
                ("primary_language", ColumnDef::varchar(50)),
            ],
        );
        let manager = leaf(
            &mut schema,
            "manager",
            &[
                ("id", ColumnDef::integer().primary_key()),
                ("name", ColumnDef::varchar(50)),
                ("golf_swing", ColumnDef::varchar(50)),
            ],
        );

        let union = synthesize(
            &mut schema,
            UnionId(0),
            "pjoin",
            &[
                (manager, Some("manager".into())),
                (engineer, Some("engineer".into())),
            ],
            Some("type"),
            None,
        )
        .unwrap();

        assert_eq!(
            names(&schema, &union),
            ["id", "name", "golf_swing", "primary_language", "type"]
        );

        let engineer_arm = &union.arms[1];
        assert_eq!(engineer_arm.columns[2], ArmColumn::Null(Type::VarChar(50)));
        assert_eq!(engineer_arm.columns[4], ArmColumn::Literal("engineer".into()));
        assert_eq!(schema.column(union.discriminator.unwrap()).name, "type");
    }

    #[test]
    fn resynthesis_reuses_columns() {
        let mut schema = db::Schema::default();
        let a = leaf(&mut schema, "a", &[("id", ColumnDef::integer())]);
        let b = leaf(&mut schema, "b", &[("id", ColumnDef::integer())]);

        let first = synthesize(&mut schema, UnionId(0), "pjoin", &[(a, None)], Some("type"), None)
            .unwrap();
        let second = synthesize(
            &mut schema,
            UnionId(0),
            "pjoin",
            &[(b, None), (a, None)],
            Some("type"),
            Some(&first),
        )
        .unwrap();

        assert_eq!(first.columns, second.columns);
        assert_eq!(second.arms.len(), 2);
    }

    #[test]
    fn discriminator_name_clash() {
        let mut schema = db::Schema::default();
        let a = leaf(&mut schema, "a", &[("type", ColumnDef::string())]);

        let err = synthesize(&mut schema, UnionId(0), "pjoin", &[(a, None)], Some("type"), None)
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
