use crate::schema::db::{ColumnId, FkTarget, Type};

/// Template for a column declared as a class attribute.
///
/// A `ColumnDef` is a value: every class that materializes it gets a fresh
/// column. To share one column between classes, create it once with
/// [`Metadata::new_column`](crate::Metadata::new_column) and bind it with
/// [`Attr::Existing`](super::Attr::Existing).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Physical name, when it differs from the attribute key
    pub name: Option<String>,

    pub ty: Type,

    pub primary_key: bool,

    /// Defaults to `true` for non primary key columns
    pub nullable: Option<bool>,

    pub foreign_keys: Vec<FkTarget>,

    /// Excluded from default query projections
    pub deferred: bool,
}

impl ColumnDef {
    pub fn new(ty: Type) -> ColumnDef {
        ColumnDef {
            name: None,
            ty,
            primary_key: false,
            nullable: None,
            foreign_keys: vec![],
            deferred: false,
        }
    }

    pub fn integer() -> ColumnDef {
        ColumnDef::new(Type::Integer(4))
    }

    pub fn big_integer() -> ColumnDef {
        ColumnDef::new(Type::Integer(8))
    }

    pub fn string() -> ColumnDef {
        ColumnDef::new(Type::Text)
    }

    pub fn varchar(len: u64) -> ColumnDef {
        ColumnDef::new(Type::VarChar(len))
    }

    pub fn boolean() -> ColumnDef {
        ColumnDef::new(Type::Boolean)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// References `"table.column"`, which need not be declared yet.
    pub fn foreign_key(mut self, target: &str) -> Self {
        self.foreign_keys.push(FkTarget::from(target));
        self
    }

    /// References an existing column directly.
    pub fn references(mut self, column: ColumnId) -> Self {
        self.foreign_keys.push(FkTarget::Column(column));
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Physical name of a column materialized for attribute `key`.
    pub fn column_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }
}
