#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited, Period};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod column_def;
mod expr;
mod name;
mod select;
mod statement;
mod ty;
mod value;
use value::Literal;

use crate::stmt::{Name, Statement};

use strata_core::{
    schema::db::{self, ColumnOwner},
    Metadata,
};

/// Serialize a statement to a SQL string
#[derive(Debug)]
pub struct Serializer<'a> {
    /// Metadata the statement's tables, columns and unions belong to
    metadata: &'a Metadata,

    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl<'a> Serializer<'a> {
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }

    fn schema(&self) -> &'a db::Schema {
        self.metadata.schema()
    }

    fn table_name(&self, id: db::TableId) -> Name {
        Name::table(self.metadata.table(id))
    }

    /// The name a column is referenced by within a statement: qualified by
    /// its table, or by the alias of the union that owns it.
    fn column_ref(&self, id: db::ColumnId) -> Name {
        let column = self.metadata.column(id);

        let mut name = match column.owner {
            ColumnOwner::Table(table) => self.table_name(table),
            ColumnOwner::Union(union) => Name::from(&self.metadata.union(union).alias),
            ColumnOwner::Unattached => Name(vec![]),
        };

        name.0.push(column.name.clone());
        name
    }
}
