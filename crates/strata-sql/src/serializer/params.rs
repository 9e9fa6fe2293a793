use super::{Flavor, Formatter, ToSql};

use strata_core::stmt::Value;

/// Receives the values a statement binds, in the order the statement text
/// references them.
pub trait Params {
    fn push(&mut self, value: &Value) -> Placeholder;
}

/// 1-based position of a bound value in the parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        Vec::push(self, value.clone());
        Placeholder(self.len())
    }
}

impl Flavor {
    /// How the flavor's drivers mark a parameter: the marker, and whether the
    /// position follows it. MySQL binds positionally by occurrence.
    fn placeholder(self) -> (&'static str, bool) {
        match self {
            Flavor::Postgresql => ("$", true),
            Flavor::Sqlite => ("?", true),
            Flavor::Mysql => ("?", false),
        }
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let (marker, numbered) = f.serializer.flavor.placeholder();
        fmt!(f, marker);

        if numbered {
            let position = self.0;
            fmt!(f, position);
        }
    }
}
