use std::fmt;

use strata_core::schema::db::Table;

/// A possibly schema-qualified SQL name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub Vec<String>);

impl Name {
    /// The name of `table`, qualified by the schema from its table args.
    pub fn table(table: &Table) -> Name {
        let mut parts = vec![];

        if let Some(schema) = table.args.as_ref().and_then(|args| args.schema.as_ref()) {
            parts.push(schema.clone());
        }

        parts.push(table.name.clone());
        Name(parts)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(vec![value.into()])
    }
}

impl From<&String> for Name {
    fn from(value: &String) -> Self {
        Self::from(&value[..])
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = "";
        for ident in &self.0 {
            write!(f, "{s}{ident}")?;
            s = ".";
        }

        Ok(())
    }
}
