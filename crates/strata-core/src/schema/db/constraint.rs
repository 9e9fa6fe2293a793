use super::ColumnId;

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Unique {
        name: Option<String>,
        columns: Vec<ColumnId>,
    },
    Check {
        name: Option<String>,
        sql: String,
    },
}

impl Constraint {
    pub fn name(&self) -> Option<&str> {
        match self {
            Constraint::Unique { name, .. } | Constraint::Check { name, .. } => name.as_deref(),
        }
    }
}
