use super::Error;

/// Error when a declared column collides with a column already present on
/// the physical table it would be placed on.
#[derive(Debug)]
pub(super) struct ColumnConflictError {
    class: Box<str>,
    column: Box<str>,
    existing: Box<str>,
}

impl std::error::Error for ColumnConflictError {}

impl core::fmt::Display for ColumnConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "column '{}' on class '{}' conflicts with existing column '{}'",
            self.column, self.class, self.existing
        )
    }
}

impl Error {
    /// Creates a column conflict error. `existing` is the qualified
    /// `table.column` name already holding the slot.
    pub fn column_conflict(
        class: impl Into<String>,
        column: impl Into<String>,
        existing: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::ColumnConflict(ColumnConflictError {
            class: class.into().into(),
            column: column.into().into(),
            existing: existing.into().into(),
        }))
    }

    /// Returns `true` if this error is a column conflict error.
    pub fn is_column_conflict(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::ColumnConflict(_)))
    }
}
