use super::Error;

/// Error when no unique join condition exists between a joined-table
/// subclass and its parent.
#[derive(Debug)]
pub(super) struct AmbiguousJoinError {
    child: Box<str>,
    parent: Box<str>,
    candidates: usize,
}

impl std::error::Error for AmbiguousJoinError {}

impl core::fmt::Display for AmbiguousJoinError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.candidates == 0 {
            write!(
                f,
                "can't find any foreign key relationships between '{}' and '{}'",
                self.parent, self.child
            )?;
        } else {
            write!(
                f,
                "can't determine join between '{}' and '{}'; found {} foreign key relationships between them",
                self.parent, self.child, self.candidates
            )?;
        }

        f.write_str("; specify an explicit inherit condition")
    }
}

impl Error {
    /// Creates an ambiguous join error. `candidates` is the number of
    /// foreign-key-linked primary key pairs found.
    pub fn ambiguous_join(
        child: impl Into<String>,
        parent: impl Into<String>,
        candidates: usize,
    ) -> Error {
        Error::from(super::ErrorKind::AmbiguousJoin(AmbiguousJoinError {
            child: child.into().into(),
            parent: parent.into().into(),
            candidates,
        }))
    }

    /// Returns `true` if this error is an ambiguous join error.
    pub fn is_ambiguous_join(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::AmbiguousJoin(_)))
    }
}
