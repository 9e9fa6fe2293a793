use super::Error;

/// Error when an abstract concrete base is used before `configure()` has
/// built its union.
#[derive(Debug)]
pub(super) struct MappingPendingError {
    class: Box<str>,
    subclasses: Vec<String>,
}

impl std::error::Error for MappingPendingError {}

impl core::fmt::Display for MappingPendingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "class '{}' is an abstract concrete base and has a mapping pending until all subclasses are defined (known subclasses: [",
            self.class
        )?;

        let mut s = "";
        for subclass in &self.subclasses {
            write!(f, "{s}'{subclass}'")?;
            s = ", ";
        }

        f.write_str(
            "]); call `Metadata::configure()` after all subclasses have been defined to complete the mapping of this class",
        )
    }
}

impl Error {
    /// Creates a mapping pending error.
    pub fn mapping_pending(class: impl Into<String>, subclasses: Vec<String>) -> Error {
        Error::from(super::ErrorKind::MappingPending(MappingPendingError {
            class: class.into().into(),
            subclasses,
        }))
    }

    /// Returns `true` if this error is a mapping pending error.
    pub fn is_mapping_pending(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::MappingPending(_)))
    }
}
