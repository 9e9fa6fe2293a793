use super::Error;

/// Error when an attribute is accessed on a class, or on an instance of a
/// class, that does not expose it.
#[derive(Debug)]
pub(super) struct AttributeAccessError {
    class: Box<str>,
    attribute: Box<str>,
    reason: Reason,
}

#[derive(Debug)]
enum Reason {
    /// The class has no such attribute.
    NotFound,

    /// A concrete class inherits the key from its base but maps no column for it.
    ConcreteNotImplemented,

    /// The attribute is mapped but was not part of the loaded row.
    NotLoaded,
}

impl std::error::Error for AttributeAccessError {}

impl core::fmt::Display for AttributeAccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.reason {
            Reason::NotFound => write!(
                f,
                "'{}' has no attribute '{}'",
                self.class, self.attribute
            ),
            Reason::ConcreteNotImplemented => write!(
                f,
                "concrete class '{}' does not implement attribute '{}' at the instance level; add this property explicitly to '{}'",
                self.class, self.attribute, self.class
            ),
            Reason::NotLoaded => write!(
                f,
                "attribute '{}' of '{}' is not loaded",
                self.attribute, self.class
            ),
        }
    }
}

impl Error {
    /// Creates an error for an attribute the class does not expose.
    pub fn attribute_not_found(class: impl Into<String>, attribute: impl Into<String>) -> Error {
        Error::attribute_access(class, attribute, Reason::NotFound)
    }

    /// Creates an error for an attribute a concrete class inherits by name but
    /// does not implement.
    pub fn attribute_not_implemented(
        class: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Error {
        Error::attribute_access(class, attribute, Reason::ConcreteNotImplemented)
    }

    /// Creates an error for a mapped attribute missing from a partial load.
    pub fn attribute_not_loaded(class: impl Into<String>, attribute: impl Into<String>) -> Error {
        Error::attribute_access(class, attribute, Reason::NotLoaded)
    }

    fn attribute_access(
        class: impl Into<String>,
        attribute: impl Into<String>,
        reason: Reason,
    ) -> Error {
        Error::from(super::ErrorKind::AttributeAccess(AttributeAccessError {
            class: class.into().into(),
            attribute: attribute.into().into(),
            reason,
        }))
    }

    /// Returns `true` if this error is an attribute access error.
    pub fn is_attribute_access(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::AttributeAccess(_)))
    }
}
