use super::Error;

/// Error when a class declaration cannot be turned into a mapping.
///
/// This occurs when:
/// - A class has more than one independently mapped base
/// - A single-table subclass declares a primary key column or table arguments
/// - A class neither names a table nor inherits one
/// - A discriminator, version column or foreign key target cannot be resolved
#[derive(Debug)]
pub(super) struct ConfigurationError {
    message: Box<str>,
}

impl std::error::Error for ConfigurationError {}

impl core::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Configuration(ConfigurationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::Configuration(_)))
    }
}
