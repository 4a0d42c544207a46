use super::Error;

/// Error when mapping metadata is definitionally wrong.
///
/// This occurs when:
/// - A strategy is attached in the wrong embedding context
/// - A field's declared type does not match the representation a strategy requires
/// - A subclass resolves to a different table than its flat superclass
/// - A declared enum type has no registered constant set
/// - A strategy alias cannot be resolved
///
/// These errors are detected once, while the repository maps its classes, and
/// are never retried.
#[derive(Debug)]
pub(super) struct InvalidMapping {
    message: Box<str>,
}

impl std::error::Error for InvalidMapping {}

impl core::fmt::Display for InvalidMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMapping {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is an invalid
    /// mapping error.
    pub fn is_invalid_mapping(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::InvalidMapping(_)))
    }
}
