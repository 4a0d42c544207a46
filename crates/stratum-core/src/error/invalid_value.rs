use super::Error;

/// Error when a stored value cannot be decoded into an object value.
///
/// For example, a stored enum name that matches none of the declared
/// constants. Scoped to the load or flush in progress.
#[derive(Debug)]
pub(super) struct InvalidValue {
    message: Box<str>,
}

impl std::error::Error for InvalidValue {}

impl core::fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid value: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidValue(InvalidValue {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is an invalid
    /// value error.
    pub fn is_invalid_value(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::InvalidValue(_)))
    }
}
