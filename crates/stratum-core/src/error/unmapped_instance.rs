use super::Error;

/// Error when a flush targets an instance of a class that is declared but not
/// mapped.
///
/// Always fatal. Carries the offending instance and its identity so the
/// caller can report which object could not be persisted.
#[derive(Debug)]
pub(super) struct UnmappedInstance {
    instance: Box<str>,
    identity: Option<Box<str>>,
}

impl std::error::Error for UnmappedInstance {}

impl core::fmt::Display for UnmappedInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "cannot flush unmapped instance {}", self.instance)?;
        if let Some(identity) = &self.identity {
            write!(f, " (identity: {})", identity)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates an unmapped instance error.
    pub fn unmapped_instance(instance: impl Into<String>, identity: Option<String>) -> Error {
        Error::from(super::ErrorKind::UnmappedInstance(UnmappedInstance {
            instance: instance.into().into(),
            identity: identity.map(Into::into),
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is an unmapped
    /// instance error.
    pub fn is_unmapped_instance(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::UnmappedInstance(_)))
    }
}
