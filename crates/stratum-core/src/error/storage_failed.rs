use super::Error;

/// Error when the storage collaborator fails during custom I/O.
///
/// Wraps failures raised by a [`Store`](crate::Store) or a large-object handle
/// while inserting, updating, deleting, loading or streaming. The underlying
/// error is kept as the source and is never retried at this layer.
#[derive(Debug)]
pub(super) struct StorageFailed {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for StorageFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for StorageFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a storage failure.
    pub fn storage_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::StorageFailed(StorageFailed {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is a storage
    /// failure.
    pub fn is_storage_failed(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::StorageFailed(_)))
    }
}
