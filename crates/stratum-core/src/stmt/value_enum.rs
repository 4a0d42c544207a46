use std::sync::Arc;

/// A constant of a registered enum type, identified by its declared position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueEnum {
    /// Name of the enum type
    pub ty: Arc<str>,

    /// Declared position of the constant
    pub ordinal: usize,
}

impl ValueEnum {
    pub fn new(ty: impl Into<Arc<str>>, ordinal: usize) -> ValueEnum {
        ValueEnum {
            ty: ty.into(),
            ordinal,
        }
    }
}
