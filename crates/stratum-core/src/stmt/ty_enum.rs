use super::ValueEnum;
use crate::{Error, Result};

use indexmap::IndexSet;
use std::sync::Arc;

/// The fixed, ordered constant set of an enum type.
///
/// Constants are enumerated once, when the type is registered, and looked up
/// either by position or by exact name afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEnum {
    /// Name of the enum type
    pub name: Arc<str>,

    /// Constant names, by declared position
    constants: IndexSet<String>,
}

impl TypeEnum {
    /// Registers an enum type with its constants in declaration order.
    ///
    /// Fails if the type declares no constants or repeats a name: such a type
    /// has no usable ordered constant set.
    pub fn new<I, S>(name: impl Into<Arc<str>>, constants: I) -> Result<TypeEnum>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut set = IndexSet::new();

        for constant in constants {
            let constant = constant.into();
            if !set.insert(constant.clone()) {
                return Err(Error::invalid_mapping(format!(
                    "enum `{name}` declares constant `{constant}` more than once"
                )));
            }
        }

        if set.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "enum `{name}` declares no constants"
            )));
        }

        Ok(TypeEnum {
            name,
            constants: set,
        })
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Constant names in declaration order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.constants.iter().map(String::as_str)
    }

    /// Length of the longest constant name.
    pub fn longest_name(&self) -> usize {
        self.names().map(|name| name.chars().count()).max().unwrap_or(0)
    }

    /// The constant at `ordinal`.
    pub fn constant(&self, ordinal: usize) -> Option<ValueEnum> {
        (ordinal < self.constants.len()).then(|| ValueEnum::new(self.name.clone(), ordinal))
    }

    /// The name of the constant at `ordinal`.
    pub fn name_of(&self, ordinal: usize) -> Option<&str> {
        self.constants.get_index(ordinal).map(String::as_str)
    }

    /// Exact-match lookup by constant name.
    pub fn by_name(&self, name: &str) -> Option<ValueEnum> {
        self.constants
            .get_index_of(name)
            .map(|ordinal| ValueEnum::new(self.name.clone(), ordinal))
    }

    /// Every constant, in declaration order.
    pub fn constants(&self) -> impl ExactSizeIterator<Item = ValueEnum> + '_ {
        (0..self.constants.len()).map(|ordinal| ValueEnum::new(self.name.clone(), ordinal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_position_and_name() {
        let color = TypeEnum::new("Color", ["RED", "GREEN", "BLUE"]).unwrap();

        assert_eq!(color.len(), 3);
        assert_eq!(color.name_of(1), Some("GREEN"));
        assert_eq!(color.by_name("BLUE"), Some(ValueEnum::new("Color", 2)));
        assert_eq!(color.by_name("blue"), None);
        assert_eq!(color.constant(3), None);
        assert_eq!(color.longest_name(), 5);
    }

    #[test]
    fn empty_enum_is_rejected() {
        let err = TypeEnum::new("Nothing", Vec::<String>::new()).unwrap_err();
        assert!(err.is_invalid_mapping());
    }

    #[test]
    fn duplicate_constant_is_rejected() {
        let err = TypeEnum::new("Twice", ["A", "A"]).unwrap_err();
        assert!(err.is_invalid_mapping());
    }
}
