use std::collections::BTreeSet;

/// Per-column insert/update permissions of a class or field mapping.
///
/// Columns are addressed by their position in the owner's column list. By
/// default every column is insertable and updatable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColumnIo {
    unsertable: BTreeSet<usize>,
    unupdatable: BTreeSet<usize>,
}

impl ColumnIo {
    pub fn is_insertable(&self, index: usize) -> bool {
        !self.unsertable.contains(&index)
    }

    pub fn is_updatable(&self, index: usize) -> bool {
        !self.unupdatable.contains(&index)
    }

    pub fn set_insertable(&mut self, index: usize, insertable: bool) -> &mut Self {
        restrict(&mut self.unsertable, index, !insertable);
        self
    }

    pub fn set_updatable(&mut self, index: usize, updatable: bool) -> &mut Self {
        restrict(&mut self.unupdatable, index, !updatable);
        self
    }

    /// Returns `true` if no column is restricted.
    pub fn is_unrestricted(&self) -> bool {
        self.unsertable.is_empty() && self.unupdatable.is_empty()
    }
}

fn restrict(restricted: &mut BTreeSet<usize>, index: usize, value: bool) {
    if value {
        restricted.insert(index);
    } else {
        restricted.remove(&index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut io = ColumnIo::default();
        assert!(io.is_unrestricted());

        io.set_insertable(1, false).set_updatable(2, false);
        assert!(io.is_insertable(0));
        assert!(!io.is_insertable(1));
        assert!(io.is_updatable(1));
        assert!(!io.is_updatable(2));

        io.set_insertable(1, true).set_updatable(2, true);
        assert!(io.is_unrestricted());
        assert_eq!(io, ColumnIo::default());
    }

    #[test]
    fn wide_column_lists() {
        let mut io = ColumnIo::default();
        io.set_insertable(64, false).set_updatable(200, false);

        assert!(!io.is_insertable(64));
        assert!(io.is_insertable(63));
        assert!(!io.is_updatable(200));
        assert!(io.is_updatable(64));
        assert!(!io.is_unrestricted());
    }
}
