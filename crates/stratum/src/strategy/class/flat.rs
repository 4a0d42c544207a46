use crate::mapping::{ClassLayout, ClassMapping, MapContext};

use stratum_core::{Error, Result};

use std::sync::Arc;

/// Stores a subclass in its superclass's table. The layout is the
/// superclass's own: same table, primary key and column-I/O objects.
pub(super) fn map(cls: &ClassMapping, cx: &mut MapContext<'_>) -> Result<ClassLayout> {
    let Some(superclass) = cls.superclass() else {
        return Err(Error::invalid_mapping(format!(
            "flat class `{}` has no persistent superclass",
            cls.name()
        )));
    };

    if cls.embedding().is_some() {
        return Err(Error::invalid_mapping(format!(
            "flat class `{}` cannot be embedded",
            cls.name()
        )));
    }

    let sup = superclass.layout()?;
    let Some(sup_table) = &sup.table else {
        return Err(Error::invalid_mapping(format!(
            "flat class `{}` requires a mapped superclass but `{}` has no table",
            cls.name(),
            superclass.name()
        )));
    };

    if let Some(name) = cls.table_name() {
        let table = cx.resolve_table(name)?;

        if !Arc::ptr_eq(&table, sup_table) {
            return Err(Error::invalid_mapping(format!(
                "table conflict: flat class `{}` names table `{}` but superclass `{}` is mapped to `{}`",
                cls.name(),
                table.name,
                superclass.name(),
                sup_table.name
            )));
        }
    }

    Ok(sup.clone())
}
