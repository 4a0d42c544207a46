use crate::mapping::{ClassLayout, ClassMapping, ValueKind};

use stratum_core::{schema::db::ColumnIo, Error, Result};

use std::sync::Arc;

/// An embedded identity class takes the table of the field holding it and
/// has no primary key of its own.
pub(super) fn map(cls: &ClassMapping) -> Result<ClassLayout> {
    let Some(embedding) = cls.embedding() else {
        return Err(Error::invalid_mapping(format!(
            "object id class `{}` is not embedded in an identity field",
            cls.name()
        )));
    };

    let field = embedding.field();
    if field.value().kind() != ValueKind::ObjectId {
        return Err(Error::invalid_mapping(format!(
            "object id class `{}` is embedded in `{}.{}`, which is not an identity value",
            cls.name(),
            embedding.owner().name(),
            field.name()
        )));
    }

    if *field.value().ty() != cls.ty() {
        return Err(Error::invalid_mapping(format!(
            "object id class `{}` does not match type {:?} of `{}.{}`",
            cls.name(),
            field.value().ty(),
            embedding.owner().name(),
            field.name()
        )));
    }

    Ok(ClassLayout {
        identity: cls.identity(),
        oid_ty: None,
        table: embedding.owner().layout()?.table.clone(),
        primary_key: Vec::new().into(),
        io: Arc::new(ColumnIo::default()),
    })
}
