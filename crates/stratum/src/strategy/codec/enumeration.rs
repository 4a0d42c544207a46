use crate::mapping::{MapContext, ValueMapping};

use stratum_core::{
    schema::db::Column,
    stmt::{Type, TypeEnum, Value},
    Error, Result,
};

use std::sync::{Arc, OnceLock};

/// Names are stored in columns at least this wide, leaving room for
/// constants added later.
const MIN_NAME_WIDTH: usize = 20;

/// How enum constants are stored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EnumStorage {
    /// The constant's declared position, as a small integer
    #[default]
    Ordinal,

    /// The constant's name
    Name,
}

/// Stores enum constants by ordinal or name.
///
/// The constant set is looked up once, when the owning value is mapped.
#[derive(Debug, Clone, Default)]
pub struct EnumValueHandler {
    storage: Option<EnumStorage>,
    state: OnceLock<EnumState>,
}

#[derive(Debug, Clone)]
struct EnumState {
    constants: Arc<TypeEnum>,
    storage: EnumStorage,
}

impl EnumValueHandler {
    /// A handler using `storage` regardless of the repository default.
    pub fn with_storage(storage: EnumStorage) -> EnumValueHandler {
        EnumValueHandler {
            storage: Some(storage),
            state: OnceLock::new(),
        }
    }

    /// The storage mode in effect, once mapped.
    pub fn storage(&self) -> Option<EnumStorage> {
        self.state.get().map(|state| state.storage).or(self.storage)
    }

    pub(super) fn plan_columns(
        &self,
        value: &ValueMapping,
        cx: &MapContext<'_>,
    ) -> Result<Vec<Column>> {
        let Type::Enum(name) = value.ty() else {
            return Err(Error::invalid_mapping(format!(
                "enum handler cannot map a value of type {:?}",
                value.ty()
            )));
        };

        let constants = cx.enum_type(name)?;
        let storage = self.storage.unwrap_or(cx.enum_storage());
        let state = self.state.get_or_init(|| EnumState { constants, storage });

        Ok(vec![match state.storage {
            EnumStorage::Ordinal => Column::new("", Type::I16),
            EnumStorage::Name => {
                let width = state.constants.longest_name().max(MIN_NAME_WIDTH);
                Column::new("", Type::String).with_size(width as u64)
            }
        }])
    }

    pub(super) fn to_storage(&self, object: Value) -> Result<Value> {
        let state = self.state()?;

        let constant = match object {
            Value::Null => return Ok(Value::Null),
            Value::Enum(constant) if constant.ty == state.constants.name => constant,
            object => return Err(Error::type_conversion(object, "Enum")),
        };

        let Some(name) = state.constants.name_of(constant.ordinal) else {
            return Err(Error::invalid_value(format!(
                "ordinal {} is out of range for `{}`",
                constant.ordinal, state.constants.name
            )));
        };

        match state.storage {
            EnumStorage::Ordinal => Ok(Value::I16(i16::try_from(constant.ordinal)?)),
            EnumStorage::Name => Ok(Value::from(name)),
        }
    }

    pub(super) fn to_object(&self, stored: Value) -> Result<Value> {
        let state = self.state()?;
        let constants = &state.constants;

        match stored {
            Value::Null => Ok(Value::Null),
            Value::String(name) => constants.by_name(&name).map(Value::Enum).ok_or_else(|| {
                Error::invalid_value(format!(
                    "`{name}` is not a constant of `{}`",
                    constants.name
                ))
            }),
            stored => match stored.as_i128() {
                Some(ordinal) => usize::try_from(ordinal)
                    .ok()
                    .and_then(|ordinal| constants.constant(ordinal))
                    .map(Value::Enum)
                    .ok_or_else(|| {
                        Error::invalid_value(format!(
                            "ordinal {ordinal} is out of range for `{}`",
                            constants.name
                        ))
                    }),
                None => Err(Error::type_conversion(stored, "Enum")),
            },
        }
    }

    fn state(&self) -> Result<&EnumState> {
        self.state
            .get()
            .ok_or_else(|| Error::invalid_mapping("enum handler used before its value was mapped"))
    }
}
