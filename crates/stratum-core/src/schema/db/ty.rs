use crate::{driver, stmt, Error, Result};

/// Database-level storage types representing how values are stored in the
/// target database.
///
/// A [`Column`](super::Column) carries both its `stmt::Type` (how the object
/// model sees the value) and its `db::Type` (how the database stores it). The
/// mapping from the former to the latter happens in [`Type::from_app`], driven
/// by the active [`Dictionary`](driver::Dictionary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A boolean value
    Boolean,

    /// A signed integer of `n` bytes
    Integer(u8),

    /// A floating point number of `n` bytes
    Float(u8),

    /// Arbitrary-precision decimal
    Numeric,

    /// A single character
    Char,

    /// Unconstrained text type. Large strings live here.
    Text,

    /// Text type with an explicit maximum length
    VarChar(u64),

    /// Unconstrained binary type. Large byte arrays live here.
    Blob,

    /// Binary type with an explicit maximum length
    VarBinary(u64),

    /// An instant in time
    Timestamp,

    /// A civil date
    Date,

    /// User-specified unrecognized type
    Custom(String),
}

impl Type {
    /// Maps an application-level type to a database-level storage type.
    ///
    /// `size` is the planned column size; `None` requests an unsized (large
    /// object) representation for strings and byte arrays.
    pub fn from_app(
        ty: &stmt::Type,
        size: Option<u64>,
        hint: Option<&Type>,
        db: &driver::StorageTypes,
    ) -> Result<Type> {
        if let Some(hint) = hint {
            return Ok(hint.clone());
        }

        Ok(match ty {
            stmt::Type::Bool => Type::Boolean,
            stmt::Type::I8 | stmt::Type::U8 => Type::Integer(1),
            stmt::Type::I16 => Type::Integer(2),
            stmt::Type::I32 => Type::Integer(4),
            stmt::Type::I64 => Type::Integer(8),
            stmt::Type::F32 => Type::Float(4),
            stmt::Type::F64 => Type::Float(8),
            stmt::Type::BigInt => Type::Numeric,
            stmt::Type::Char => Type::Char,
            stmt::Type::String | stmt::Type::Chars | stmt::Type::Locale => match size {
                Some(size) if db.varchar.is_some_and(|max| size <= max) => Type::VarChar(size),
                Some(_) | None => Type::Text,
            },
            stmt::Type::Bytes => match size {
                Some(size) if db.varbinary.is_some_and(|max| size <= max) => {
                    Type::VarBinary(size)
                }
                Some(_) | None => Type::Blob,
            },
            stmt::Type::Timestamp => Type::Timestamp,
            stmt::Type::Date => Type::Date,
            _ => {
                return Err(Error::invalid_mapping(format!(
                    "type {} has no column representation",
                    ty.name()
                )))
            }
        })
    }

    /// The storage type used before a dictionary is consulted.
    pub fn from_app_default(ty: &stmt::Type) -> Type {
        Type::from_app(ty, None, None, &driver::StorageTypes::GENERIC)
            .unwrap_or_else(|_| Type::Custom(ty.name().to_string()))
    }

    /// The integer object type that best holds values of this storage type.
    /// Non-integer storage types default to `I32`.
    pub fn integer_app_ty(&self) -> stmt::Type {
        match self {
            Type::Integer(1) => stmt::Type::I8,
            Type::Integer(2) => stmt::Type::I16,
            Type::Integer(8) => stmt::Type::I64,
            Type::Numeric => stmt::Type::BigInt,
            _ => stmt::Type::I32,
        }
    }

    pub fn is_large_object(&self) -> bool {
        matches!(self, Type::Text | Type::Blob)
    }
}
