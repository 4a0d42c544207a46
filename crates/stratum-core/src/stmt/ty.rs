use super::Value;
use crate::{Error, Result};

use std::sync::Arc;

/// The object-level type of a value: what a field declares and what a column
/// carries from the object model's point of view.
///
/// The storage type of a column is described separately by
/// [`db::Type`](crate::schema::db::Type).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean value
    Bool,

    /// Signed 8-bit integer
    I8,

    /// Signed 16-bit integer
    I16,

    /// Signed 32-bit integer
    I32,

    /// Signed 64-bit integer
    I64,

    /// Unsigned 8-bit integer
    U8,

    /// 32-bit float
    F32,

    /// 64-bit float
    F64,

    /// Arbitrary precision integer
    BigInt,

    /// Single character
    Char,

    /// String type
    String,

    /// Unboxed byte array
    Bytes,

    /// Unboxed character array
    Chars,

    /// An instant in time
    Timestamp,

    /// A civil date
    Date,

    /// A locale tag
    Locale,

    /// A registered enum type, by name
    Enum(Arc<str>),

    /// An embedded or object-id class, by described type name
    Model(Arc<str>),

    /// A list of boxed items of a single type
    List(Box<Type>),

    /// A fixed-length tuple where each item can have a different type
    Record(Vec<Type>),

    /// Any other object type. Never compared for optimistic versioning.
    Object,
}

impl Type {
    pub fn list(ty: impl Into<Self>) -> Self {
        Self::List(Box::new(ty.into()))
    }

    pub fn model(name: impl Into<Arc<str>>) -> Self {
        Self::Model(name.into())
    }

    pub fn enumeration(name: impl Into<Arc<str>>) -> Self {
        Self::Enum(name.into())
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::U8 | Self::BigInt
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64)
    }

    /// Returns `true` for the scalar kinds an immutable value may take:
    /// booleans, numbers, characters, strings, dates, timestamps and locales.
    pub fn is_scalar(&self) -> bool {
        self.is_numeric()
            || matches!(
                self,
                Self::Bool
                    | Self::Char
                    | Self::String
                    | Self::Timestamp
                    | Self::Date
                    | Self::Locale
            )
    }

    /// Converts an integer into a value of this (integer) type.
    pub fn cast_integer(&self, value: i128) -> Result<Value> {
        let out_of_range = || Error::type_conversion(Value::BigInt(value), self.name());

        Ok(match self {
            Self::I8 => Value::I8(value.try_into().map_err(|_| out_of_range())?),
            Self::I16 => Value::I16(value.try_into().map_err(|_| out_of_range())?),
            Self::I32 => Value::I32(value.try_into().map_err(|_| out_of_range())?),
            Self::I64 => Value::I64(value.try_into().map_err(|_| out_of_range())?),
            Self::U8 => Value::U8(value.try_into().map_err(|_| out_of_range())?),
            Self::BigInt => Value::BigInt(value),
            _ => return Err(out_of_range()),
        })
    }

    /// The value that stands for "nothing" in a column of this type without
    /// being SQL `NULL`: zero, `false` or the empty string.
    ///
    /// Returns `Null` for types that have no such value.
    pub fn empty_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::BigInt => Value::BigInt(0),
            Self::Char => Value::Char('\0'),
            Self::String => Value::String(String::new()),
            _ => Value::Null,
        }
    }

    /// A value of this type that is distinct from [`Type::empty_value`].
    pub fn non_empty_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(true),
            Self::I8 => Value::I8(1),
            Self::I16 => Value::I16(1),
            Self::I32 => Value::I32(1),
            Self::I64 => Value::I64(1),
            Self::U8 => Value::U8(1),
            Self::F32 => Value::F32(1.0),
            Self::F64 => Value::F64(1.0),
            Self::BigInt => Value::BigInt(1),
            Self::Char => Value::Char('1'),
            Self::String => Value::String("1".to_string()),
            _ => Value::Null,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::I8 => "I8",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::U8 => "U8",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::BigInt => "BigInt",
            Self::Char => "Char",
            Self::String => "String",
            Self::Bytes => "Bytes",
            Self::Chars => "Chars",
            Self::Timestamp => "Timestamp",
            Self::Date => "Date",
            Self::Locale => "Locale",
            Self::Enum(_) => "Enum",
            Self::Model(_) => "Model",
            Self::List(_) => "List",
            Self::Record(_) => "Record",
            Self::Object => "Object",
        }
    }
}
