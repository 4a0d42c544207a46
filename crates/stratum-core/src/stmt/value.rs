use super::{Type, ValueEnum};
use crate::{Error, Result};

/// A value as seen either by the object model or by a storage column.
///
/// The same enum is used on both sides of a codec: object values carry the
/// shape the application declared (`Chars`, boxed `List`s, `Enum`), storage
/// values carry what a column holds (`String`, `Bytes`, `I16`, ...).
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 8-bit integer
    I8(i8),

    /// Signed 16-bit integer
    I16(i16),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Unsigned 8-bit integer, the element of a byte array
    U8(u8),

    /// 32-bit float
    F32(f32),

    /// 64-bit float
    F64(f64),

    /// Arbitrary precision integer, bounded to 128 bits
    BigInt(i128),

    /// A single character
    Char(char),

    /// String value
    String(String),

    /// An unboxed byte array
    Bytes(Vec<u8>),

    /// An unboxed character array
    Chars(Vec<char>),

    /// An instant in time
    Timestamp(jiff::Timestamp),

    /// A civil date
    Date(jiff::civil::Date),

    /// A locale tag, e.g. `en-US`
    Locale(String),

    /// A constant of a registered enum type
    Enum(ValueEnum),

    /// A list of boxed values of the same type
    List(Vec<Value>),

    /// A fixed-length tuple, e.g. a multi-column version vector
    Record(Vec<Value>),

    /// Null value
    #[default]
    Null,
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn record_from_vec(fields: Vec<Self>) -> Self {
        Self::Record(fields)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&[Value]> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is any of the integer variants.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::I8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            Self::U8(v) => Some(v.into()),
            Self::BigInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_string_value(self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v),
            value => Err(Error::type_conversion(value, "String")),
        }
    }

    pub fn to_option_string(self) -> Result<Option<String>> {
        match self {
            Self::Null => Ok(None),
            Self::String(v) => Ok(Some(v)),
            value => Err(Error::type_conversion(value, "String")),
        }
    }

    /// The variant name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::I8(_) => "I8",
            Self::I16(_) => "I16",
            Self::I32(_) => "I32",
            Self::I64(_) => "I64",
            Self::U8(_) => "U8",
            Self::F32(_) => "F32",
            Self::F64(_) => "F64",
            Self::BigInt(_) => "BigInt",
            Self::Char(_) => "Char",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Chars(_) => "Chars",
            Self::Timestamp(_) => "Timestamp",
            Self::Date(_) => "Date",
            Self::Locale(_) => "Locale",
            Self::Enum(_) => "Enum",
            Self::List(_) => "List",
            Self::Record(_) => "Record",
            Self::Null => "Null",
        }
    }

    /// Returns `true` if the value can be stored in a column of type `ty`.
    pub fn is_a(&self, ty: &Type) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(_) => ty.is_bool(),
            Self::I8(_) => matches!(ty, Type::I8),
            Self::I16(_) => matches!(ty, Type::I16),
            Self::I32(_) => matches!(ty, Type::I32),
            Self::I64(_) => matches!(ty, Type::I64),
            Self::U8(_) => matches!(ty, Type::U8),
            Self::F32(_) => matches!(ty, Type::F32),
            Self::F64(_) => matches!(ty, Type::F64),
            Self::BigInt(_) => matches!(ty, Type::BigInt),
            Self::Char(_) => matches!(ty, Type::Char),
            Self::String(_) => ty.is_string(),
            Self::Bytes(_) => matches!(ty, Type::Bytes),
            Self::Chars(_) => matches!(ty, Type::Chars),
            Self::Timestamp(_) => matches!(ty, Type::Timestamp),
            Self::Date(_) => matches!(ty, Type::Date),
            Self::Locale(_) => matches!(ty, Type::Locale),
            Self::Enum(value) => matches!(ty, Type::Enum(name) if *name == value.ty),
            Self::List(items) => match ty {
                Type::List(item_ty) => items.iter().all(|item| item.is_a(item_ty)),
                _ => false,
            },
            Self::Record(fields) => match ty {
                Type::Record(tys) if tys.len() == fields.len() => {
                    fields.iter().zip(tys).all(|(field, ty)| field.is_a(ty))
                }
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::I16(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<jiff::Timestamp> for Value {
    fn from(value: jiff::Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl From<ValueEnum> for Value {
    fn from(value: ValueEnum) -> Self {
        Self::Enum(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}
