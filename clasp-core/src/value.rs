use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed host value exchanged with a backend.
///
/// Every variant wraps an `Option` so that a typed NULL keeps its type
/// information, the way a backend reports it.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    List(Option<Vec<Value>>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::List(v) => v.is_none(),
        }
    }

    /// Textual content of the value, when it has one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Varchar(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Byte content of the value, text counts as its UTF-8 bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Varchar(Some(v)) => Some(v.as_bytes()),
            Value::Blob(Some(v)) => Some(v),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! write_opt {
            ($v:expr) => {
                match $v {
                    Some(v) => write!(f, "{}", v),
                    None => write!(f, "NULL"),
                }
            };
        }
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write_opt!(v),
            Value::Int8(v) => write_opt!(v),
            Value::Int16(v) => write_opt!(v),
            Value::Int32(v) => write_opt!(v),
            Value::Int64(v) => write_opt!(v),
            Value::Float32(v) => write_opt!(v),
            Value::Float64(v) => write_opt!(v),
            Value::Decimal(v) => write_opt!(v),
            Value::Varchar(v) => write_opt!(v),
            Value::Blob(v) => match v {
                Some(v) => write!(f, "<{} bytes>", v.len()),
                None => write!(f, "NULL"),
            },
            Value::Date(v) => write_opt!(v),
            Value::Time(v) => write_opt!(v),
            Value::Timestamp(v) => write_opt!(v),
            Value::TimestampWithTimezone(v) => write_opt!(v),
            Value::Uuid(v) => write_opt!(v),
            Value::List(v) => match v {
                Some(v) => {
                    write!(f, "[")?;
                    for (i, v) in v.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", v)?;
                    }
                    write!(f, "]")
                }
                None => write!(f, "NULL"),
            },
        }
    }
}
