use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`]
/// representation that backs parameter stores and cursor rows.
pub trait AsValue {
    /// A NULL-like value carrying the type information of `Self`.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] back into `Self`. The canonical
    /// variant is always accepted, integers additionally accept wider
    /// variants with a range check.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    other => Err(Error::msg(format!(
                        "Cannot convert the value `{}` into {}",
                        other,
                        any::type_name::<Self>(),
                    ))),
                }
            }
        }
    };
}

macro_rules! narrow {
    ($v:expr, $target:ty) => {{
        let v = $v;
        <$target>::try_from(v).map_err(|_| {
            Error::msg(format!(
                "Value {} is out of range for {}",
                v,
                any::type_name::<$target>(),
            ))
        })
    }};
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(
    i8,
    Value::Int8,
    Value::Int16(Some(v)) => narrow!(v, i8),
    Value::Int32(Some(v)) => narrow!(v, i8),
    Value::Int64(Some(v)) => narrow!(v, i8),
);
impl_as_value!(
    i16,
    Value::Int16,
    Value::Int8(Some(v)) => Ok(v as i16),
    Value::Int32(Some(v)) => narrow!(v, i16),
    Value::Int64(Some(v)) => narrow!(v, i16),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int8(Some(v)) => Ok(v as i32),
    Value::Int16(Some(v)) => Ok(v as i32),
    Value::Int64(Some(v)) => narrow!(v, i32),
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int8(Some(v)) => Ok(v as i64),
    Value::Int16(Some(v)) => Ok(v as i64),
    Value::Int32(Some(v)) => Ok(v as i64),
);
impl_as_value!(
    f32,
    Value::Float32,
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Float32(Some(v)) => Ok(v as f64),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Int8(Some(v)) => Ok(Decimal::from(v)),
    Value::Int16(Some(v)) => Ok(Decimal::from(v)),
    Value::Int32(Some(v)) => Ok(Decimal::from(v)),
    Value::Int64(Some(v)) => Ok(Decimal::from(v)),
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(
    Box<[u8]>,
    Value::Blob,
    Value::Varchar(Some(v)) => Ok(v.into_bytes().into()),
);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(Uuid, Value::Uuid);

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        <Box<[u8]>>::try_from_value(value).map(Into::into)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_empty_value() -> Value {
        Value::List(None)
    }
    fn as_value(self) -> Value {
        Value::List(Some(self.into_iter().map(AsValue::as_value).collect()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(Some(v)) => v.into_iter().map(T::try_from_value).collect(),
            other => Err(Error::msg(format!(
                "Cannot convert the value `{}` into {}",
                other,
                any::type_name::<Self>(),
            ))),
        }
    }
}
