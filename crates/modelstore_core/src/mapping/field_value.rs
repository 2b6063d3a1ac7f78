use rusqlite::types::Value;
use uuid::Uuid;

/// Conversion into the store's native value representation.
///
/// `Option::None` maps to `Value::Null`, which filters translate to
/// `IS NULL` and field mappings treat as an absent value.
pub trait FieldValue {
    fn to_value(&self) -> Value;
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FieldValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl FieldValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl FieldValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

/// Stored as hyphenated text so rows stay readable from the sqlite shell.
impl FieldValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }
            }
        )*
    };
}

integer_field_value!(i8, i16, i32, i64, u8, u16, u32);
