use rusqlite::types::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Values that must be converted into a serialized form before the store
/// can hold them.
pub trait Transformable {
    fn transform(&self) -> Result<Value, TransformError>;
}

impl<T: Transformable> Transformable for Option<T> {
    fn transform(&self) -> Result<Value, TransformError> {
        match self {
            Some(value) => value.transform(),
            None => Ok(Value::Null),
        }
    }
}

/// Wrapper storing any serde value as a JSON text column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Transformable for Json<T> {
    fn transform(&self) -> Result<Value, TransformError> {
        serde_json::to_string(&self.0)
            .map(Value::Text)
            .map_err(|err| TransformError::new(format!("json encode failed: {err}")))
    }
}

impl<T: DeserializeOwned> Json<T> {
    /// Decodes a column previously written by `transform`.
    pub fn from_stored(text: &str) -> Result<Self, TransformError> {
        serde_json::from_str(text)
            .map(Json)
            .map_err(|err| TransformError::new(format!("json decode failed: {err}")))
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError {
    message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "value transform failed: {}", self.message)
    }
}

impl Error for TransformError {}
