use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Failure turning a stored text value back into a typed value.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid integer {value:?}")]
    Integer { value: String },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Helper to write an integer as decimal text.
pub fn write_int<T: ToString>(value: T) -> String {
    value.to_string()
}

/// Helper to read an integer from decimal text.
pub fn read_int<T: std::str::FromStr>(value: &str) -> Result<T, CodecError> {
    value.trim().parse().map_err(|_| CodecError::Integer {
        value: value.to_string(),
    })
}

/// Helper to write a value as JSON text.
pub fn write_json<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Helper to read a value from JSON text.
pub fn read_json<T: DeserializeOwned>(value: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(value)?)
}
