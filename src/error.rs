// Error types shared by the enum wrapper and the keyed table

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnumError>;

#[derive(Debug, Error)]
pub enum EnumError {
    #[error("Cannot build a typed value from an absent enum value")]
    NullValue,

    #[error("Enum type mismatch: {left} vs {right}")]
    TypeMismatch { left: String, right: String },

    #[error("Unknown variant '{name}' for enum {type_name}")]
    UnknownVariant { type_name: String, name: String },

    #[error("Empty value text for enum {type_name}")]
    EmptyValueText { type_name: String },

    #[error("Invalid numeric value '{text}' for enum {type_name}")]
    InvalidNumber { type_name: String, text: String },

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
