//! Error types shared by the catalog, dispatcher and codecs.

use model_pack_buffers::BufferError;
use thiserror::Error;

use crate::document::DocumentError;

/// Error returned by every model-pack operation.
///
/// No codec returns a partially populated model alongside an error; a failed
/// read yields nothing usable.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported field type {type_name} for field `{field}` in model {model}")]
    UnsupportedField {
        model: &'static str,
        field: &'static str,
        type_name: String,
    },
    #[error("field order mismatch in model {model}: expected `{expected}`, found `{found}`")]
    OrderMismatch {
        model: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("type mismatch for field `{field}` in model {model}: expected {expected}, found {found}")]
    TypeMismatch {
        model: &'static str,
        field: &'static str,
        expected: String,
        found: &'static str,
    },
    #[error("model {model} must be read from an object, found {found}")]
    NotAnObject {
        model: &'static str,
        found: &'static str,
    },
    #[error("invalid value for field `{field}` in model {model}: {reason}")]
    InvalidValue {
        model: &'static str,
        field: &'static str,
        reason: String,
    },
    #[error("unknown field `{field}` in model {model}")]
    UnknownField { model: &'static str, field: String },
    #[error("expected a {expected} record, found {found}")]
    WrongModel {
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown model `{0}`")]
    UnknownModel(String),
    #[error("model `{0}` is already registered")]
    DuplicateModel(&'static str),
    #[error("nesting deeper than {limit} levels while reading model {model}")]
    DepthExceeded { model: &'static str, limit: usize },
    #[error("length {len} of field `{field}` in model {model} exceeds the limit of {limit}")]
    LengthExceeded {
        model: &'static str,
        field: &'static str,
        len: usize,
        limit: usize,
    },
    #[error("binary stream error: {0}")]
    Buffer(#[from] BufferError),
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

/// Conversion failure reported by [`crate::FieldType::from_value`].
///
/// The conversion itself does not know which model or field it serves; the
/// caller attaches that context with [`FieldError::at`].
#[derive(Debug)]
pub enum FieldError {
    Mismatch {
        expected: String,
        found: &'static str,
    },
    Nested(Box<ModelError>),
}

impl FieldError {
    pub fn mismatch(expected: impl Into<String>, found: &'static str) -> Self {
        FieldError::Mismatch {
            expected: expected.into(),
            found,
        }
    }

    /// Attaches the owning model and field name.
    pub fn at(self, model: &'static str, field: &'static str) -> ModelError {
        match self {
            FieldError::Mismatch { expected, found } => ModelError::TypeMismatch {
                model,
                field,
                expected,
                found,
            },
            FieldError::Nested(err) => *err,
        }
    }
}

impl From<ModelError> for FieldError {
    fn from(err: ModelError) -> Self {
        FieldError::Nested(Box::new(err))
    }
}
