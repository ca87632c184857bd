use thiserror::Error;


/// Every failure the codecs and the engine can report.
///
/// Errors abort the whole encode/decode. A failed write may already have
/// emitted bytes, so the buffer should be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("duplicate field id {id} in struct {struct_name} (field `{field}`)")]
    DuplicateFieldId { struct_name: String, field: String, id: u32 },

    #[error("invalid field id {id} in struct {struct_name} (field `{field}`)")]
    InvalidFieldId { struct_name: String, field: String, id: u32 },

    #[error("cannot access field {struct_name}.{field}")]
    FieldAccess { struct_name: String, field: String },

    #[error("cannot construct struct {0}")]
    StructConstruction(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("end of buffer")]
    EndOfBuffer,

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("invalid token `{token}`, expected {expected}")]
    InvalidToken { token: String, expected: &'static str },

    #[error("string payload is not valid utf-8")]
    InvalidUtf8,

    #[error("varint does not fit in {0} bits")]
    VarintOverflow(u32),

    #[error("value {0} does not fit in a packed header")]
    SizeOverflow(u64),

    #[error("{what} of {value} exceeds the limit of {limit}")]
    LimitExceeded { what: &'static str, value: u64, limit: u64 },

    #[error("trailing data after the root value")]
    TrailingData,

    #[error("buffer error: {0}")]
    Buffer(String),
}

impl Error {
    pub(crate) fn mismatch(expected: impl std::fmt::Debug, found: impl std::fmt::Display) -> Error {
        Error::TypeMismatch {
            expected: format!("{:?}", expected),
            found:    found.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
