use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("malformed percent escape at byte {offset}")]
    MalformedEscape { offset: usize },
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum MessageError {
    #[error("message must be a JSON object")]
    NotAnObject,
    #[error("message is missing a `type` field")]
    MissingType,
    #[error("unsupported message type `{0}`")]
    UnsupportedType(String),
}
