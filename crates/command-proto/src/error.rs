use thiserror::Error;

pub type Result<T, E = ProtoError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("command payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("top-level command payload is not a list")]
    NotASequence,
}
