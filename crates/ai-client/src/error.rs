use thiserror::Error;

pub type Result<T, E = AiError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed service response: {0}")]
    Malformed(String),
    #[error("audio encode error: {0}")]
    Encode(String),
    #[error("frame capture error: {0}")]
    Capture(String),
    #[error("backend unavailable: {0}")]
    Unavailable(&'static str),
}

#[cfg(any(feature = "openai", feature = "elevenlabs", feature = "http-vision"))]
impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Http(e.to_string())
    }
}
