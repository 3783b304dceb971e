use thiserror::Error;

pub type Result<T, E = LocatorError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("frame capture error: {0}")]
    Capture(String),
    #[error("detection service error: {0}")]
    Service(String),
    #[error("malformed detection response: {0}")]
    Malformed(String),
}
