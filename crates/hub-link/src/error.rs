use thiserror::Error;

pub type Result<T, E = LinkError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("hub is disconnected")]
    Disconnected,
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("read timed out")]
    Timeout,
    #[error("timed out waiting for hub acknowledgement")]
    AckTimeout,
    #[error("hub closed the connection")]
    PeerClosed,
}
