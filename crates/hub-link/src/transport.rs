use crate::Result;
use std::time::Duration;

/// A raw bidirectional byte stream to one hub.
pub trait HubTransport: Send {
    /// Write the whole buffer.
    fn send_bytes(&mut self, buf: &[u8]) -> Result<()>;

    /// Read whatever is available. `Ok(0)` means the peer closed the
    /// stream; `Err(LinkError::Timeout)` means nothing arrived within the
    /// configured read timeout.
    fn recv_bytes(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Bound how long a single `recv_bytes` call may block.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()>;
}

/// Opens transports for a hardware address, so a link can re-dial after a
/// dropped connection.
pub trait Dialer: Send + Sync {
    fn dial(&self, address: &str) -> Result<Box<dyn HubTransport>>;
}
