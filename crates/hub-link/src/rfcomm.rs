use crate::{Dialer, HubTransport, LinkError, Result};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

/// Hub link over an RFCOMM-bound serial device (e.g. `/dev/rfcomm0` after
/// `rfcomm bind <dev> <addr>`), which is how the hubs' Bluetooth serial
/// profile presents on Linux.
pub struct RfcommDialer {
    pub baud: u32,
}

impl Default for RfcommDialer {
    fn default() -> Self {
        Self { baud: 115_200 }
    }
}

impl Dialer for RfcommDialer {
    fn dial(&self, address: &str) -> Result<Box<dyn HubTransport>> {
        let port = serialport::new(address, self.baud)
            .timeout(Duration::from_millis(200))
            .open()
            .map_err(|e| LinkError::Connect(e.to_string()))?;
        Ok(Box::new(RfcommTransport { port }))
    }
}

struct RfcommTransport {
    port: Box<dyn SerialPort>,
}

impl HubTransport for RfcommTransport {
    fn send_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.port
            .write_all(buf)
            .map_err(|e| LinkError::Io(e.to_string()))
    }

    fn recv_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(LinkError::Timeout),
            Err(e) => Err(LinkError::Io(e.to_string())),
        }
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| LinkError::Io(e.to_string()))
    }
}
