use crate::{Dialer, HubTransport, LinkError, Result, ACK_TOKEN};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared control surface for a mock hub: tests flip its switches and
/// inspect what was delivered.
#[derive(Default)]
pub struct MockScript {
    sent: Mutex<Vec<String>>,
    fail_sends: AtomicBool,
    silent: AtomicBool,
    closed: AtomicBool,
    refuse_dial: AtomicBool,
}

impl MockScript {
    /// Every payload delivered so far, newline framing stripped.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Make every subsequent write fail with an I/O error.
    pub fn set_fail_sends(&self, on: bool) {
        self.fail_sends.store(on, Ordering::SeqCst);
    }

    /// Accept writes but never ack, forcing the ack-scan to time out.
    pub fn set_silent(&self, on: bool) {
        self.silent.store(on, Ordering::SeqCst);
    }

    /// Simulate the peer closing the stream (reads return 0 bytes).
    pub fn set_closed(&self, on: bool) {
        self.closed.store(on, Ordering::SeqCst);
    }

    /// Refuse new dial attempts (connect/reconnect failures).
    pub fn set_refuse_dial(&self, on: bool) {
        self.refuse_dial.store(on, Ordering::SeqCst);
    }
}

/// Dialer producing in-process transports driven by a shared [`MockScript`].
pub struct MockDialer {
    script: Arc<MockScript>,
}

impl MockDialer {
    pub fn new() -> (Self, Arc<MockScript>) {
        let script = Arc::new(MockScript::default());
        (
            Self {
                script: script.clone(),
            },
            script,
        )
    }
}

impl Dialer for MockDialer {
    fn dial(&self, address: &str) -> Result<Box<dyn HubTransport>> {
        if self.script.refuse_dial.load(Ordering::SeqCst) {
            return Err(LinkError::Connect(format!("mock refused dial to {address}")));
        }
        Ok(Box::new(MockTransport {
            script: self.script.clone(),
            inbox: VecDeque::new(),
        }))
    }
}

struct MockTransport {
    script: Arc<MockScript>,
    inbox: VecDeque<u8>,
}

impl HubTransport for MockTransport {
    fn send_bytes(&mut self, buf: &[u8]) -> Result<()> {
        if self.script.fail_sends.load(Ordering::SeqCst) {
            return Err(LinkError::Io("injected send failure".to_string()));
        }
        let payload = String::from_utf8_lossy(buf).trim_end().to_string();
        if let Ok(mut sent) = self.script.sent.lock() {
            sent.push(payload);
        }
        if !self.script.silent.load(Ordering::SeqCst) {
            self.inbox.extend(ACK_TOKEN.as_bytes());
        }
        Ok(())
    }

    fn recv_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.script.closed.load(Ordering::SeqCst) {
            return Ok(0);
        }
        if self.inbox.is_empty() {
            // Keep the ack-scan loop from spinning hot in tests.
            std::thread::sleep(Duration::from_millis(1));
            return Err(LinkError::Timeout);
        }
        let n = buf.len().min(self.inbox.len());
        for slot in buf.iter_mut().take(n) {
            if let Some(byte) = self.inbox.pop_front() {
                *slot = byte;
            }
        }
        Ok(n)
    }

    fn set_read_timeout(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}
