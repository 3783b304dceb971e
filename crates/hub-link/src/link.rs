use crate::{Dialer, HubTransport, LinkError, Result};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The literal token a hub echoes back once a batch has been executed.
pub const ACK_TOKEN: &str = "<<<<<<suc>>>>>>";

/// How long a single read may block while scanning for the ack.
const READ_SLICE: Duration = Duration::from_millis(200);

/// Bounded-retry reconnect schedule, consulted before a send whenever the
/// link is down.
#[derive(Clone, Copy, Debug)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(250),
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    /// The backoff delay applied after each failed attempt.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let initial = self.initial_delay;
        let multiplier = self.multiplier;
        (0..self.max_attempts)
            .map(move |i| initial.mul_f64(multiplier.powi(i as i32)))
    }
}

/// One physical hub's communication channel.
///
/// All send/receive traffic is serialized under the internal mutex, so two
/// batches to the same hub are never in flight at once; batches to
/// different hubs run concurrently on their own links.
pub struct HubLink {
    name: String,
    address: String,
    dialer: Box<dyn Dialer>,
    policy: ReconnectPolicy,
    transport: Mutex<Option<Box<dyn HubTransport>>>,
}

impl HubLink {
    /// Create the link and eagerly dial once. A failed dial leaves the
    /// link in degraded mode rather than failing startup; the reconnect
    /// policy gets another chance before each send.
    pub fn connect(
        name: impl Into<String>,
        address: impl Into<String>,
        dialer: Box<dyn Dialer>,
        policy: ReconnectPolicy,
    ) -> Self {
        let name = name.into();
        let address = address.into();
        let transport = match dialer.dial(&address) {
            Ok(t) => {
                info!(hub = %name, %address, "hub connected");
                Some(t)
            }
            Err(e) => {
                warn!(hub = %name, %address, error = %e, "hub connect failed, continuing degraded");
                None
            }
        };
        Self {
            name,
            address,
            dialer,
            policy,
            transport: Mutex::new(transport),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.transport
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Deliver one JSON batch and block until the hub acks it.
    ///
    /// An empty payload is a no-op success. The payload is framed with a
    /// trailing newline; the receive stream is then scanned for
    /// [`ACK_TOKEN`] until `ack_timeout` elapses. I/O failures and a
    /// peer-side close drop the transport so the next send re-dials.
    pub fn send_batch(&self, payload: &str, ack_timeout: Duration) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }

        let mut guard = self
            .transport
            .lock()
            .map_err(|_| LinkError::Io("link mutex poisoned".to_string()))?;

        if guard.is_none() {
            *guard = self.redial();
        }
        let Some(transport) = guard.as_mut() else {
            return Err(LinkError::Disconnected);
        };

        let result = exchange(transport.as_mut(), payload, ack_timeout);
        match &result {
            Ok(()) => debug!(hub = %self.name, %payload, "batch acknowledged"),
            // An ack timeout leaves the stream usable; every other
            // failure drops the transport so the next send re-dials.
            Err(LinkError::AckTimeout) => {}
            Err(_) => *guard = None,
        }
        result
    }

    fn redial(&self) -> Option<Box<dyn HubTransport>> {
        for (attempt, delay) in self.policy.delays().enumerate() {
            match self.dialer.dial(&self.address) {
                Ok(t) => {
                    info!(hub = %self.name, attempt = attempt + 1, "hub reconnected");
                    return Some(t);
                }
                Err(e) => {
                    warn!(hub = %self.name, attempt = attempt + 1, error = %e, "reconnect attempt failed");
                    std::thread::sleep(delay);
                }
            }
        }
        None
    }
}

fn exchange(transport: &mut dyn HubTransport, payload: &str, ack_timeout: Duration) -> Result<()> {
    let mut framed = Vec::with_capacity(payload.len() + 1);
    framed.extend_from_slice(payload.as_bytes());
    framed.push(b'\n');
    transport.send_bytes(&framed)?;

    let _ = transport.set_read_timeout(READ_SLICE);
    let deadline = Instant::now() + ack_timeout;
    let mut acc: Vec<u8> = Vec::with_capacity(256);
    let mut buf = [0u8; 4096];
    loop {
        if Instant::now() >= deadline {
            return Err(LinkError::AckTimeout);
        }
        match transport.recv_bytes(&mut buf) {
            Ok(0) => return Err(LinkError::PeerClosed),
            Ok(n) => {
                acc.extend_from_slice(&buf[..n]);
                if contains_token(&acc) {
                    return Ok(());
                }
            }
            Err(LinkError::Timeout) => continue,
            Err(e) => return Err(e),
        }
    }
}

fn contains_token(acc: &[u8]) -> bool {
    acc.windows(ACK_TOKEN.len())
        .any(|w| w == ACK_TOKEN.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockDialer;

    const ACK_WAIT: Duration = Duration::from_millis(100);

    fn fast_policy() -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            multiplier: 2.0,
        }
    }

    #[test]
    fn backoff_schedule_doubles() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(250),
                Duration::from_millis(500),
                Duration::from_millis(1000),
            ]
        );
    }

    #[test]
    fn send_waits_for_ack_and_records_payload() -> Result<()> {
        let (dialer, script) = MockDialer::new();
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        link.send_batch(r#"[{"cmd":"move","val":30}]"#, ACK_WAIT)?;
        assert_eq!(script.sent(), vec![r#"[{"cmd":"move","val":30}]"#.to_string()]);
        Ok(())
    }

    #[test]
    fn empty_payload_is_noop_success() -> Result<()> {
        let (dialer, script) = MockDialer::new();
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        link.send_batch("", ACK_WAIT)?;
        assert!(script.sent().is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_sends_are_independent_cycles() -> Result<()> {
        let (dialer, script) = MockDialer::new();
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        let payload = r#"[{"cmd":"shoot","val":1}]"#;
        link.send_batch(payload, ACK_WAIT)?;
        link.send_batch(payload, ACK_WAIT)?;
        // No deduplication: both deliveries reach the hub.
        assert_eq!(script.sent().len(), 2);
        Ok(())
    }

    #[test]
    fn silent_hub_times_out() {
        let (dialer, script) = MockDialer::new();
        script.set_silent(true);
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        let err = link.send_batch("[]", Duration::from_millis(30));
        assert!(matches!(err, Err(LinkError::AckTimeout)));
        // The transport survives an ack timeout; the batch itself was written.
        assert!(link.is_connected());
        assert_eq!(script.sent().len(), 1);
    }

    #[test]
    fn peer_close_marks_disconnected() {
        let (dialer, script) = MockDialer::new();
        script.set_closed(true);
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        let err = link.send_batch("[]", ACK_WAIT);
        assert!(matches!(err, Err(LinkError::PeerClosed)));
        assert!(!link.is_connected());
    }

    #[test]
    fn failed_dial_degrades_then_recovers() -> Result<()> {
        let (dialer, script) = MockDialer::new();
        script.set_refuse_dial(true);
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        assert!(!link.is_connected());
        assert!(matches!(
            link.send_batch("[]", ACK_WAIT),
            Err(LinkError::Disconnected)
        ));

        script.set_refuse_dial(false);
        link.send_batch("[]", ACK_WAIT)?;
        assert!(link.is_connected());
        Ok(())
    }

    #[test]
    fn send_failure_is_reported_and_drops_transport() {
        let (dialer, script) = MockDialer::new();
        let link = HubLink::connect("hub1", "mock:1", Box::new(dialer), fast_policy());
        script.set_fail_sends(true);
        assert!(matches!(
            link.send_batch("[]", ACK_WAIT),
            Err(LinkError::Io(_))
        ));
        assert!(!link.is_connected());
    }
}
