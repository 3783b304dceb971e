use std::time::Duration;

/// Timeouts for every call that leaves the process. On expiry the cycle
/// proceeds with a degraded value; the in-flight call is abandoned, not
/// cancelled, and a late result is discarded.
#[derive(Clone, Copy, Debug)]
pub struct DispatchConfig {
    /// Bounded wait for the concurrently-started scene description.
    pub vision_timeout: Duration,
    /// Speech-to-text on the finalized buffer.
    pub transcribe_timeout: Duration,
    /// Command interpretation (foreground, blocks the cycle).
    pub interpret_timeout: Duration,
    /// Join on the background conversation task before the cycle ends.
    pub conversation_timeout: Duration,
    /// Per-hub send/ack round trip.
    pub hub_ack_timeout: Duration,
    /// Target acquisition during autonomous engage.
    pub locate_timeout: Duration,
    /// Pause between firing and rotating back to neutral.
    pub settle_pause: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            vision_timeout: Duration::from_secs(40),
            transcribe_timeout: Duration::from_secs(30),
            interpret_timeout: Duration::from_secs(30),
            conversation_timeout: Duration::from_secs(40),
            hub_ack_timeout: Duration::from_secs(15),
            locate_timeout: Duration::from_secs(10),
            settle_pause: Duration::from_millis(500),
        }
    }
}
