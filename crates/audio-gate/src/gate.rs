use crate::{level_db, AudioBuffer, GateConfig, GateEvent};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

const METER_INTERVAL: Duration = Duration::from_millis(500);

/// The voice-activity state machine.
///
/// Callers feed every captured frame through [`push_frame`] together with
/// the capture time; the explicit `Instant` keeps the hysteresis testable
/// without real sleeps. There is no maximum recording duration: long
/// commands are allowed by design.
///
/// [`push_frame`]: AudioGate::push_frame
pub struct AudioGate {
    cfg: GateConfig,
    recording: bool,
    frames: Vec<Vec<i16>>,
    silence_since: Option<Instant>,
    last_meter: Option<Instant>,
}

impl AudioGate {
    pub fn new(cfg: GateConfig) -> Self {
        Self {
            cfg,
            recording: false,
            frames: Vec::new(),
            silence_since: None,
            last_meter: None,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.cfg
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Consume one mono PCM frame captured at `now`.
    pub fn push_frame(&mut self, samples: &[i16], now: Instant) -> Option<GateEvent> {
        let db = level_db(samples);
        self.meter(db, now);

        if !self.recording {
            if db > self.cfg.start_threshold_db {
                self.recording = true;
                self.frames.clear();
                self.frames.push(samples.to_vec());
                self.silence_since = None;
                info!(db, threshold = self.cfg.start_threshold_db, "recording started");
                return Some(GateEvent::UtteranceStarted);
            }
            return None;
        }

        self.frames.push(samples.to_vec());

        if db < self.cfg.stop_threshold_db {
            let since = *self.silence_since.get_or_insert(now);
            if now.duration_since(since) >= self.cfg.silence_duration {
                return self.finalize();
            }
        } else if self.silence_since.take().is_some() {
            // Voice recovered before the window elapsed: one continued
            // utterance, not two.
            debug!(db, "voice recovered, silence timer reset");
        }
        None
    }

    fn finalize(&mut self) -> Option<GateEvent> {
        self.recording = false;
        self.silence_since = None;
        let chunks = std::mem::take(&mut self.frames);
        let buffer = AudioBuffer::new(self.cfg.sample_rate_hz, chunks);
        if buffer.is_empty() {
            warn!("finalized an empty buffer, dropping");
            return None;
        }
        info!(
            duration_ms = buffer.duration().as_millis() as u64,
            "recording finished"
        );
        Some(GateEvent::UtteranceFinished(buffer))
    }

    fn meter(&mut self, db: f64, now: Instant) {
        let due = self
            .last_meter
            .map(|t| now.duration_since(t) >= METER_INTERVAL)
            .unwrap_or(true);
        if due {
            trace!(db, recording = self.recording, "sound level");
            self.last_meter = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOUD: i16 = 12_000;
    const QUIET: i16 = 50;

    fn gate() -> AudioGate {
        AudioGate::new(GateConfig::default())
    }

    fn loud_frame() -> Vec<i16> {
        vec![LOUD; 160]
    }

    fn quiet_frame() -> Vec<i16> {
        vec![QUIET; 160]
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn quiet_stream_never_starts_recording() {
        let mut gate = gate();
        let t0 = Instant::now();
        for i in 0..50 {
            assert_eq!(gate.push_frame(&quiet_frame(), at(t0, i * 20)), None);
        }
        assert!(!gate.is_recording());
    }

    #[test]
    fn loud_frame_starts_recording_once() {
        let mut gate = gate();
        let t0 = Instant::now();
        assert_eq!(
            gate.push_frame(&loud_frame(), t0),
            Some(GateEvent::UtteranceStarted)
        );
        // Staying loud produces no further events.
        assert_eq!(gate.push_frame(&loud_frame(), at(t0, 20)), None);
        assert!(gate.is_recording());
    }

    #[test]
    fn sustained_silence_finalizes_exactly_once() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.push_frame(&loud_frame(), t0);

        let mut finishes = 0;
        let mut buffer = None;
        for i in 1..=60 {
            if let Some(GateEvent::UtteranceFinished(b)) =
                gate.push_frame(&quiet_frame(), at(t0, i * 20))
            {
                finishes += 1;
                buffer = Some(b);
            }
        }
        assert_eq!(finishes, 1);
        let buffer = match buffer {
            Some(b) => b,
            None => return,
        };
        assert!(!buffer.is_empty());
        assert_eq!(buffer.sample_rate_hz(), 8_000);
        assert!(!gate.is_recording());
    }

    #[test]
    fn brief_recovery_resets_the_silence_timer() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.push_frame(&loud_frame(), t0);

        // 900 ms of silence: not enough to finalize.
        assert_eq!(gate.push_frame(&quiet_frame(), at(t0, 100)), None);
        assert_eq!(gate.push_frame(&quiet_frame(), at(t0, 900)), None);
        // Voice comes back: the timer must reset.
        assert_eq!(gate.push_frame(&loud_frame(), at(t0, 950)), None);
        // Another 900 ms of silence measured from the new start: still open.
        assert_eq!(gate.push_frame(&quiet_frame(), at(t0, 1000)), None);
        assert_eq!(gate.push_frame(&quiet_frame(), at(t0, 1850)), None);
        assert!(gate.is_recording());
        // Now let the full window elapse.
        assert!(matches!(
            gate.push_frame(&quiet_frame(), at(t0, 2100)),
            Some(GateEvent::UtteranceFinished(_))
        ));
    }

    #[test]
    fn repeated_recoveries_keep_resetting_idempotently() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.push_frame(&loud_frame(), t0);

        let mut now = 0u64;
        for _ in 0..5 {
            now += 800;
            assert_eq!(gate.push_frame(&quiet_frame(), at(t0, now)), None);
            now += 50;
            assert_eq!(gate.push_frame(&loud_frame(), at(t0, now)), None);
        }
        assert!(gate.is_recording());
    }

    #[test]
    fn next_utterance_starts_with_a_fresh_buffer() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.push_frame(&loud_frame(), t0);
        gate.push_frame(&quiet_frame(), at(t0, 100));
        let first = gate.push_frame(&quiet_frame(), at(t0, 1200));
        assert!(matches!(first, Some(GateEvent::UtteranceFinished(_))));

        assert_eq!(
            gate.push_frame(&loud_frame(), at(t0, 2000)),
            Some(GateEvent::UtteranceStarted)
        );
        gate.push_frame(&quiet_frame(), at(t0, 2100));
        if let Some(GateEvent::UtteranceFinished(buffer)) =
            gate.push_frame(&quiet_frame(), at(t0, 3200))
        {
            // Only the frames of the second utterance.
            assert_eq!(buffer.len_samples(), 3 * 160);
        }
    }
}
