use std::time::Duration;

/// Gate thresholds and stream parameters.
///
/// Defaults mirror the reference deployment: 8 kHz mono with both
/// thresholds at -35 dB and a one-second silence window.
#[derive(Clone, Copy, Debug)]
pub struct GateConfig {
    /// A frame louder than this while idle starts a recording.
    pub start_threshold_db: f64,
    /// A frame quieter than this while recording starts the silence timer.
    pub stop_threshold_db: f64,
    /// Continuous silence required before the recording is finalized.
    pub silence_duration: Duration,
    pub sample_rate_hz: u32,
    pub channels: u16,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            start_threshold_db: -35.0,
            stop_threshold_db: -35.0,
            silence_duration: Duration::from_secs(1),
            sample_rate_hz: 8_000,
            channels: 1,
        }
    }
}

/// What the gate observed while consuming one frame.
#[derive(Debug, PartialEq)]
pub enum GateEvent {
    /// A loud frame just started a recording; concurrent work (the vision
    /// capture) should kick off now.
    UtteranceStarted,
    /// Silence held long enough; here is the finished buffer.
    UtteranceFinished(AudioBuffer),
}

/// PCM chunks collected between voice-activity start and stop.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate_hz: u32,
    chunks: Vec<Vec<i16>>,
}

impl AudioBuffer {
    pub fn new(sample_rate_hz: u32, chunks: Vec<Vec<i16>>) -> Self {
        Self {
            sample_rate_hz,
            chunks,
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|c| c.is_empty())
    }

    pub fn len_samples(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate_hz == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.len_samples() as f64 / f64::from(self.sample_rate_hz))
    }

    /// Contiguous samples for upload.
    pub fn samples(&self) -> Vec<i16> {
        let mut out = Vec::with_capacity(self.len_samples());
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        out
    }
}
