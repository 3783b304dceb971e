use tracing::debug;

/// Best-effort mono PCM sink for the wait chime and spoken replies.
///
/// Playback failures are never fatal to a cycle; callers log and move on.
pub trait AudioOutput: Send + Sync {
    /// Play the buffer to completion (blocking).
    fn play(&self, samples: &[i16], sample_rate_hz: u32) -> anyhow::Result<()>;
}

/// Discards audio. Used in tests and on hosts without an output device.
#[derive(Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&self, samples: &[i16], sample_rate_hz: u32) -> anyhow::Result<()> {
        debug!(
            samples = samples.len(),
            sample_rate_hz, "discarding playback (null output)"
        );
        Ok(())
    }
}

#[cfg(feature = "audio")]
pub use real::CpalOutput;

#[cfg(feature = "audio")]
mod real {
    use super::AudioOutput;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Plays through the default output device.
    #[derive(Default)]
    pub struct CpalOutput;

    impl AudioOutput for CpalOutput {
        fn play(&self, samples: &[i16], sample_rate_hz: u32) -> anyhow::Result<()> {
            if samples.is_empty() {
                return Ok(());
            }
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| anyhow::anyhow!("no default output device"))?;
            let config = cpal::StreamConfig {
                channels: 1,
                sample_rate: cpal::SampleRate(sample_rate_hz),
                buffer_size: cpal::BufferSize::Default,
            };

            let queue = Arc::new(Mutex::new(
                samples.iter().copied().collect::<VecDeque<i16>>(),
            ));
            let feeder = queue.clone();
            let err_fn = |err| tracing::warn!(error = %err, "output stream error");
            let stream = device.build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let mut pending = match feeder.lock() {
                        Ok(guard) => guard,
                        Err(_) => return,
                    };
                    for slot in data.iter_mut() {
                        *slot = pending
                            .pop_front()
                            .map(|s| f32::from(s) / 32_768.0)
                            .unwrap_or(0.0);
                    }
                },
                err_fn,
                None,
            )?;
            stream.play()?;

            loop {
                let drained = queue.lock().map(|q| q.is_empty()).unwrap_or(true);
                if drained {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            // Let the device flush its last buffer.
            std::thread::sleep(Duration::from_millis(50));
            Ok(())
        }
    }
}
