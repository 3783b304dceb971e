//! Default-device microphone capture, downmixed to mono i16 chunks.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::sync::mpsc::{self, Receiver, Sender};

type Result<T, E = anyhow::Error> = core::result::Result<T, E>;

/// Keeps the cpal stream alive for as long as capture should run.
pub struct MicStream {
    _stream: cpal::Stream,
}

pub struct MicConfig {
    pub sample_rate_hz: u32,
    pub channels: u16,
}

/// Open the default input device and stream `chunk_len`-sample mono
/// frames over the returned channel. Stream errors are logged by the
/// audio subsystem's error callback and never tear down the process.
pub fn start_default_input(chunk_len: usize) -> Result<(MicStream, MicConfig, Receiver<Vec<i16>>)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("no default input device"))?;
    let config = device
        .default_input_config()
        .map_err(|e| anyhow::anyhow!("input config: {e}"))?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    let (tx, rx) = mpsc::channel::<Vec<i16>>();
    let stream = match config.sample_format() {
        SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), channels, chunk_len, tx)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), channels, chunk_len, tx)?,
        SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), channels, chunk_len, tx)?,
        other => return Err(anyhow::anyhow!("unsupported sample format: {other:?}")),
    };
    stream
        .play()
        .map_err(|e| anyhow::anyhow!("stream play: {e}"))?;

    Ok((
        MicStream { _stream: stream },
        MicConfig {
            sample_rate_hz: sample_rate,
            channels,
        },
        rx,
    ))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: u16,
    chunk_len: usize,
    tx: Sender<Vec<i16>>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let mut pending = Vec::<i16>::with_capacity(chunk_len * 2);
    let err_fn = |err| tracing::warn!(error = %err, "input stream error");
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _| {
            for frame in data.chunks_exact(channels as usize) {
                // First channel only for mono.
                pending.push(i16::from_sample(frame[0]));
            }
            while pending.len() >= chunk_len {
                let rest = pending.split_off(chunk_len);
                let chunk = std::mem::replace(&mut pending, rest);
                let _ = tx.send(chunk);
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}
