//! The "please wait" notification chime.
//!
//! Synthesized so the daemon works without any asset files; a WAV on disk
//! can replace it via the `wav` feature.

/// Two ascending tones, 150 ms each.
pub fn wait_chime(sample_rate_hz: u32) -> Vec<i16> {
    let sr = sample_rate_hz.max(8_000);
    let mut out = Vec::with_capacity(sr as usize * 3 / 10);
    tone(&mut out, sr, 660.0, 0.15);
    tone(&mut out, sr, 880.0, 0.15);
    out
}

fn tone(out: &mut Vec<i16>, sr: u32, freq: f32, dur_s: f32) {
    let frames = (sr as f32 * dur_s) as usize;
    for n in 0..frames {
        let t = n as f32 / sr as f32;
        // Short linear fade at both ends to avoid clicks.
        let edge = (n.min(frames - n) as f32 / (sr as f32 * 0.01)).min(1.0);
        let s = (2.0 * std::f32::consts::PI * freq * t).sin() * edge;
        out.push((s * 9_000.0) as i16);
    }
}

/// Load a mono chime from a WAV file, downmixing if needed.
#[cfg(feature = "wav")]
pub fn load_wav(path: &std::path::Path) -> anyhow::Result<(Vec<i16>, u32)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let mut mono = Vec::new();
    match spec.sample_format {
        hound::SampleFormat::Int => {
            let mut frame = Vec::with_capacity(channels);
            for sample in reader.samples::<i16>() {
                frame.push(sample?);
                if frame.len() == channels {
                    mono.push(frame[0]);
                    frame.clear();
                }
            }
        }
        hound::SampleFormat::Float => {
            let mut frame = Vec::with_capacity(channels);
            for sample in reader.samples::<f32>() {
                frame.push(sample?);
                if frame.len() == channels {
                    mono.push((frame[0].clamp(-1.0, 1.0) * 32_767.0) as i16);
                    frame.clear();
                }
            }
        }
    }
    Ok((mono, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chime_is_nonempty_and_bounded() {
        let pcm = wait_chime(22_050);
        assert!(!pcm.is_empty());
        assert!(pcm.iter().all(|&s| s > -16_000 && s < 16_000));
    }
}
