/// Decibel level of one PCM frame relative to full scale.
///
/// `20 * log10(rms)` with the RMS computed over samples normalized to
/// [-1, 1]. Empty frames and pure digital silence floor to `-inf`.
pub fn level_db(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let x = f64::from(s) / f64::from(i16::MAX);
            x * x
        })
        .sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms > 0.0 {
        20.0 * rms.log10()
    } else {
        f64::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_floors_to_neg_infinity() {
        assert_eq!(level_db(&[]), f64::NEG_INFINITY);
        assert_eq!(level_db(&[0; 256]), f64::NEG_INFINITY);
    }

    #[test]
    fn full_scale_square_is_zero_db() {
        let frame = vec![i16::MAX; 256];
        assert!(level_db(&frame).abs() < 1e-6);
    }

    #[test]
    fn quieter_frames_score_lower() {
        let loud = vec![16_000i16; 256];
        let quiet = vec![400i16; 256];
        assert!(level_db(&loud) > level_db(&quiet));
    }
}
