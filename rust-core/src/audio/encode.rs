//! Rescaling a floating-point waveform into 16-bit PCM samples

use log::debug;
use std::path::Path;

use crate::error::{Result, SonifyError};
use crate::signal::TimeSeries;

/// Full-scale value of a 16-bit sample
const FULL_SCALE: f64 = i16::MAX as f64;

/// Encoder configuration
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Fraction of full scale the loudest sample reaches, in (0, 1]
    pub headroom: f64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { headroom: 0.9 }
    }
}

/// Mono 16-bit PCM samples with their playback rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Persist as a mono 16-bit WAV file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::wav::write_wav(path, self)
    }
}

/// Scale `signal` so its peak sits at `headroom` of full scale
///
/// Each sample becomes round(x · headroom · 32767 / peak), clamped to the
/// i16 range.
///
/// # Errors
/// * `DegenerateSignal` when every sample is zero
/// * `InvalidParameter` for non-finite samples, headroom outside (0, 1],
///   or a zero sample rate
pub fn encode(signal: &TimeSeries, sample_rate: u32, headroom: f64) -> Result<AudioBuffer> {
    if sample_rate == 0 {
        return Err(SonifyError::InvalidParameter(
            "audio sample rate must be positive".into(),
        ));
    }
    if !(headroom > 0.0 && headroom <= 1.0) {
        return Err(SonifyError::InvalidParameter(format!(
            "headroom must be in (0, 1], got {headroom}"
        )));
    }
    if let Some(bad) = signal.samples().iter().position(|s| !s.is_finite()) {
        return Err(SonifyError::InvalidParameter(format!(
            "audio encoder: sample {bad} is not finite"
        )));
    }

    let peak = signal.peak_abs();
    if peak == 0.0 {
        return Err(SonifyError::DegenerateSignal(
            "audio encoder: signal is all zeros, peak normalisation is undefined".into(),
        ));
    }

    let gain = headroom * FULL_SCALE / peak;
    let samples = signal
        .samples()
        .iter()
        .map(|&s| (s * gain).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
        .collect();

    debug!(
        "encode: {} samples, peak {:e}, gain {:e}, {} Hz",
        signal.len(),
        peak,
        gain,
        sample_rate
    );

    Ok(AudioBuffer::new(samples, sample_rate))
}

/// Encode with the settings in `config`
pub fn encode_with(signal: &TimeSeries, sample_rate: u32, config: &EncoderConfig) -> Result<AudioBuffer> {
    encode(signal, sample_rate, config.headroom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn series(samples: Vec<f64>) -> TimeSeries {
        TimeSeries::from_sample_rate(samples, 4096.0).unwrap()
    }

    #[test]
    fn test_peak_scaled_to_headroom() {
        let audio = encode(&series(vec![0.0, 0.5, -1.0, 0.25]), 4096, 0.9).unwrap();

        assert_eq!(audio.sample_rate, 4096);
        assert_eq!(audio.samples, vec![0, 14745, -29490, 7373]);
    }

    #[test]
    fn test_full_headroom_stays_in_range() {
        let audio = encode(&series(vec![1.0, -1.0, 0.999_999]), 44100, 1.0).unwrap();
        assert_eq!(audio.samples, vec![32767, -32767, 32767]);
    }

    #[test]
    fn test_range_for_tiny_and_huge_signals() {
        for scale in [1e-21, 1.0, 1e30] {
            let signal = series(
                (0..4096)
                    .map(|i| scale * (2.0 * PI * 200.0 * i as f64 / 4096.0).sin())
                    .collect(),
            );
            let audio = encode(&signal, 4096, 0.9).unwrap();

            assert_eq!(audio.len(), 4096);
            assert_eq!(audio.sample_rate, 4096);
            let peak = audio.samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
            assert_eq!(peak, 29490);
        }
    }

    #[test]
    fn test_silent_signal_rejected() {
        assert!(matches!(
            encode(&series(vec![0.0; 128]), 4096, 0.9),
            Err(SonifyError::DegenerateSignal(_))
        ));
    }

    #[test]
    fn test_bad_parameters_rejected() {
        let signal = series(vec![1.0, -1.0]);
        assert!(encode(&signal, 0, 0.9).is_err());
        assert!(encode(&signal, 4096, 0.0).is_err());
        assert!(encode(&signal, 4096, 1.5).is_err());
        assert!(encode(&series(vec![1.0, f64::NAN]), 4096, 0.9).is_err());
    }

    #[test]
    fn test_encoder_config_default() {
        let signal = series(vec![2.0, -2.0]);
        let audio = encode_with(&signal, 4096, &EncoderConfig::default()).unwrap();
        assert_eq!(audio.samples, vec![29490, -29490]);
        assert!((audio.duration_secs() - 2.0 / 4096.0).abs() < 1e-15);
    }
}
