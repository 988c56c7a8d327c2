//! Sample-rate conversion to a playback rate (rubato)
//!
//! Detector strain is typically sampled at 4096 or 16384 Hz; some players
//! only accept standard audio rates, so the conditioned series can be
//! converted before encoding.

use log::debug;
use rubato::{FftFixedIn, Resampler};

use crate::error::{Result, SonifyError};
use crate::signal::TimeSeries;

const CHUNK_SIZE: usize = 1024;

/// Resample `signal` to `target_rate` Hz
///
/// The source rate must be a whole number of Hz. The resampler's output
/// delay is removed, so the result starts at the same instant as the input
/// and holds round(N · target / source) samples.
pub fn resample(signal: &TimeSeries, target_rate: u32) -> Result<TimeSeries> {
    let source = signal.sample_rate();
    let source_rate = source.round();
    if (source - source_rate).abs() > 1e-6 * source_rate || source_rate < 1.0 {
        return Err(SonifyError::InvalidParameter(format!(
            "resampling needs an integer source rate, got {source} Hz"
        )));
    }
    if target_rate == 0 {
        return Err(SonifyError::InvalidParameter(
            "target sample rate must be positive".into(),
        ));
    }

    let source_rate = source_rate as usize;
    let target = target_rate as usize;
    if source_rate == target {
        return Ok(signal.clone());
    }

    let mut resampler = FftFixedIn::<f64>::new(source_rate, target, CHUNK_SIZE, 2, 1)
        .map_err(|e| SonifyError::Resample(e.to_string()))?;

    let expected = (signal.len() as f64 * target as f64 / source_rate as f64).round() as usize;
    let delay = resampler.output_delay();

    let input = signal.samples();
    let mut output = Vec::with_capacity(expected + delay);
    let mut pos = 0;

    // Keep feeding (zero-padded once the input runs out) until the delayed
    // tail of the signal has been flushed
    while output.len() < expected + delay {
        let frames = resampler.input_frames_next();
        let mut chunk = vec![0.0; frames];
        if pos < input.len() {
            let end = (pos + frames).min(input.len());
            chunk[..end - pos].copy_from_slice(&input[pos..end]);
        }
        pos += frames;

        let processed = resampler
            .process(&[chunk], None)
            .map_err(|e| SonifyError::Resample(e.to_string()))?;
        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }
    }

    let resampled = output[delay..delay + expected].to_vec();

    debug!(
        "resample: {} samples at {} Hz -> {} samples at {} Hz (delay {})",
        signal.len(),
        source_rate,
        resampled.len(),
        target,
        delay
    );

    TimeSeries::from_sample_rate(resampled, target as f64)
}
