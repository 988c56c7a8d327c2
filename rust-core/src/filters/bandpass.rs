//! Zero-phase FIR bandpass for whitened strain
//!
//! Windowed-sinc design in Hz, applied by FFT convolution (rustfft). The
//! filter is Type I, so its (M-1)/2 sample group delay is removed by reading
//! the convolution from that offset, which keeps the output aligned with the
//! input and exactly N samples long.

use log::debug;
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

use super::windows::{generate_window, WindowType};
use crate::error::{Result, SonifyError};
use crate::signal::TimeSeries;

/// Bandpass design parameters
#[derive(Debug, Clone)]
pub struct BandpassConfig {
    /// Lower cutoff in Hz (half-amplitude point)
    pub low_hz: f64,

    /// Upper cutoff in Hz (half-amplitude point)
    pub high_hz: f64,

    /// Width of each transition band in Hz; sets the filter length
    pub transition_hz: f64,

    pub window_type: WindowType,
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            low_hz: 20.0,
            high_hz: 300.0,
            transition_hz: 10.0,
            window_type: WindowType::Hamming,
        }
    }
}

impl BandpassConfig {
    fn validate(&self, sample_rate: f64) -> Result<()> {
        let nyquist = sample_rate / 2.0;
        if !(self.low_hz > 0.0 && self.low_hz < self.high_hz && self.high_hz < nyquist) {
            return Err(SonifyError::InvalidParameter(format!(
                "bandpass edges must satisfy 0 < {} < {} < {} Hz",
                self.low_hz, self.high_hz, nyquist
            )));
        }
        if !(self.transition_hz.is_finite() && self.transition_hz > 0.0) {
            return Err(SonifyError::InvalidParameter(format!(
                "bandpass transition width must be positive, got {}",
                self.transition_hz
            )));
        }
        Ok(())
    }
}

/// Design bandpass coefficients h[n], n = 0..M-1
///
/// h[n] = (sin(ωc2·m) - sin(ωc1·m)) / (π·m) · w[n], with m = n - (M-1)/2
/// and the limit (ωc2 - ωc1)/π at the center tap.
pub fn design_bandpass(config: &BandpassConfig, sample_rate: f64) -> Result<Vec<f64>> {
    config.validate(sample_rate)?;

    let m = config
        .window_type
        .filter_length(config.transition_hz, sample_rate);
    let window = generate_window(config.window_type, m);

    let wc1 = 2.0 * PI * config.low_hz / sample_rate;
    let wc2 = 2.0 * PI * config.high_hz / sample_rate;
    let center = (m - 1) as f64 / 2.0;

    let h = window
        .iter()
        .enumerate()
        .map(|(n, &w)| {
            let k = n as f64 - center;
            let ideal = if k == 0.0 {
                (wc2 - wc1) / PI
            } else {
                ((wc2 * k).sin() - (wc1 * k).sin()) / (PI * k)
            };
            ideal * w
        })
        .collect();

    Ok(h)
}

/// Complex frequency response H(f) of coefficients `h` at frequencies in Hz
pub fn frequency_response(h: &[f64], frequencies: &[f64], sample_rate: f64) -> Vec<Complex64> {
    frequencies
        .iter()
        .map(|&f| {
            let omega = 2.0 * PI * f / sample_rate;
            h.iter()
                .enumerate()
                .map(|(n, &h_n)| Complex64::from_polar(h_n, -omega * n as f64))
                .sum()
        })
        .collect()
}

/// Band-limit `signal` to [low_hz, high_hz]
pub fn bandpass(signal: &TimeSeries, config: &BandpassConfig) -> Result<TimeSeries> {
    let h = design_bandpass(config, signal.sample_rate())?;
    let filtered = convolve_aligned(signal.samples(), &h);

    debug!(
        "bandpass: {} samples, {} taps, {}-{} Hz",
        signal.len(),
        h.len(),
        config.low_hz,
        config.high_hz
    );

    signal.with_samples(filtered)
}

/// Linear convolution x * h via FFT, read from the center tap of `h`
fn convolve_aligned(x: &[f64], h: &[f64]) -> Vec<f64> {
    let n = x.len();
    let delay = (h.len() - 1) / 2;
    let fft_size = (n + h.len() - 1).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let ifft = planner.plan_fft_inverse(fft_size);

    let zero_padded = |values: &[f64]| {
        let mut buffer = vec![Complex64::new(0.0, 0.0); fft_size];
        for (slot, &v) in buffer.iter_mut().zip(values.iter()) {
            slot.re = v;
        }
        buffer
    };

    let mut x_fft = zero_padded(x);
    let mut h_fft = zero_padded(h);
    fft.process(&mut x_fft);
    fft.process(&mut h_fft);

    let mut y: Vec<Complex64> = x_fft.iter().zip(h_fft.iter()).map(|(a, b)| a * b).collect();
    ifft.process(&mut y);

    // rustfft leaves the inverse unnormalised
    let scale = 1.0 / fft_size as f64;
    y[delay..delay + n].iter().map(|c| c.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 4096.0;

    fn sine(freq: f64, n: usize) -> TimeSeries {
        TimeSeries::from_sample_rate(
            (0..n)
                .map(|i| (2.0 * PI * freq * i as f64 / FS).sin())
                .collect(),
            FS,
        )
        .unwrap()
    }

    #[test]
    fn test_design_is_symmetric_type_one() {
        let h = design_bandpass(&BandpassConfig::default(), FS).unwrap();

        assert_eq!(h.len() % 2, 1);
        for i in 0..h.len() / 2 {
            assert!((h[i] - h[h.len() - 1 - i]).abs() < 1e-12);
        }

        // DC is outside the band
        let dc: f64 = h.iter().sum();
        assert!(dc.abs() < 0.01, "DC gain {}", dc);
    }

    #[test]
    fn test_frequency_response() {
        let h = design_bandpass(&BandpassConfig::default(), FS).unwrap();
        let response = frequency_response(&h, &[150.0, 20.0, 1000.0], FS);

        assert!((response[0].norm() - 1.0).abs() < 0.01);
        assert!((response[1].norm() - 0.5).abs() < 0.05);
        assert!(response[2].norm() < 0.01);
    }

    #[test]
    fn test_passband_tone_is_kept_in_phase() {
        let input = sine(150.0, 4 * 4096);
        let output = bandpass(&input, &BandpassConfig::default()).unwrap();
        assert_eq!(output.len(), input.len());

        let edge = 2048;
        for j in edge..input.len() - edge {
            let diff = (output.samples()[j] - input.samples()[j]).abs();
            assert!(diff < 0.01, "sample {}: diff {}", j, diff);
        }
    }

    #[test]
    fn test_stopband_tone_is_removed() {
        let input = sine(1000.0, 4 * 4096);
        let output = bandpass(&input, &BandpassConfig::default()).unwrap();

        let edge = 2048;
        let residual = output.samples()[edge..input.len() - edge]
            .iter()
            .fold(0.0_f64, |acc, s| acc.max(s.abs()));
        assert!(residual < 0.01, "residual {}", residual);
    }

    #[test]
    fn test_short_signal_keeps_length() {
        let input = sine(150.0, 100);
        assert_eq!(bandpass(&input, &BandpassConfig::default()).unwrap().len(), 100);
    }

    #[test]
    fn test_rejects_bad_edges() {
        let input = sine(150.0, 1024);
        let inverted = BandpassConfig {
            low_hz: 300.0,
            high_hz: 20.0,
            ..BandpassConfig::default()
        };
        assert!(bandpass(&input, &inverted).is_err());

        let above_nyquist = BandpassConfig {
            high_hz: 3000.0,
            ..BandpassConfig::default()
        };
        assert!(bandpass(&input, &above_nyquist).is_err());

        let no_transition = BandpassConfig {
            transition_hz: 0.0,
            ..BandpassConfig::default()
        };
        assert!(bandpass(&input, &no_transition).is_err());
    }
}
