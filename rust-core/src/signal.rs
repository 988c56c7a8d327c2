//! Owned signal buffers passed between pipeline stages
//!
//! Every stage borrows a `TimeSeries` and returns a freshly allocated one;
//! nothing in this crate mutates a buffer it did not create.

use num_complex::Complex64;

use crate::error::{Result, SonifyError};
use crate::spectrum::fft::SpectralTransform;

/// Relative tolerance when checking that two sample spacings describe the same grid
const RATE_TOLERANCE: f64 = 1e-9;

/// Real-valued, uniformly sampled time series
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    samples: Vec<f64>,
    dt: f64,
}

impl TimeSeries {
    /// Create a time series from samples and sample spacing
    ///
    /// # Arguments
    /// * `samples` - Real samples, at least one
    /// * `dt` - Sample spacing in seconds (finite, > 0)
    pub fn new(samples: Vec<f64>, dt: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(SonifyError::InvalidParameter(
                "time series must contain at least one sample".into(),
            ));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SonifyError::InvalidParameter(format!(
                "sample spacing must be finite and positive, got {dt}"
            )));
        }

        Ok(Self { samples, dt })
    }

    /// Create a time series from samples and a sample rate in Hz
    pub fn from_sample_rate(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SonifyError::InvalidParameter(format!(
                "sample rate must be finite and positive, got {sample_rate}"
            )));
        }
        Self::new(samples, 1.0 / sample_rate)
    }

    /// Number of samples (N)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.dt
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Duration in seconds (N * dt)
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 * self.dt
    }

    /// New series with every sample multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            samples: self.samples.iter().map(|&s| s * factor).collect(),
            dt: self.dt,
        }
    }

    /// New series on the same grid with different samples
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Result<Self> {
        if samples.len() != self.samples.len() {
            return Err(SonifyError::LengthMismatch {
                context: "time series rebuild",
                expected: self.samples.len(),
                actual: samples.len(),
            });
        }
        Ok(Self {
            samples,
            dt: self.dt,
        })
    }

    /// Largest absolute sample value
    pub fn peak_abs(&self) -> f64 {
        self.samples.iter().fold(0.0, |acc: f64, &s| acc.max(s.abs()))
    }

    /// True when every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    /// Time stamps of each sample, starting at `t0`
    pub fn times(&self, t0: f64) -> Vec<f64> {
        (0..self.samples.len())
            .map(|n| t0 + n as f64 * self.dt)
            .collect()
    }

    /// Fail unless `sample_rate` describes this series' grid
    pub fn check_sample_rate(&self, sample_rate: f64) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SonifyError::InvalidParameter(format!(
                "sample rate must be finite and positive, got {sample_rate}"
            )));
        }
        self.check_dt(1.0 / sample_rate)
    }

    /// Fail unless `dt` describes this series' grid
    pub fn check_dt(&self, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SonifyError::InvalidParameter(format!(
                "sample spacing must be finite and positive, got {dt}"
            )));
        }
        if ((dt - self.dt) / self.dt).abs() > RATE_TOLERANCE {
            return Err(SonifyError::InvalidParameter(format!(
                "sample spacing {dt} s disagrees with the buffer's {} s",
                self.dt
            )));
        }
        Ok(())
    }
}

/// Frequency axis of a real FFT of length `n` at spacing `dt`
///
/// Bin k sits at k / (n * dt) for k = 0..=n/2.
pub fn rfft_frequencies(n: usize, dt: f64) -> Vec<f64> {
    let df = 1.0 / (n as f64 * dt);
    (0..=n / 2).map(|k| k as f64 * df).collect()
}

/// Non-negative-frequency spectrum of a real time series
#[derive(Debug, Clone)]
pub struct Spectrum {
    bins: Vec<Complex64>,
    frequencies: Vec<f64>,
    n: usize,
}

impl Spectrum {
    /// Forward-transform `signal` with the given provider
    pub fn of<T: SpectralTransform + ?Sized>(signal: &TimeSeries, transform: &T) -> Result<Self> {
        let bins = transform.forward(signal.samples())?;
        let frequencies = rfft_frequencies(signal.len(), signal.dt());

        if bins.len() != frequencies.len() {
            return Err(SonifyError::LengthMismatch {
                context: "spectrum bins vs. frequency axis",
                expected: frequencies.len(),
                actual: bins.len(),
            });
        }

        Ok(Self {
            bins,
            frequencies,
            n: signal.len(),
        })
    }

    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Length of the time series this spectrum came from
    pub fn time_len(&self) -> usize {
        self.n
    }

    /// Bin spacing in Hz
    pub fn frequency_resolution(&self) -> f64 {
        self.frequencies.get(1).copied().unwrap_or(0.0)
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    /// Frequency of the strongest non-DC bin, or 0 for a single-bin spectrum
    pub fn peak_frequency(&self) -> f64 {
        self.bins
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
            .map(|(k, _)| self.frequencies[k])
            .unwrap_or(0.0)
    }
}
