//! Welch power spectral density estimation
//!
//! Pure computation only: produces the one-sided PSD that the whitening
//! stage interpolates. Display of the estimate is left to callers.

use log::debug;

use super::fft::SpectralTransform;
use super::windowing::{apply_window, window_power_sum};
use crate::error::{Result, SonifyError};
use crate::filters::windows::{generate_window, WindowType};
use crate::signal::{rfft_frequencies, TimeSeries};

/// Welch estimator configuration
#[derive(Debug, Clone)]
pub struct WelchConfig {
    /// Segment length in samples
    pub nfft: usize,

    /// Samples shared by consecutive segments (must be < nfft)
    pub noverlap: usize,

    pub window_type: WindowType,
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self {
            nfft: 4 * 4096,
            noverlap: 2 * 4096,
            window_type: WindowType::Hann,
        }
    }
}

impl WelchConfig {
    fn validate(&self) -> Result<()> {
        if self.nfft < 2 {
            return Err(SonifyError::InvalidParameter(format!(
                "Welch segment length must be at least 2, got {}",
                self.nfft
            )));
        }
        if self.noverlap >= self.nfft {
            return Err(SonifyError::InvalidParameter(format!(
                "Welch overlap {} must be smaller than the segment length {}",
                self.noverlap, self.nfft
            )));
        }
        Ok(())
    }
}

/// One-sided PSD on a uniform frequency grid
#[derive(Debug, Clone)]
pub struct PsdEstimate {
    pub frequencies: Vec<f64>,

    /// Power per Hz (strain²/Hz for strain input)
    pub power: Vec<f64>,
}

impl PsdEstimate {
    /// Amplitude spectral density, √PSD
    pub fn asd(&self) -> Vec<f64> {
        self.power.iter().map(|p| p.sqrt()).collect()
    }
}

/// Estimate the one-sided PSD of `signal` by averaging windowed periodograms
///
/// Segments of `nfft` samples advance by `nfft - noverlap`. A signal shorter
/// than one segment is zero-padded to a single segment. Each periodogram is
/// scaled by 1/(fs·Σw²) and every bin except DC (and Nyquist for even nfft)
/// is doubled to fold in the negative frequencies.
pub fn estimate_psd<T: SpectralTransform + ?Sized>(
    signal: &TimeSeries,
    config: &WelchConfig,
    transform: &T,
) -> Result<PsdEstimate> {
    config.validate()?;

    let nfft = config.nfft;
    let step = nfft - config.noverlap;
    let fs = signal.sample_rate();

    let mut padded;
    let data = if signal.len() < nfft {
        padded = signal.samples().to_vec();
        padded.resize(nfft, 0.0);
        &padded[..]
    } else {
        signal.samples()
    };

    let window = generate_window(config.window_type, nfft);
    let scale = 1.0 / (fs * window_power_sum(config.window_type, nfft));

    let num_bins = nfft / 2 + 1;
    let mut power = vec![0.0; num_bins];
    let mut segments = 0usize;

    let mut start = 0;
    while start + nfft <= data.len() {
        let windowed = apply_window(&data[start..start + nfft], &window);
        let spectrum = transform.forward(&windowed)?;

        for (p, c) in power.iter_mut().zip(spectrum.iter()) {
            *p += c.norm_sqr();
        }

        segments += 1;
        start += step;
    }

    let last_doubled = if nfft % 2 == 0 { num_bins - 1 } else { num_bins };
    for (k, p) in power.iter_mut().enumerate() {
        *p *= scale / segments as f64;
        if k > 0 && k < last_doubled {
            *p *= 2.0;
        }
    }

    debug!(
        "welch: {} samples, {} segments of {} at {} Hz",
        signal.len(),
        segments,
        nfft,
        fs
    );

    Ok(PsdEstimate {
        frequencies: rfft_frequencies(nfft, signal.dt()),
        power,
    })
}
