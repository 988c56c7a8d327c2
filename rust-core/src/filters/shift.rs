//! Frequency shifting for audification
//!
//! Two shifters live here:
//! - `frequency_shift` translates every positive-frequency component by an
//!   arbitrary offset (single-sideband modulation of the analytic signal).
//! - `bin_shift` is the older whole-bin reassignment, kept for parity with
//!   earlier renderings. It always works on a copy of the spectrum.

use log::{debug, warn};
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{Result, SonifyError};
use crate::signal::TimeSeries;
use crate::spectrum::fft::{FftEngine, SpectralTransform};

/// Shift the spectral content of `signal` up by `offset_hz` (down if negative)
///
/// Computes y(t) = x(t)·cos(2πft) - H[x](t)·sin(2πft), where H is the
/// Hilbert transform, i.e. Re{(x + iH[x])·exp(i2πft)}. A component at f0
/// moves to f0 + f. Components pushed below 0 Hz fold back as positive
/// frequencies; content pushed past Nyquist aliases. DC and Nyquist are
/// dropped from the quadrature part.
///
/// Shifting by +f then -f returns the input only when every component lies
/// strictly inside (0, fs/2) both before and after the shift. With an offset
/// of whole bins (a multiple of fs/N) the recovery is exact to rounding;
/// other offsets leak a little across the band edges.
///
/// # Arguments
/// * `signal` - Input series, N samples
/// * `offset_hz` - Any finite offset; 0 returns the input samples unchanged
/// * `sample_rate` - Must agree with the signal's own rate
pub fn frequency_shift(signal: &TimeSeries, offset_hz: f64, sample_rate: f64) -> Result<TimeSeries> {
    frequency_shift_with(&FftEngine::new(), signal, offset_hz, sample_rate)
}

pub fn frequency_shift_with<T: SpectralTransform + ?Sized>(
    transform: &T,
    signal: &TimeSeries,
    offset_hz: f64,
    sample_rate: f64,
) -> Result<TimeSeries> {
    signal.check_sample_rate(sample_rate)?;
    check_offset(offset_hz)?;

    let n = signal.len();
    let hilbert = hilbert_transform(transform, signal.samples())?;

    let omega = 2.0 * PI * offset_hz / sample_rate;
    let shifted = signal
        .samples()
        .iter()
        .zip(hilbert.iter())
        .enumerate()
        .map(|(j, (&x, &h))| {
            let (sin, cos) = (omega * j as f64).sin_cos();
            x * cos - h * sin
        })
        .collect();

    debug!("frequency_shift: {} samples by {} Hz at {} Hz", n, offset_hz, sample_rate);

    signal.with_samples(shifted)
}

/// Hilbert transform of a real sequence: -i·X[k] on positive bins, DC and
/// Nyquist zeroed, inverse-transformed back to exactly N samples
fn hilbert_transform<T: SpectralTransform + ?Sized>(transform: &T, samples: &[f64]) -> Result<Vec<f64>> {
    let n = samples.len();
    let spectrum = transform.forward(samples)?;
    let nyquist = (n % 2 == 0).then_some(n / 2);

    let rotated: Vec<Complex64> = spectrum
        .iter()
        .enumerate()
        .map(|(k, &c)| {
            if k == 0 || Some(k) == nyquist {
                Complex64::new(0.0, 0.0)
            } else {
                Complex64::new(c.im, -c.re)
            }
        })
        .collect();

    transform.inverse(&rotated, n)
}

/// Output of the whole-bin shifter
#[derive(Debug, Clone)]
pub struct BinShift {
    pub series: TimeSeries,

    /// Signed number of bins the spectrum moved
    pub nbins: i64,

    /// Number of non-negative-frequency bins, N/2 + 1
    pub num_bins: usize,
}

impl BinShift {
    /// True when the offset moved every bin out of range, leaving silence
    pub fn signal_lost(&self) -> bool {
        self.nbins.unsigned_abs() as usize >= self.num_bins
    }
}

/// Shift by whole FFT bins: `nbins = round(offset_hz / (sample_rate / N))`
///
/// Positive offsets move energy up and zero the vacated low bins; negative
/// offsets move it down and zero the vacated high bins. The source spectrum
/// is never written to.
pub fn bin_shift(signal: &TimeSeries, offset_hz: f64, sample_rate: f64) -> Result<BinShift> {
    bin_shift_with(&FftEngine::new(), signal, offset_hz, sample_rate)
}

pub fn bin_shift_with<T: SpectralTransform + ?Sized>(
    transform: &T,
    signal: &TimeSeries,
    offset_hz: f64,
    sample_rate: f64,
) -> Result<BinShift> {
    signal.check_sample_rate(sample_rate)?;
    check_offset(offset_hz)?;

    let n = signal.len();
    let spectrum = transform.forward(signal.samples())?;
    let num_bins = spectrum.len();

    let df = sample_rate / n as f64;
    let nbins = (offset_hz / df).round() as i64;
    let distance = nbins.unsigned_abs() as usize;

    let mut moved = vec![Complex64::new(0.0, 0.0); num_bins];
    if distance < num_bins {
        let kept = num_bins - distance;
        if nbins >= 0 {
            moved[distance..].copy_from_slice(&spectrum[..kept]);
        } else {
            moved[..kept].copy_from_slice(&spectrum[distance..]);
        }
    } else {
        warn!(
            "bin_shift: offset {} Hz is {} bins, spectrum has only {}; output is silent",
            offset_hz, nbins, num_bins
        );
    }

    debug!("bin_shift: {} samples by {} bins (df = {} Hz)", n, nbins, df);

    Ok(BinShift {
        series: signal.with_samples(transform.inverse(&moved, n)?)?,
        nbins,
        num_bins,
    })
}

fn check_offset(offset_hz: f64) -> Result<()> {
    if offset_hz.is_finite() {
        Ok(())
    } else {
        Err(SonifyError::InvalidParameter(format!(
            "frequency offset must be finite, got {offset_hz}"
        )))
    }
}
