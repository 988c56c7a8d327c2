//! Whitening against a noise PSD
//!
//! Divides each frequency bin by the noise amplitude spectral density so the
//! detector noise comes out flat with unit variance per sample.

use log::debug;

use crate::error::{Result, SonifyError};
use crate::filters::noise_psd::PsdModel;
use crate::signal::{rfft_frequencies, TimeSeries};
use crate::spectrum::fft::{FftEngine, SpectralTransform};

/// Whiten `signal` with a fresh FFT engine
///
/// # Arguments
/// * `signal` - Strain time series, N samples
/// * `psd` - One-sided noise PSD covering 0..=Nyquist
/// * `dt` - Sample spacing; must agree with the signal's own
///
/// # Returns
/// Whitened series of length N
pub fn whiten<P: PsdModel + ?Sized>(signal: &TimeSeries, psd: &P, dt: f64) -> Result<TimeSeries> {
    whiten_with(&FftEngine::new(), signal, psd, dt)
}

/// Whiten `signal` using the given transform provider
pub fn whiten_with<T, P>(transform: &T, signal: &TimeSeries, psd: &P, dt: f64) -> Result<TimeSeries>
where
    T: SpectralTransform + ?Sized,
    P: PsdModel + ?Sized,
{
    signal.check_dt(dt)?;

    let n = signal.len();
    let spectrum = transform.forward(signal.samples())?;
    let freqs = rfft_frequencies(n, dt);

    let power = psd.evaluate(&freqs)?;
    if power.len() != freqs.len() {
        return Err(SonifyError::LengthMismatch {
            context: "whitening: PSD values vs. frequency axis",
            expected: freqs.len(),
            actual: power.len(),
        });
    }

    // One-sided PSD -> per-bin amplitude: X[k] * norm / sqrt(S(f_k)).
    // Twice the older `X / sqrt(S / (dt/2))` scaling
    let norm = 1.0 / (1.0 / (2.0 * dt)).sqrt();

    let mut white = Vec::with_capacity(spectrum.len());
    for ((bin, &s), &f) in spectrum.iter().zip(power.iter()).zip(freqs.iter()) {
        if !(s > 0.0 && s.is_finite()) {
            return Err(SonifyError::NonPositivePsd {
                frequency: f,
                value: s,
            });
        }
        white.push(*bin * (norm / s.sqrt()));
    }

    debug!("whiten: {} samples, {} bins, dt = {} s", n, white.len(), dt);

    signal.with_samples(transform.inverse(&white, n)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::noise_psd::InterpolatedPsd;
    use std::f64::consts::PI;

    const FS: f64 = 4096.0;

    fn flat_psd(level: f64) -> InterpolatedPsd {
        InterpolatedPsd::new(vec![0.0, FS / 2.0], vec![level, level]).unwrap()
    }

    fn sine(freq: f64, seconds: f64) -> TimeSeries {
        let n = (seconds * FS) as usize;
        TimeSeries::from_sample_rate(
            (0..n)
                .map(|i| (2.0 * PI * freq * i as f64 / FS).sin())
                .collect(),
            FS,
        )
        .unwrap()
    }

    #[test]
    fn test_length_preserved() {
        let dt = 1.0 / FS;
        for n in [1usize, 2, 3, 255, 256, 4097] {
            let signal = TimeSeries::new((0..n).map(|i| (i as f64 * 0.3).cos()).collect(), dt).unwrap();
            let white = whiten(&signal, &flat_psd(1.0), dt).unwrap();
            assert_eq!(white.len(), n);
            assert_eq!(white.dt(), dt);
        }

        let long = sine(200.0, 10.0);
        assert_eq!(whiten(&long, &flat_psd(1.0), 1.0 / FS).unwrap().len(), long.len());
    }

    #[test]
    fn test_normalisation_convention() {
        // White noise of variance σ² has one-sided PSD 2σ²dt; an impulse
        // whitened against PSD 2dt must come back unchanged
        let dt = 1.0 / FS;
        let mut samples = vec![0.0; 64];
        samples[0] = 1.0;
        let impulse = TimeSeries::new(samples, dt).unwrap();

        let white = whiten(&impulse, &flat_psd(2.0 * dt), dt).unwrap();
        assert!((white.samples()[0] - 1.0).abs() < 1e-12);
        assert!(white.samples()[1..].iter().all(|s| s.abs() < 1e-12));

        // Four times the noise power halves the amplitude
        let quieter = whiten(&impulse, &flat_psd(8.0 * dt), dt).unwrap();
        assert!((quieter.samples()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_scale_is_twice_the_half_dt_convention() {
        let dt = 1.0 / FS;
        let mut samples = vec![0.0; 64];
        samples[0] = 1.0;
        let impulse = TimeSeries::new(samples, dt).unwrap();

        let white = whiten(&impulse, &flat_psd(1.0), dt).unwrap();
        assert!((white.samples()[0] - (2.0 * dt).sqrt()).abs() < 1e-15);

        // Against a coloured PSD, bin by bin
        let signal = sine(200.0, 0.5).scaled(3.0);
        let psd = InterpolatedPsd::new(vec![0.0, 150.0, FS / 2.0], vec![2.0, 0.5, 4.0]).unwrap();
        let ours = whiten(&signal, &psd, dt).unwrap();

        let fft = FftEngine::new();
        let n = signal.len();
        let freqs = rfft_frequencies(n, dt);
        let power = psd.evaluate(&freqs).unwrap();
        let half_dt: Vec<_> = fft
            .forward(signal.samples())
            .unwrap()
            .iter()
            .zip(power.iter())
            .map(|(x, s)| *x / (s / (dt / 2.0)).sqrt())
            .collect();
        let older = fft.inverse(&half_dt, n).unwrap();

        for (a, b) in ours.samples().iter().zip(older.iter()) {
            assert!((a - 2.0 * b).abs() <= 1e-12 * (1.0 + b.abs()));
        }
    }

    #[test]
    fn test_linearity() {
        let signal = sine(200.0, 1.0);
        let psd = InterpolatedPsd::new(vec![0.0, 100.0, FS / 2.0], vec![4.0, 1.0, 2.0]).unwrap();
        let dt = 1.0 / FS;

        let base = whiten(&signal, &psd, dt).unwrap();
        for c in [-3.0, 0.5, 1e3] {
            let scaled = whiten(&signal.scaled(c), &psd, dt).unwrap();
            for (a, b) in scaled.samples().iter().zip(base.samples().iter()) {
                assert!((a - c * b).abs() <= 1e-9 * (1.0 + (c * b).abs()));
            }
        }
    }

    #[test]
    fn test_zero_psd_is_an_error() {
        let dt = 1.0 / FS;
        let psd = InterpolatedPsd::new(vec![0.0, FS / 2.0], vec![0.0, 1.0]).unwrap();
        let result = whiten(&sine(200.0, 0.25), &psd, dt);

        assert!(matches!(
            result,
            Err(SonifyError::NonPositivePsd { frequency, value }) if frequency == 0.0 && value == 0.0
        ));
    }

    #[test]
    fn test_negative_and_nan_psd_name_their_bin() {
        // 0.25 s at 4096 Hz: 4 Hz bins
        let dt = 1.0 / FS;
        let signal = sine(200.0, 0.25);

        let negative = |f: &[f64]| -> Result<Vec<f64>> {
            Ok((0..f.len()).map(|k| if k == 75 { -1.0 } else { 1.0 }).collect())
        };
        assert!(matches!(
            whiten(&signal, &negative, dt),
            Err(SonifyError::NonPositivePsd { frequency, value }) if frequency == 300.0 && value == -1.0
        ));

        let nan = |f: &[f64]| -> Result<Vec<f64>> {
            Ok((0..f.len()).map(|k| if k == 10 { f64::NAN } else { 1.0 }).collect())
        };
        assert!(matches!(
            whiten(&signal, &nan, dt),
            Err(SonifyError::NonPositivePsd { frequency, value }) if frequency == 40.0 && value.is_nan()
        ));
    }

    #[test]
    fn test_psd_domain_too_narrow() {
        let dt = 1.0 / FS;
        let psd = InterpolatedPsd::new(vec![10.0, 1000.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            whiten(&sine(200.0, 0.25), &psd, dt),
            Err(SonifyError::PsdOutOfDomain { .. })
        ));
    }

    #[test]
    fn test_dt_disagreement_and_short_model() {
        let signal = sine(200.0, 0.25);
        assert!(whiten(&signal, &flat_psd(1.0), 1.0 / 2048.0).is_err());

        let short = |_: &[f64]| -> Result<Vec<f64>> { Ok(vec![1.0; 3]) };
        assert!(matches!(
            whiten(&signal, &short, 1.0 / FS),
            Err(SonifyError::LengthMismatch { .. })
        ));
    }
}
