//! Real FFT provider for the conditioning pipeline
//!
//! Normalisation convention (fixed, every stage relies on it):
//! forward is unnormalised, X[k] = Σ x[n]·exp(-2πi·kn/N), and inverse is
//! scaled by 1/N so that inverse(forward(x), N) == x.

use num_complex::Complex64;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, SonifyError};

/// Contract for a forward/inverse real spectral transform
pub trait SpectralTransform: Send + Sync {
    /// Forward real FFT: N real samples -> N/2 + 1 complex bins (unnormalised)
    fn forward(&self, signal: &[f64]) -> Result<Vec<Complex64>>;

    /// Inverse real FFT back to exactly `n` samples, scaled by 1/n
    ///
    /// `spectrum` must hold n/2 + 1 bins. The imaginary part of the DC bin,
    /// and of the Nyquist bin when n is even, is discarded.
    fn inverse(&self, spectrum: &[Complex64], n: usize) -> Result<Vec<f64>>;
}

#[derive(Clone)]
struct Plans {
    r2c: Arc<dyn RealToComplex<f64>>,
    c2r: Arc<dyn ComplexToReal<f64>>,
}

/// FFT engine for real-valued signals, backed by realfft
///
/// Plans are cached per length, so one engine can be shared across
/// threads and reused for buffers of different sizes.
#[derive(Default)]
pub struct FftEngine {
    plans: Mutex<HashMap<usize, Plans>>,
}

impl FftEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn plans(&self, n: usize) -> Result<Plans> {
        let mut cache = self
            .plans
            .lock()
            .map_err(|_| SonifyError::Transform("FFT plan cache poisoned".into()))?;

        let plans = cache.entry(n).or_insert_with(|| {
            let mut planner = RealFftPlanner::<f64>::new();
            Plans {
                r2c: planner.plan_fft_forward(n),
                c2r: planner.plan_fft_inverse(n),
            }
        });

        Ok(plans.clone())
    }

    /// Number of frequency bins (n/2 + 1 for real FFT)
    pub fn num_bins(n: usize) -> usize {
        n / 2 + 1
    }
}

impl SpectralTransform for FftEngine {
    fn forward(&self, signal: &[f64]) -> Result<Vec<Complex64>> {
        let n = signal.len();
        match n {
            0 => {
                return Err(SonifyError::InvalidParameter(
                    "cannot transform an empty signal".into(),
                ))
            }
            1 => return Ok(vec![Complex64::new(signal[0], 0.0)]),
            _ => {}
        }

        let plans = self.plans(n)?;

        // realfft uses the input as scratch space
        let mut input = signal.to_vec();
        let mut output = plans.r2c.make_output_vec();
        plans
            .r2c
            .process(&mut input, &mut output)
            .map_err(|e| SonifyError::Transform(e.to_string()))?;

        Ok(output)
    }

    fn inverse(&self, spectrum: &[Complex64], n: usize) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(SonifyError::InvalidParameter(
                "inverse transform length must be at least 1".into(),
            ));
        }
        if spectrum.len() != Self::num_bins(n) {
            return Err(SonifyError::LengthMismatch {
                context: "inverse FFT input bins",
                expected: Self::num_bins(n),
                actual: spectrum.len(),
            });
        }
        if n == 1 {
            return Ok(vec![spectrum[0].re]);
        }

        let plans = self.plans(n)?;

        let mut input = spectrum.to_vec();
        input[0].im = 0.0;
        if n % 2 == 0 {
            input[n / 2].im = 0.0;
        }

        let mut output = plans.c2r.make_output_vec();
        plans
            .c2r
            .process(&mut input, &mut output)
            .map_err(|e| SonifyError::Transform(e.to_string()))?;

        let scale = 1.0 / n as f64;
        for sample in output.iter_mut() {
            *sample *= scale;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_dc_signal() {
        let fft = FftEngine::new();

        let spectrum = fft.forward(&vec![1.0; 100]).unwrap();

        // DC bin carries the unnormalised sum
        assert!((spectrum[0].re - 100.0).abs() < 1e-9);
        assert!(spectrum[10].norm() < 1e-9);
    }

    #[test]
    fn test_fft_sine_wave() {
        let fft = FftEngine::new();
        let n = 1024;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 64.0 * i as f64 / n as f64).sin())
            .collect();

        let spectrum = fft.forward(&signal).unwrap();
        assert_eq!(spectrum.len(), 513);

        // Unit sine lands N/2 in its bin with -i phase
        assert!((spectrum[64].im + 512.0).abs() < 1e-6);
        assert!(spectrum[64].re.abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_even_and_odd() {
        let fft = FftEngine::new();

        for n in [1usize, 2, 7, 16, 1000, 1001] {
            let signal: Vec<f64> = (0..n).map(|i| ((i * 37 % 11) as f64 - 5.0) * 0.1).collect();
            let spectrum = fft.forward(&signal).unwrap();
            assert_eq!(spectrum.len(), n / 2 + 1);

            let back = fft.inverse(&spectrum, n).unwrap();
            assert_eq!(back.len(), n);
            for (a, b) in signal.iter().zip(back.iter()) {
                assert!((a - b).abs() < 1e-12, "n = {}: {} vs {}", n, a, b);
            }
        }
    }

    #[test]
    fn test_inverse_discards_edge_imaginary_parts() {
        let fft = FftEngine::new();
        let mut spectrum = fft.forward(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let clean = fft.inverse(&spectrum, 4).unwrap();

        spectrum[0].im = 5.0;
        spectrum[2].im = -3.0;
        let dirty = fft.inverse(&spectrum, 4).unwrap();

        assert_eq!(clean.len(), dirty.len());
        for (a, b) in clean.iter().zip(dirty.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inverse_rejects_wrong_bin_count() {
        let fft = FftEngine::new();
        let spectrum = vec![Complex64::new(0.0, 0.0); 5];
        assert!(matches!(
            fft.inverse(&spectrum, 16),
            Err(SonifyError::LengthMismatch { expected: 9, actual: 5, .. })
        ));
        assert!(fft.forward(&[]).is_err());
    }
}
