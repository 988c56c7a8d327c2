//! Noise power spectral density models queried by the whitening stage

use crate::error::{Result, SonifyError};
use crate::spectrum::welch::PsdEstimate;

/// Slack (relative to the domain span) absorbed at the domain edges, so an
/// rfft axis and a Welch axis that both end at Nyquist agree despite rounding
const EDGE_SLACK: f64 = 1e-9;

/// A one-sided noise PSD, evaluated at a batch of frequencies
///
/// Implementations return one real power value per query frequency and must
/// fail, rather than extrapolate, for frequencies outside their domain.
pub trait PsdModel: Send + Sync {
    fn evaluate(&self, frequencies: &[f64]) -> Result<Vec<f64>>;
}

impl<F> PsdModel for F
where
    F: Fn(&[f64]) -> Result<Vec<f64>> + Send + Sync,
{
    fn evaluate(&self, frequencies: &[f64]) -> Result<Vec<f64>> {
        self(frequencies)
    }
}

/// Piecewise-linear interpolation of a tabulated PSD
#[derive(Debug, Clone)]
pub struct InterpolatedPsd {
    frequencies: Vec<f64>,
    values: Vec<f64>,
}

impl InterpolatedPsd {
    /// # Arguments
    /// * `frequencies` - Knot frequencies in Hz, strictly increasing, at least two
    /// * `values` - PSD at each knot, finite and non-negative
    pub fn new(frequencies: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if frequencies.len() != values.len() {
            return Err(SonifyError::LengthMismatch {
                context: "PSD knots vs. values",
                expected: frequencies.len(),
                actual: values.len(),
            });
        }
        if frequencies.len() < 2 {
            return Err(SonifyError::InvalidParameter(
                "PSD interpolation needs at least two knots".into(),
            ));
        }
        if frequencies.iter().any(|f| !f.is_finite())
            || frequencies.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(SonifyError::InvalidParameter(
                "PSD knot frequencies must be finite and strictly increasing".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(SonifyError::InvalidParameter(format!(
                "PSD values must be finite and non-negative, found {bad}"
            )));
        }

        Ok(Self {
            frequencies,
            values,
        })
    }

    pub fn from_estimate(estimate: &PsdEstimate) -> Result<Self> {
        Self::new(estimate.frequencies.clone(), estimate.power.clone())
    }

    /// Valid query range (min, max) in Hz
    pub fn domain(&self) -> (f64, f64) {
        // new() guarantees at least two knots
        (self.frequencies[0], self.frequencies[self.frequencies.len() - 1])
    }

    fn value_at(&self, frequency: f64) -> Result<f64> {
        let (min, max) = self.domain();
        let slack = (max - min) * EDGE_SLACK;

        if !(frequency >= min - slack && frequency <= max + slack) {
            return Err(SonifyError::PsdOutOfDomain {
                frequency,
                min,
                max,
            });
        }
        let f = frequency.clamp(min, max);

        // First knot strictly above f, kept inside 1..len
        let upper = self
            .frequencies
            .partition_point(|&knot| knot <= f)
            .clamp(1, self.frequencies.len() - 1);
        let lower = upper - 1;

        let (f0, f1) = (self.frequencies[lower], self.frequencies[upper]);
        let (v0, v1) = (self.values[lower], self.values[upper]);
        let t = (f - f0) / (f1 - f0);

        Ok(v0 + t * (v1 - v0))
    }
}

impl PsdModel for InterpolatedPsd {
    fn evaluate(&self, frequencies: &[f64]) -> Result<Vec<f64>> {
        frequencies.iter().map(|&f| self.value_at(f)).collect()
    }
}
