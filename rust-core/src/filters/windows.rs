//! Window functions shared by the PSD estimator and the bandpass designer

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// w[n] = 0.5 - 0.5*cos(2πn/(M-1)), the PSD estimator default
    Hann,

    /// w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    Rectangular,
}

impl WindowType {
    /// Mainlobe width factor A, where transition width ≈ A·π / M
    fn mainlobe_factor(&self) -> f64 {
        match self {
            WindowType::Hann | WindowType::Hamming => 8.0,
            WindowType::Blackman => 12.0,
            WindowType::Rectangular => 4.0,
        }
    }

    /// Odd FIR length M needed for a transition band of `transition_hz`
    ///
    /// Odd so the filter is Type I (symmetric, integer group delay).
    pub fn filter_length(&self, transition_hz: f64, sample_rate: f64) -> usize {
        let delta_omega = 2.0 * PI * transition_hz / sample_rate;
        let m = (self.mainlobe_factor() * PI / delta_omega).ceil() as usize;

        m.max(1) | 1
    }

    fn cosine_terms(&self) -> [f64; 3] {
        match self {
            WindowType::Hann => [0.5, 0.5, 0.0],
            WindowType::Hamming => [0.54, 0.46, 0.0],
            WindowType::Blackman => [0.42, 0.5, 0.08],
            WindowType::Rectangular => [1.0, 0.0, 0.0],
        }
    }
}

/// Symmetric window coefficients w[n] for n = 0..length-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }

    let [a0, a1, a2] = window_type.cosine_terms();
    let span = (length - 1) as f64;

    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / span;
            a0 - a1 * angle.cos() + a2 * (2.0 * angle).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_length() {
        // 0.05π rad/sample transition at fs = 2 Hz is 0.05 Hz
        let m_hamming = WindowType::Hamming.filter_length(0.05, 2.0);
        let m_blackman = WindowType::Blackman.filter_length(0.05, 2.0);

        assert_eq!(m_hamming, 161);
        assert_eq!(m_blackman, 241);

        // Narrow bands at LIGO rates still come out odd
        let m = WindowType::Hann.filter_length(10.0, 4096.0);
        assert_eq!(m % 2, 1);
        assert!(m >= 1638);
    }

    #[test]
    fn test_window_generation() {
        let length = 161;
        let center = length / 2;

        for window_type in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            let w = generate_window(window_type, length);
            assert_eq!(w.len(), length);
            assert!((w[0] - w[length - 1]).abs() < 1e-10);
            assert!((w[center] - 1.0).abs() < 1e-10);
        }

        let hann = generate_window(WindowType::Hann, length);
        assert!(hann[0].abs() < 1e-12);

        let hamming = generate_window(WindowType::Hamming, length);
        assert!(hamming[0] > 0.07 && hamming[0] < 0.09);
    }

    #[test]
    fn test_rectangular_window() {
        let window = generate_window(WindowType::Rectangular, 100);
        assert!(window.iter().all(|&w| w == 1.0));
        assert_eq!(generate_window(WindowType::Hann, 1), vec![1.0]);
    }
}
