//! Windowing helpers for segment-averaged spectral estimates

use crate::filters::windows::{generate_window, WindowType};

/// Multiply `segment` by `window` sample-by-sample into a new buffer
pub fn apply_window(segment: &[f64], window: &[f64]) -> Vec<f64> {
    segment
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}

/// Σ w[n]², the power normalisation of a windowed periodogram
pub fn window_power_sum(window_type: WindowType, length: usize) -> f64 {
    generate_window(window_type, length)
        .iter()
        .map(|&w| w * w)
        .sum()
}
