//! Spectral transforms and PSD estimation

pub mod fft;
pub mod windowing;
pub mod welch;

pub use fft::{FftEngine, SpectralTransform};
pub use welch::{PsdEstimate, WelchConfig, estimate_psd};
