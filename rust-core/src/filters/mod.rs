//! Signal conditioning stages: whitening, band limiting, frequency shifting

pub mod windows;
pub mod noise_psd;
pub mod whiten;
pub mod bandpass;
pub mod shift;

pub use windows::{WindowType, generate_window};
pub use noise_psd::{PsdModel, InterpolatedPsd};
pub use whiten::{whiten, whiten_with};
pub use bandpass::{BandpassConfig, bandpass, design_bandpass};
pub use shift::{BinShift, bin_shift, frequency_shift};
